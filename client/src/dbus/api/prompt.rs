use std::fmt;

use futures_util::StreamExt;
use serde::Serialize;
use zbus::zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Type};

use super::DESTINATION;
use crate::dbus::{Error, ServiceError};

#[derive(Type)]
#[zvariant(signature = "o")]
#[doc(alias = "org.freedesktop.Secret.Prompt")]
pub struct Prompt(zbus::Proxy<'static>);

impl zbus::proxy::Defaults for Prompt {
    const INTERFACE: &'static Option<zbus::names::InterfaceName<'static>> = &Some(
        zbus::names::InterfaceName::from_static_str_unchecked("org.freedesktop.Secret.Prompt"),
    );
    const DESTINATION: &'static Option<zbus::names::BusName<'static>> = &Some(DESTINATION);
    const PATH: &'static Option<ObjectPath<'static>> = &None;
}

impl From<zbus::Proxy<'static>> for Prompt {
    fn from(value: zbus::Proxy<'static>) -> Self {
        Self(value)
    }
}

impl Prompt {
    /// Returns `None` when the service answered with the `/` path, meaning
    /// no prompt is needed.
    pub async fn new(
        connection: &zbus::Connection,
        path: OwnedObjectPath,
    ) -> Result<Option<Self>, Error> {
        if path.as_str() == "/" {
            return Ok(None);
        }
        let prompt = zbus::proxy::Builder::new(connection)
            .path(path)?
            .cache_properties(zbus::proxy::CacheProperties::No)
            .build()
            .await?;
        Ok(Some(prompt))
    }

    pub fn inner(&self) -> &zbus::Proxy<'static> {
        &self.0
    }

    pub async fn prompt(&self) -> Result<(), Error> {
        // No parent window, the smoke check runs headless.
        self.inner()
            .call_method("Prompt", &(""))
            .await
            .map_err::<ServiceError, _>(From::from)?;
        Ok(())
    }

    /// Trigger the prompt and wait for its `Completed` signal.
    pub async fn receive_completed(&self) -> Result<OwnedValue, Error> {
        let mut stream = self.inner().receive_signal("Completed").await?;
        let (value, _) = futures_util::try_join!(
            async {
                let message = stream.next().await.ok_or(Error::Dismissed)?;
                let (dismissed, result) = message.body().deserialize::<(bool, OwnedValue)>()?;
                if dismissed {
                    Err(Error::Dismissed)
                } else {
                    Ok(result)
                }
            },
            self.prompt()
        )?;
        Ok(value)
    }
}

impl Serialize for Prompt {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ObjectPath::serialize(self.inner().path(), serializer)
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Prompt")
            .field(&self.inner().path().as_str())
            .finish()
    }
}
