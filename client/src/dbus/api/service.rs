use std::fmt;

use zbus::zvariant::{ObjectPath, OwnedObjectPath, OwnedValue};

use super::{Collection, DESTINATION, PATH, Prompt, Session};
use crate::dbus::{Error, ServiceError};

const PLAIN_ALGORITHM: &str = "plain";

#[doc(alias = "org.freedesktop.secrets")]
pub struct Service(zbus::Proxy<'static>);

impl zbus::proxy::Defaults for Service {
    const INTERFACE: &'static Option<zbus::names::InterfaceName<'static>> = &Some(
        zbus::names::InterfaceName::from_static_str_unchecked("org.freedesktop.Secret.Service"),
    );
    const DESTINATION: &'static Option<zbus::names::BusName<'static>> = &Some(DESTINATION);
    const PATH: &'static Option<ObjectPath<'static>> = &Some(PATH);
}

impl From<zbus::Proxy<'static>> for Service {
    fn from(value: zbus::Proxy<'static>) -> Self {
        Self(value)
    }
}

impl Service {
    pub async fn new(connection: &zbus::Connection) -> Result<Self, Error> {
        zbus::proxy::Builder::new(connection)
            .cache_properties(zbus::proxy::CacheProperties::No)
            .build()
            .await
            .map_err(From::from)
    }

    pub fn inner(&self) -> &zbus::Proxy<'static> {
        &self.0
    }

    /// Open a session using the `plain` algorithm.
    #[doc(alias = "OpenSession")]
    pub async fn open_session(&self) -> Result<Session, Error> {
        let (_output, session_path) = self
            .inner()
            .call_method("OpenSession", &(PLAIN_ALGORITHM, zbus::zvariant::Value::from("")))
            .await
            .map_err::<ServiceError, _>(From::from)?
            .body()
            .deserialize::<(OwnedValue, OwnedObjectPath)>()?;
        Session::new(self.inner().connection(), session_path).await
    }

    #[doc(alias = "ReadAlias")]
    pub async fn read_alias(&self, name: &str) -> Result<Option<Collection>, Error> {
        let collection_path = self
            .inner()
            .call_method("ReadAlias", &(name))
            .await
            .map_err::<ServiceError, _>(From::from)?
            .body()
            .deserialize::<OwnedObjectPath>()?;

        if collection_path.as_str() != "/" {
            let collection = Collection::new(self.inner().connection(), collection_path).await?;
            Ok(Some(collection))
        } else {
            Ok(None)
        }
    }

    /// Unlock the given objects, completing the prompt if the service
    /// returns one. Returns every unlocked path.
    pub async fn unlock(&self, objects: &[ObjectPath<'_>]) -> Result<Vec<OwnedObjectPath>, Error> {
        let (mut unlocked, prompt_path) = self
            .inner()
            .call_method("Unlock", &(objects))
            .await
            .map_err::<ServiceError, _>(From::from)?
            .body()
            .deserialize::<(Vec<OwnedObjectPath>, OwnedObjectPath)>()?;

        if let Some(prompt) = Prompt::new(self.inner().connection(), prompt_path).await? {
            let response = prompt.receive_completed().await?;
            let prompted = Vec::<OwnedObjectPath>::try_from(response)
                .map_err::<zbus::zvariant::Error, _>(From::from)?;
            unlocked.extend(prompted);
        }
        Ok(unlocked)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Service")
            .field(&self.inner().path().as_str())
            .finish()
    }
}
