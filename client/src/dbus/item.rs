use std::{collections::HashMap, sync::Arc};

use zbus::zvariant::ObjectPath;

use super::{Error, api};
use crate::Secret;

/// A secret with a label and attributes to identify it.
#[derive(Debug)]
pub struct Item {
    inner: api::Item,
    session: Arc<api::Session>,
}

impl Item {
    pub(crate) fn new(session: Arc<api::Session>, item: api::Item) -> Self {
        Self {
            inner: item,
            session,
        }
    }

    /// The item label.
    pub async fn label(&self) -> Result<String, Error> {
        self.inner.label().await
    }

    /// Retrieve the item attributes.
    pub async fn attributes(&self) -> Result<HashMap<String, String>, Error> {
        self.inner.attributes().await
    }

    /// Retrieve the currently stored secret.
    ///
    /// The bytes are returned as sent by the service, a `text/plain` secret
    /// that isn't valid UTF-8 is returned as a blob.
    pub async fn secret(&self) -> Result<Secret, Error> {
        let secret = self.inner.secret(&self.session).await?;
        Ok(secret.into_secret())
    }

    /// Delete the item.
    pub async fn delete(&self) -> Result<(), Error> {
        self.inner.delete().await
    }

    /// Returns item path
    pub fn path(&self) -> &ObjectPath<'_> {
        self.inner.inner().path()
    }
}
