use std::sync::Arc;

use zbus::zvariant::ObjectPath;

use super::{Error, Item, api};
use crate::{Attributes, Secret};

/// A collection allows to store items.
///
/// Collections handed out by [`Service`](super::Service) are already
/// unlocked.
#[derive(Debug)]
pub struct Collection {
    inner: api::Collection,
    session: Arc<api::Session>,
}

impl Collection {
    pub(crate) fn new(session: Arc<api::Session>, collection: api::Collection) -> Self {
        Self {
            inner: collection,
            session,
        }
    }

    /// The collection label.
    pub async fn label(&self) -> Result<String, Error> {
        self.inner.label().await
    }

    /// Create a new item on the collection
    ///
    /// # Arguments
    ///
    /// * `label` - A user visible label of the item.
    /// * `attributes` - A map of key/value attributes, used to find the item
    ///   later. May be empty.
    /// * `secret` - The secret to store.
    /// * `replace` - Whether to replace the value if the `attributes` matches
    ///   an existing `secret`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, secret), fields(collection = %self.path()))
    )]
    pub async fn create_item(
        &self,
        label: &str,
        attributes: &Attributes,
        secret: &Secret,
        replace: bool,
    ) -> Result<Item, Error> {
        let secret = api::DBusSecret::new(&self.session, secret);
        let item = self
            .inner
            .create_item(label, attributes, &secret, replace)
            .await?;
        Ok(Item::new(Arc::clone(&self.session), item))
    }

    /// Returns collection path
    pub fn path(&self) -> &ObjectPath<'_> {
        self.inner.inner().path()
    }
}
