use crate::{Attributes, Result, Secret, dbus, memory};

/// A connection to a secret-storage service, either the
/// [Secret Service](crate::dbus) or the [in-memory](crate::memory) fake.
#[derive(Debug)]
pub enum Keyring {
    #[doc(hidden)]
    DBus(dbus::Service),
    #[doc(hidden)]
    Memory(memory::Session),
}

impl Keyring {
    /// Connect to the Secret Service on the session bus.
    pub async fn dbus() -> Result<Self> {
        Ok(Self::DBus(dbus::Service::connect().await?))
    }

    /// Connect to an in-memory service.
    pub fn memory(service: &memory::Service) -> Result<Self> {
        Ok(Self::Memory(service.connect()?))
    }

    /// Retrieve the default collection, unlocking it if needed.
    pub async fn default_collection(&self) -> Result<Collection> {
        let collection = match self {
            Self::DBus(backend) => Collection::DBus(backend.default_collection().await?),
            Self::Memory(backend) => Collection::Memory(backend.default_collection()?),
        };
        Ok(collection)
    }

    /// Release the connection.
    pub async fn close(self) -> Result<()> {
        match self {
            Self::DBus(backend) => backend.close().await?,
            Self::Memory(backend) => backend.close()?,
        };
        Ok(())
    }
}

/// A collection retrieved from a [`Keyring`].
#[derive(Debug)]
pub enum Collection {
    #[doc(hidden)]
    DBus(dbus::Collection),
    #[doc(hidden)]
    Memory(memory::Collection),
}

impl Collection {
    /// The collection label.
    pub async fn label(&self) -> Result<String> {
        let label = match self {
            Self::DBus(collection) => collection.label().await?,
            Self::Memory(collection) => collection.label()?,
        };
        Ok(label)
    }

    /// Create a new item.
    pub async fn create_item(
        &self,
        label: &str,
        attributes: &Attributes,
        secret: &Secret,
        replace: bool,
    ) -> Result<Item> {
        let item = match self {
            Self::DBus(collection) => Item::DBus(
                collection
                    .create_item(label, attributes, secret, replace)
                    .await?,
            ),
            Self::Memory(collection) => {
                Item::Memory(collection.create_item(label, attributes, secret, replace)?)
            }
        };
        Ok(item)
    }
}

/// A secret with a label and attributes to identify it.
#[derive(Debug)]
pub enum Item {
    #[doc(hidden)]
    DBus(dbus::Item),
    #[doc(hidden)]
    Memory(memory::Item),
}

impl Item {
    /// The item label.
    pub async fn label(&self) -> Result<String> {
        let label = match self {
            Self::DBus(item) => item.label().await?,
            Self::Memory(item) => item.label()?,
        };
        Ok(label)
    }

    /// Retrieve the item attributes.
    pub async fn attributes(&self) -> Result<Attributes> {
        let attributes = match self {
            Self::DBus(item) => item.attributes().await?,
            Self::Memory(item) => item.attributes()?,
        };
        Ok(attributes)
    }

    /// Retrieve the currently stored secret.
    pub async fn secret(&self) -> Result<Secret> {
        let secret = match self {
            Self::DBus(item) => item.secret().await?,
            Self::Memory(item) => item.secret()?,
        };
        Ok(secret)
    }

    /// Delete the item.
    pub async fn delete(&self) -> Result<()> {
        match self {
            Self::DBus(item) => item.delete().await?,
            Self::Memory(item) => item.delete()?,
        };
        Ok(())
    }

    /// The object path identifying the item in its service.
    pub fn path(&self) -> String {
        match self {
            Self::DBus(item) => item.path().to_string(),
            Self::Memory(item) => item.path().to_owned(),
        }
    }
}
