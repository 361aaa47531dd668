use serde::{Deserialize, Serialize, ser::SerializeTuple};
use zbus::zvariant::{OwnedObjectPath, Type};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::Session;
use crate::Secret;

#[derive(Debug, Serialize, Deserialize, Type)]
#[zvariant(signature = "(oayays)")]
/// Same as [`DBusSecret`] without tying the session path to a [`Session`] type.
pub struct DBusSecretInner(pub OwnedObjectPath, pub Vec<u8>, pub Vec<u8>, pub String);

/// The `(oayays)` secret struct of the Secret Service API, for the `plain`
/// algorithm: empty parameters and an unencrypted value.
#[derive(Type, Zeroize, ZeroizeOnDrop)]
#[zvariant(signature = "(oayays)")]
pub struct DBusSecret<'s> {
    #[zeroize(skip)]
    session: &'s Session,
    parameters: Vec<u8>,
    value: Vec<u8>,
    #[zeroize(skip)]
    content_type: String,
}

impl<'s> DBusSecret<'s> {
    pub(crate) fn new(session: &'s Session, secret: &Secret) -> Self {
        Self {
            session,
            parameters: vec![],
            value: secret.as_bytes().to_vec(),
            content_type: secret.content_type().to_owned(),
        }
    }

    /// Session used to encode the secret
    pub fn session(&self) -> &Session {
        self.session
    }

    /// Possibly encoded secret value
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Content type of the secret
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl DBusSecretInner {
    /// Only the `plain` algorithm is negotiated, so the value is used as is.
    pub(crate) fn into_secret(self) -> Secret {
        let Self(_session, _parameters, mut value, content_type) = self;
        let secret = Secret::with_content_type(&value, &content_type);
        value.zeroize();
        secret
    }
}

impl Serialize for DBusSecret<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tuple_serializer = serializer.serialize_tuple(4)?;
        tuple_serializer.serialize_element(self.session().path())?;
        tuple_serializer.serialize_element(&self.parameters)?;
        tuple_serializer.serialize_element(self.value())?;
        tuple_serializer.serialize_element(self.content_type())?;
        tuple_serializer.end()
    }
}

impl std::fmt::Debug for DBusSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBusSecret")
            .field("session", self.session)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
