use std::{fmt, string::FromUtf8Error};

use zeroize::{Zeroize, ZeroizeOnDrop};

const TEXT_CONTENT_TYPE: &str = "text/plain";
const BLOB_CONTENT_TYPE: &str = "application/octet-stream";

/// A safe wrapper around a combination of (secret, content-type).
///
/// The value is zeroed when dropped and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub enum Secret {
    /// Corresponds to `text/plain`
    Text(String),
    /// Corresponds to `application/octet-stream`
    Blob(Vec<u8>),
}

impl Secret {
    /// Create a text secret, stored with `text/plain` content type.
    pub fn text(value: impl AsRef<str>) -> Self {
        Self::Text(value.as_ref().to_owned())
    }

    /// Create a blob secret, stored with `application/octet-stream` content
    /// type.
    pub fn blob(value: impl AsRef<[u8]>) -> Self {
        Self::Blob(value.as_ref().to_owned())
    }

    /// Build a secret from the bytes and content type a service returned.
    ///
    /// A `text/plain` value that isn't valid UTF-8 is kept as a blob so the
    /// decoding failure surfaces when the caller asks for text.
    pub fn with_content_type(value: &[u8], content_type: &str) -> Self {
        let is_text = content_type
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(TEXT_CONTENT_TYPE));
        match std::str::from_utf8(value) {
            Ok(text) if is_text => Self::text(text),
            _ => Self::blob(value),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text(_) => TEXT_CONTENT_TYPE,
            Self::Blob(_) => BLOB_CONTENT_TYPE,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Blob(bytes) => bytes.as_ref(),
        }
    }

    /// Decode the secret as UTF-8 text.
    pub fn to_text(&self) -> Result<String, FromUtf8Error> {
        match self {
            Self::Text(text) => Ok(text.clone()),
            Self::Blob(bytes) => String::from_utf8(bytes.clone()),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("content_type", &self.content_type())
            .field("len", &self.as_bytes().len())
            .finish_non_exhaustive()
    }
}

impl From<&[u8]> for Secret {
    fn from(value: &[u8]) -> Self {
        Self::blob(value)
    }
}

impl From<Vec<u8>> for Secret {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl AsRef<[u8]> for Secret {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
