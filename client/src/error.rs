use std::fmt;

/// Alias for [`std::result::Result`] with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The backend error type.
#[derive(Debug)]
pub enum Error {
    /// Secret Service error.
    DBus(crate::dbus::Error),
    /// In-memory service error.
    Memory(crate::memory::Error),
}

impl From<crate::dbus::Error> for Error {
    fn from(e: crate::dbus::Error) -> Self {
        Self::DBus(e)
    }
}

impl From<crate::memory::Error> for Error {
    fn from(e: crate::memory::Error) -> Self {
        Self::Memory(e)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DBus(e) => Some(e),
            Self::Memory(e) => Some(e),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DBus(e) => write!(f, "DBus error {e}"),
            Self::Memory(e) => write!(f, "In-memory service error {e}"),
        }
    }
}
