//! A minimal [Secret Service](https://specifications.freedesktop.org/secret-service-spec/latest/index.html) client.
//!
//! Only what a store-and-read-back check needs is exposed: a `plain`
//! session, the default collection, item creation, secret retrieval and
//! item deletion.
//!
//! ```no_run
//! use keyring_smoke::{Attributes, Secret, dbus::Service};
//!
//! # async fn run() -> Result<(), keyring_smoke::dbus::Error> {
//! let service = Service::connect().await?;
//! let collection = service.default_collection().await?;
//! let item = collection
//!     .create_item("label-123", &Attributes::new(), &Secret::text("password-123"), false)
//!     .await?;
//! assert_eq!(item.secret().await?, Secret::text("password-123"));
//! service.close().await?;
//! #   Ok(())
//! # }
//! ```
//!
//! ## Timeout
//!
//! If a DBus method call takes longer than 30 seconds (for example, waiting for
//! user input on a prompt), the call will fail with a
//! `zbus::Error::InputOutput(std::io::Error(kind: ErrorKind::TimedOut))`.

/// Barebone DBus API of the Secret Service specifications.
pub mod api;

mod collection;
mod error;
mod item;
mod service;

pub use collection::Collection;
pub use error::{Error, ServiceError};
pub use item::Item;
pub use service::Service;

/// The alias of the collection items are stored in by default.
pub const DEFAULT_COLLECTION: &str = "default";
