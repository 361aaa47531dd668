#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc = include_str!("../README.md")]

use std::collections::HashMap;

pub mod check;
pub mod dbus;
mod error;
mod keyring;
pub mod memory;
mod secret;

pub use check::{Failure, Report, SmokeCheck, Stage};
pub use error::{Error, Result};
pub use keyring::{Collection, Item, Keyring};
pub use secret::Secret;
pub use zbus;

/// Item attributes, used by services to find items later.
pub type Attributes = HashMap<String, String>;
