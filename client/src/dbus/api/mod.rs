use zbus::{
    names::{BusName, WellKnownName},
    zvariant::ObjectPath,
};

pub(crate) const DESTINATION: BusName<'static> =
    BusName::WellKnown(WellKnownName::from_static_str_unchecked("org.freedesktop.secrets"));
pub(crate) const PATH: ObjectPath<'static> =
    ObjectPath::from_static_str_unchecked("/org/freedesktop/secrets");

mod collection;
mod item;
mod prompt;
mod properties;
mod secret;
mod service;
mod session;

pub use collection::Collection;
pub use item::Item;
pub(crate) use prompt::Prompt;
pub(crate) use properties::Properties;
pub use secret::{DBusSecret, DBusSecretInner};
pub use service::Service;
pub use session::Session;
