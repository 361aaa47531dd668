//! An in-memory stand-in for a Secret Service.
//!
//! It keeps collections and items in shared state and can be told to
//! misbehave at every step of a store-and-read-back run, which makes it
//! possible to exercise the failure paths without a running keyring daemon.
//!
//! ```
//! use keyring_smoke::{Attributes, Secret, memory::Service};
//!
//! let service = Service::new();
//! let session = service.connect().unwrap();
//! let collection = session.default_collection().unwrap();
//! let item = collection
//!     .create_item("label-123", &Attributes::new(), &Secret::text("password-123"), false)
//!     .unwrap();
//! assert_eq!(item.secret().unwrap(), Secret::text("password-123"));
//! session.close().unwrap();
//! assert_eq!(service.open_sessions(), 0);
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Attributes, Secret, dbus::DEFAULT_COLLECTION};

/// Errors reported by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The service can't be reached.
    Unreachable,
    /// The collection alias doesn't resolve to any collection.
    NotFound(String),
    /// The unlock prompt was dismissed.
    Dismissed,
    /// The object doesn't exist anymore.
    NoSuchObject(String),
    /// The service refused the operation.
    PermissionDenied(&'static str),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "The Secret Service is not reachable"),
            Self::NotFound(alias) => write!(f, "The collection alias '{alias}' doesn't exist"),
            Self::Dismissed => write!(f, "Prompt was dismissed"),
            Self::NoSuchObject(path) => write!(f, "Object '{path}' doesn't exist"),
            Self::PermissionDenied(op) => write!(f, "Permission denied: {op}"),
        }
    }
}

/// A misbehaviour to inject into the in-memory service.
#[derive(Clone, PartialEq, Eq)]
pub enum Fault {
    /// `CreateItem` is rejected.
    RejectCreate,
    /// `GetSecret` is rejected, as if access was revoked after the write.
    RevokeSecrets,
    /// `GetSecret` returns these bytes instead of what was stored.
    ReplacePayload(Vec<u8>),
    /// `Delete` is rejected.
    RejectDelete,
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RejectCreate => write!(f, "RejectCreate"),
            Self::RevokeSecrets => write!(f, "RevokeSecrets"),
            Self::ReplacePayload(bytes) => write!(f, "ReplacePayload({} bytes)", bytes.len()),
            Self::RejectDelete => write!(f, "RejectDelete"),
        }
    }
}

/// A stored item, as seen from outside the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub path: String,
    pub label: String,
    pub attributes: Attributes,
    pub secret: Secret,
}

#[derive(Debug)]
struct CollectionState {
    path: String,
    label: String,
    locked: bool,
    items: Vec<StoredItem>,
}

impl CollectionState {
    fn new(name: &str, label: &str) -> Self {
        Self {
            path: format!("/org/freedesktop/secrets/collection/{name}"),
            label: label.to_owned(),
            locked: false,
            items: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct State {
    reachable: bool,
    dismiss_prompts: bool,
    aliases: HashMap<String, CollectionState>,
    faults: Vec<Fault>,
    open_sessions: usize,
    next_id: u64,
}

impl State {
    fn has_fault(&self, fault: &Fault) -> bool {
        self.faults.contains(fault)
    }

    fn replaced_payload(&self) -> Option<&[u8]> {
        self.faults.iter().find_map(|fault| match fault {
            Fault::ReplacePayload(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    fn collection_mut(&mut self, alias: &str) -> Result<&mut CollectionState, Error> {
        self.aliases
            .get_mut(alias)
            .ok_or_else(|| Error::NotFound(alias.to_owned()))
    }
}

/// Whether `item` carries every one of the searched `attributes`.
fn matches_attributes(item: &Attributes, attributes: &Attributes) -> bool {
    attributes.iter().all(|(k, v)| item.get(k) == Some(v))
}

type Shared = Arc<Mutex<State>>;

fn lock(state: &Shared) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The in-memory service. Cloning it gives another handle on the same state.
#[derive(Debug, Clone)]
pub struct Service {
    state: Shared,
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

impl Service {
    /// A reachable service with an unlocked `default` collection.
    pub fn new() -> Self {
        let service = Self::empty();
        lock(&service.state).aliases.insert(
            DEFAULT_COLLECTION.to_owned(),
            CollectionState::new("login", "Login"),
        );
        service
    }

    /// A reachable service without any collection.
    pub fn empty() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                reachable: true,
                dismiss_prompts: false,
                aliases: HashMap::new(),
                faults: Vec::new(),
                open_sessions: 0,
                next_id: 1,
            })),
        }
    }

    /// A service that can't be connected to.
    pub fn unreachable() -> Self {
        let service = Self::new();
        lock(&service.state).reachable = false;
        service
    }

    /// Lock the `default` collection. Connecting clients are prompted to
    /// unlock it.
    pub fn lock_default_collection(self) -> Self {
        if let Some(collection) = lock(&self.state).aliases.get_mut(DEFAULT_COLLECTION) {
            collection.locked = true;
        }
        self
    }

    /// Make every prompt end up dismissed.
    pub fn dismiss_prompts(self) -> Self {
        lock(&self.state).dismiss_prompts = true;
        self
    }

    /// Store an item in the `default` collection, as if another application
    /// had created it.
    pub fn with_item(self, label: &str, attributes: Attributes, secret: Secret) -> Self {
        {
            let mut state = lock(&self.state);
            let id = state.next_id;
            if let Some(collection) = state.aliases.get_mut(DEFAULT_COLLECTION) {
                collection.items.push(StoredItem {
                    path: format!("{}/{id}", collection.path),
                    label: label.to_owned(),
                    attributes,
                    secret,
                });
                state.next_id += 1;
            }
        }
        self
    }

    /// Inject a fault.
    pub fn with_fault(self, fault: Fault) -> Self {
        lock(&self.state).faults.push(fault);
        self
    }

    /// Open a session.
    pub fn connect(&self) -> Result<Session, Error> {
        let mut state = lock(&self.state);
        if !state.reachable {
            return Err(Error::Unreachable);
        }
        state.open_sessions += 1;
        Ok(Session {
            state: Arc::clone(&self.state),
            closed: false,
        })
    }

    /// Number of sessions that were opened and not closed yet.
    pub fn open_sessions(&self) -> usize {
        lock(&self.state).open_sessions
    }

    /// Items stored in the `default` collection.
    pub fn items(&self) -> Vec<StoredItem> {
        lock(&self.state)
            .aliases
            .get(DEFAULT_COLLECTION)
            .map(|collection| collection.items.clone())
            .unwrap_or_default()
    }

    /// Whether the `default` collection is locked.
    pub fn is_default_collection_locked(&self) -> bool {
        lock(&self.state)
            .aliases
            .get(DEFAULT_COLLECTION)
            .is_some_and(|collection| collection.locked)
    }
}

/// A session opened on the in-memory [`Service`].
#[derive(Debug)]
pub struct Session {
    state: Shared,
    closed: bool,
}

impl Session {
    /// Retrieve the `default` collection, unlocking it if needed.
    pub fn default_collection(&self) -> Result<Collection, Error> {
        self.with_alias(DEFAULT_COLLECTION)
    }

    /// Retrieve the collection behind `alias`, unlocking it if needed.
    pub fn with_alias(&self, alias: &str) -> Result<Collection, Error> {
        let mut state = lock(&self.state);
        let dismiss = state.dismiss_prompts;
        let collection = state.collection_mut(alias)?;
        if collection.locked {
            if dismiss {
                return Err(Error::Dismissed);
            }
            collection.locked = false;
        }
        Ok(Collection {
            state: Arc::clone(&self.state),
            alias: alias.to_owned(),
        })
    }

    /// Close the session.
    pub fn close(mut self) -> Result<(), Error> {
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            let mut state = lock(&self.state);
            state.open_sessions = state.open_sessions.saturating_sub(1);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}

/// A collection of the in-memory [`Service`].
#[derive(Debug)]
pub struct Collection {
    state: Shared,
    alias: String,
}

impl Collection {
    /// The collection label.
    pub fn label(&self) -> Result<String, Error> {
        let mut state = lock(&self.state);
        Ok(state.collection_mut(&self.alias)?.label.clone())
    }

    /// Store a new item.
    ///
    /// With `replace`, every item carrying all of `attributes` is removed
    /// first. Empty `attributes` match every item of the collection.
    pub fn create_item(
        &self,
        label: &str,
        attributes: &Attributes,
        secret: &Secret,
        replace: bool,
    ) -> Result<Item, Error> {
        let mut state = lock(&self.state);
        if state.has_fault(&Fault::RejectCreate) {
            return Err(Error::PermissionDenied("CreateItem"));
        }
        let id = state.next_id;
        let collection = state.collection_mut(&self.alias)?;
        if collection.locked {
            return Err(Error::PermissionDenied("collection is locked"));
        }

        if replace {
            collection
                .items
                .retain(|item| !matches_attributes(&item.attributes, attributes));
        }
        let path = format!("{}/{id}", collection.path);
        collection.items.push(StoredItem {
            path: path.clone(),
            label: label.to_owned(),
            attributes: attributes.clone(),
            secret: secret.clone(),
        });
        state.next_id += 1;

        Ok(Item {
            state: Arc::clone(&self.state),
            alias: self.alias.clone(),
            path,
        })
    }
}

/// An item of the in-memory [`Service`].
#[derive(Debug)]
pub struct Item {
    state: Shared,
    alias: String,
    path: String,
}

impl Item {
    fn with_stored<T>(&self, f: impl FnOnce(&State, &StoredItem) -> T) -> Result<T, Error> {
        let state = lock(&self.state);
        let stored = state
            .aliases
            .get(&self.alias)
            .and_then(|collection| collection.items.iter().find(|item| item.path == self.path))
            .ok_or_else(|| Error::NoSuchObject(self.path.clone()))?;
        Ok(f(&state, stored))
    }

    /// The item label.
    pub fn label(&self) -> Result<String, Error> {
        self.with_stored(|_, item| item.label.clone())
    }

    /// The item attributes.
    pub fn attributes(&self) -> Result<Attributes, Error> {
        self.with_stored(|_, item| item.attributes.clone())
    }

    /// Retrieve the stored secret, or the injected replacement payload.
    pub fn secret(&self) -> Result<Secret, Error> {
        self.with_stored(|state, item| {
            if state.has_fault(&Fault::RevokeSecrets) {
                return Err(Error::PermissionDenied("GetSecret"));
            }
            Ok(match state.replaced_payload() {
                Some(bytes) => Secret::with_content_type(bytes, item.secret.content_type()),
                None => item.secret.clone(),
            })
        })?
    }

    /// Remove the item from its collection.
    pub fn delete(&self) -> Result<(), Error> {
        let mut state = lock(&self.state);
        if state.has_fault(&Fault::RejectDelete) {
            return Err(Error::PermissionDenied("Delete"));
        }
        let collection = state.collection_mut(&self.alias)?;
        let before = collection.items.len();
        collection.items.retain(|item| item.path != self.path);
        if collection.items.len() == before {
            return Err(Error::NoSuchObject(self.path.clone()));
        }
        Ok(())
    }

    /// The item object path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_removes_items_carrying_the_attributes() {
        let service = Service::new();
        let session = service.connect().unwrap();
        let collection = session.default_collection().unwrap();
        let attributes = Attributes::from([("app".to_owned(), "ci".to_owned())]);
        let more = Attributes::from([
            ("app".to_owned(), "ci".to_owned()),
            ("job".to_owned(), "7".to_owned()),
        ]);
        let other = Attributes::from([("app".to_owned(), "mail".to_owned())]);

        let first = collection
            .create_item("first", &more, &Secret::text("one"), false)
            .unwrap();
        collection
            .create_item("other", &other, &Secret::text("keep"), false)
            .unwrap();
        let second = collection
            .create_item("second", &attributes, &Secret::text("two"), true)
            .unwrap();

        assert_ne!(first.path(), second.path());
        assert!(matches!(first.secret(), Err(Error::NoSuchObject(_))));
        let labels = service
            .items()
            .into_iter()
            .map(|item| item.label)
            .collect::<Vec<_>>();
        assert_eq!(labels, ["other", "second"]);
    }

    #[test]
    fn replace_with_empty_attributes_clears_the_collection() {
        let service = Service::new()
            .with_item(
                "mail",
                Attributes::from([("app".to_owned(), "mail".to_owned())]),
                Secret::text("keep-me"),
            )
            .with_item("bare", Attributes::new(), Secret::text("keep-me-too"));
        let session = service.connect().unwrap();
        let collection = session.default_collection().unwrap();

        collection
            .create_item("label-123", &Attributes::new(), &Secret::text("x"), true)
            .unwrap();
        let items = service.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "label-123");
    }

    #[test]
    fn without_replace_items_accumulate() {
        let service = Service::new();
        let session = service.connect().unwrap();
        let collection = session.default_collection().unwrap();

        collection
            .create_item("a", &Attributes::new(), &Secret::text("one"), false)
            .unwrap();
        collection
            .create_item("b", &Attributes::new(), &Secret::text("two"), false)
            .unwrap();
        assert_eq!(service.items().len(), 2);
    }

    #[test]
    fn locked_collection_is_unlocked_on_access() {
        let service = Service::new().lock_default_collection();
        assert!(service.is_default_collection_locked());

        let session = service.connect().unwrap();
        session.default_collection().unwrap();
        assert!(!service.is_default_collection_locked());
    }

    #[test]
    fn dismissed_unlock() {
        let service = Service::new().lock_default_collection().dismiss_prompts();
        let session = service.connect().unwrap();
        assert_eq!(session.default_collection().unwrap_err(), Error::Dismissed);
        assert!(service.is_default_collection_locked());
    }

    #[test]
    fn dropped_session_is_released() {
        let service = Service::new();
        let session = service.connect().unwrap();
        assert_eq!(service.open_sessions(), 1);
        drop(session);
        assert_eq!(service.open_sessions(), 0);
    }

    #[test]
    fn closed_session_is_released_once() {
        let service = Service::new();
        let first = service.connect().unwrap();
        let _second = service.connect().unwrap();
        assert_eq!(service.open_sessions(), 2);

        first.close().unwrap();
        assert_eq!(service.open_sessions(), 1);
    }

    #[test]
    fn deleted_item_is_gone() {
        let service = Service::new();
        let session = service.connect().unwrap();
        let item = session
            .default_collection()
            .unwrap()
            .create_item("label", &Attributes::new(), &Secret::text("x"), false)
            .unwrap();

        item.delete().unwrap();
        assert!(service.items().is_empty());
        assert!(matches!(item.secret(), Err(Error::NoSuchObject(_))));
    }
}
