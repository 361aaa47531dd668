//! The store-and-read-back check.
//!
//! A run connects, resolves the default collection, stores one item, reads
//! its secret back, decodes it as UTF-8 and compares it with what was
//! written. The first failing step ends the run with a [`Failure`] naming
//! that step. The connection is closed whatever the outcome.

use std::{fmt, future::Future, string::FromUtf8Error};

use crate::{Attributes, Error, Keyring, Secret};

/// Label of the item stored by [`SmokeCheck::default`].
pub const DEFAULT_LABEL: &str = "label-123";
/// Password stored by [`SmokeCheck::default`].
pub const DEFAULT_PASSWORD: &str = "password-123";

/// A step of the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Connect,
    Collection,
    CreateItem,
    ReadSecret,
    Decode,
    Verify,
    Cleanup,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Self::Connect,
        Self::Collection,
        Self::CreateItem,
        Self::ReadSecret,
        Self::Decode,
        Self::Verify,
        Self::Cleanup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Collection => "collection",
            Self::CreateItem => "create-item",
            Self::ReadSecret => "read-secret",
            Self::Decode => "decode",
            Self::Verify => "verify",
            Self::Cleanup => "cleanup",
        }
    }

    /// The process exit status reported when the check fails at this stage.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Connect => 3,
            Self::Collection => 4,
            Self::CreateItem => 5,
            Self::ReadSecret => 6,
            Self::Decode => 7,
            Self::Verify => 8,
            Self::Cleanup => 9,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The secret read back differs from the one written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub actual: String,
}

impl std::error::Error for Mismatch {}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Secret Service initialization failure: stored {:?} but read back {:?}",
            self.expected, self.actual
        )
    }
}

/// Why a check failed.
#[derive(Debug)]
pub enum Failure {
    /// The service or the bus couldn't be reached.
    Connection(Error),
    /// No default collection, or it couldn't be unlocked.
    CollectionUnavailable(Error),
    /// The service refused to store the item.
    ItemCreation(Error),
    /// The service couldn't return the stored secret.
    SecretRetrieval(Error),
    /// The secret read back isn't valid UTF-8.
    Decoding(FromUtf8Error),
    /// The secret read back differs from the one written.
    Mismatch(Mismatch),
    /// The item couldn't be deleted after a successful verification.
    Cleanup(Error),
}

impl Failure {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Connection(_) => Stage::Connect,
            Self::CollectionUnavailable(_) => Stage::Collection,
            Self::ItemCreation(_) => Stage::CreateItem,
            Self::SecretRetrieval(_) => Stage::ReadSecret,
            Self::Decoding(_) => Stage::Decode,
            Self::Mismatch(_) => Stage::Verify,
            Self::Cleanup(_) => Stage::Cleanup,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.stage().exit_code()
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connection(e)
            | Self::CollectionUnavailable(e)
            | Self::ItemCreation(e)
            | Self::SecretRetrieval(e)
            | Self::Cleanup(e) => Some(e),
            Self::Decoding(e) => Some(e),
            Self::Mismatch(e) => Some(e),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "Failed to connect to the Secret Service: {e}"),
            Self::CollectionUnavailable(e) => {
                write!(f, "Default collection is unavailable: {e}")
            }
            Self::ItemCreation(e) => write!(f, "Failed to create the item: {e}"),
            Self::SecretRetrieval(e) => write!(f, "Failed to retrieve the secret: {e}"),
            Self::Decoding(e) => write!(f, "Secret is not valid utf-8: {e}"),
            Self::Mismatch(e) => write!(f, "{e}"),
            Self::Cleanup(e) => write!(f, "Failed to delete the item: {e}"),
        }
    }
}

/// Compare the secret read back with the one written. No normalization is
/// applied.
pub fn verify(expected: &str, actual: &str) -> Result<(), Mismatch> {
    if expected == actual {
        Ok(())
    } else {
        Err(Mismatch {
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        })
    }
}

/// The outcome of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub label: String,
    /// Object path of the stored item.
    pub item: String,
    /// The password as read back from the service.
    pub password: String,
    /// Whether the item was deleted after verification.
    pub deleted: bool,
}

/// A store-and-read-back check.
#[derive(Clone)]
pub struct SmokeCheck {
    label: String,
    password: String,
    attributes: Attributes,
    delete: bool,
}

impl Default for SmokeCheck {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for SmokeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmokeCheck")
            .field("label", &self.label)
            .field("attributes", &self.attributes)
            .field("delete", &self.delete)
            .finish_non_exhaustive()
    }
}

impl SmokeCheck {
    pub fn new(label: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            password: password.into(),
            attributes: Attributes::new(),
            delete: false,
        }
    }

    /// Attach an attribute to the stored item.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Delete the item once it was verified. Off by default, the item is left
    /// in the collection.
    pub fn delete_after(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Run the check on the keyring `connect` resolves to.
    ///
    /// The keyring is closed before returning, on success and failure alike.
    /// A failing close is logged and doesn't change the outcome.
    pub async fn run<F>(&self, connect: F) -> Result<Report, Failure>
    where
        F: Future<Output = crate::Result<Keyring>>,
    {
        let keyring = connect.await.map_err(Failure::Connection)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("Connected to the secret-storage service");

        let outcome = self.run_stages(&keyring).await;

        if let Err(_err) = keyring.close().await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to close the secret-storage session: {_err}");
        }
        outcome
    }

    async fn run_stages(&self, keyring: &Keyring) -> Result<Report, Failure> {
        let collection = keyring
            .default_collection()
            .await
            .map_err(Failure::CollectionUnavailable)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("Resolved the default collection");

        let secret = Secret::text(&self.password);
        let item = collection
            .create_item(&self.label, &self.attributes, &secret, false)
            .await
            .map_err(Failure::ItemCreation)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(label = %self.label, item = %item.path(), "Stored the item");

        let resolved = item.secret().await.map_err(Failure::SecretRetrieval)?;
        let password = resolved.to_text().map_err(Failure::Decoding)?;
        verify(&self.password, &password).map_err(Failure::Mismatch)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("Secret read back matches the stored one");

        if self.delete {
            item.delete().await.map_err(Failure::Cleanup)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(item = %item.path(), "Deleted the item");
        }

        Ok(Report {
            label: self.label.clone(),
            item: item.path(),
            password,
            deleted: self.delete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{self, Fault};

    async fn run(check: &SmokeCheck, service: &memory::Service) -> Result<Report, Failure> {
        check.run(async { Keyring::memory(service) }).await
    }

    #[test]
    fn verify_is_exact() {
        assert!(verify("password-123", "password-123").is_ok());
        assert!(verify("password-123", "password-123 ").is_err());
        assert!(verify("password-123", "PASSWORD-123").is_err());
        assert!(verify("", "").is_ok());
    }

    #[test]
    fn mismatch_message() {
        let err = verify("a", "b").unwrap_err();
        assert!(err.to_string().starts_with("Secret Service initialization failure"));
    }

    #[test]
    fn exit_codes_are_distinct_and_non_zero() {
        let mut codes = Stage::ALL.map(Stage::exit_code).to_vec();
        assert!(codes.iter().all(|code| *code != 0 && *code != 1 && *code != 2));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Stage::ALL.len());
    }

    #[tokio::test]
    async fn default_scenario() {
        let service = memory::Service::new();
        let report = run(&SmokeCheck::default(), &service).await.unwrap();

        assert_eq!(report.label, "label-123");
        assert_eq!(report.password, "password-123");
        assert!(!report.deleted);

        let items = service.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "label-123");
        assert!(items[0].attributes.is_empty());
        assert_eq!(items[0].path, report.item);
        assert_eq!(service.open_sessions(), 0);
    }

    #[tokio::test]
    async fn existing_items_are_left_alone() {
        let mail = Attributes::from([("app".to_owned(), "mail".to_owned())]);
        let service = memory::Service::new()
            .with_item("mail", mail.clone(), Secret::text("keep-me"))
            .with_item("bare", Attributes::new(), Secret::text("keep-me-too"));
        run(&SmokeCheck::default(), &service).await.unwrap();

        let items = service.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].attributes, mail);
        assert_eq!(items[0].secret, Secret::text("keep-me"));
        assert_eq!(items[1].secret, Secret::text("keep-me-too"));
    }

    #[tokio::test]
    async fn delete_after_verification() {
        let service = memory::Service::new();
        let check = SmokeCheck::default().delete_after(true);
        let report = run(&check, &service).await.unwrap();

        assert!(report.deleted);
        assert!(service.items().is_empty());
    }

    #[tokio::test]
    async fn connect_failure_stops_the_run() {
        let service = memory::Service::unreachable();
        let err = run(&SmokeCheck::default(), &service).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Connect);
        assert!(service.items().is_empty());
    }

    #[tokio::test]
    async fn tampered_payload_is_a_mismatch() {
        let service =
            memory::Service::new().with_fault(Fault::ReplacePayload(b"password-456".to_vec()));
        let err = run(&SmokeCheck::default(), &service).await.unwrap_err();

        match err {
            Failure::Mismatch(mismatch) => {
                assert_eq!(mismatch.expected, "password-123");
                assert_eq!(mismatch.actual, "password-456");
            }
            other => panic!("expected a mismatch, got {other:?}"),
        }
        assert_eq!(service.open_sessions(), 0);
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_decoding_failure() {
        let service = memory::Service::new().with_fault(Fault::ReplacePayload(vec![0xc3, 0x28]));
        let err = run(&SmokeCheck::default(), &service).await.unwrap_err();

        assert!(matches!(err, Failure::Decoding(_)));
        assert_eq!(err.exit_code(), 7);
    }
}
