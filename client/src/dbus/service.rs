use std::{sync::Arc, time::Duration};

use super::{Collection, DEFAULT_COLLECTION, Error, ServiceError, api};

const METHOD_TIMEOUT: Duration = Duration::from_secs(30);

/// The entry point of communicating with a [`org.freedesktop.Secrets`](https://specifications.freedesktop.org/secret-service-spec/latest/index.html) implementation.
///
/// Connecting opens a `plain` session which stays open until
/// [`Service::close`] is called. A `Service` dropped without being closed
/// schedules the close on the current tokio runtime, if any.
#[derive(Debug)]
pub struct Service {
    inner: api::Service,
    session: Arc<api::Session>,
    closed: bool,
}

impl Service {
    /// Connect to the session bus and open a session with the Secret Service.
    #[cfg_attr(feature = "tracing", tracing::instrument)]
    pub async fn connect() -> Result<Self, Error> {
        let cnx = zbus::connection::Builder::session()?
            .method_timeout(METHOD_TIMEOUT)
            .build()
            .await?;
        Self::with_connection(&cnx).await
    }

    /// Open a session on an already established bus connection.
    pub async fn with_connection(cnx: &zbus::Connection) -> Result<Self, Error> {
        let service = api::Service::new(cnx).await?;
        let session = service.open_session().await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(session = %session.path(), "Opened a plain Secret Service session");

        Ok(Self {
            inner: service,
            session: Arc::new(session),
            closed: false,
        })
    }

    /// Retrieve the collection behind the `default` alias, unlocking it if
    /// needed.
    ///
    /// The collection is never created: a missing alias fails with
    /// [`Error::NotFound`].
    pub async fn default_collection(&self) -> Result<Collection, Error> {
        self.with_alias(DEFAULT_COLLECTION).await
    }

    /// Retrieve the collection behind `alias`, unlocking it if needed.
    pub async fn with_alias(&self, alias: &str) -> Result<Collection, Error> {
        let collection = self
            .inner
            .read_alias(alias)
            .await?
            .ok_or_else(|| Error::NotFound(alias.to_owned()))?;

        if collection.is_locked().await? {
            #[cfg(feature = "tracing")]
            tracing::debug!(alias, "Collection is locked, requesting an unlock");
            let path = collection.inner().path().clone();
            self.inner.unlock(&[path]).await?;
            if collection.is_locked().await? {
                return Err(ServiceError::IsLocked(format!(
                    "Collection '{alias}' is still locked"
                ))
                .into());
            }
        }

        Ok(Collection::new(Arc::clone(&self.session), collection))
    }

    /// Close the Secret Service session.
    pub async fn close(mut self) -> Result<(), Error> {
        self.closed = true;
        self.session.close().await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(session = %self.session.path(), "Closed the Secret Service session");
        Ok(())
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        // Only close the session if this is the last reference to it
        if self.closed || Arc::strong_count(&self.session) != 1 {
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let session = Arc::clone(&self.session);
            handle.spawn(async move {
                let _ = session.close().await;
            });
        }
    }
}
