//! Connect-once handle to the configured store.

use std::sync::Arc;
use std::time::Duration;

use bookclub_kernel::settings::{CredentialSettings, SheetSettings, StoreBackend};
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::auth::{AccessTokens, ServiceAccountAuth};
use crate::credentials;
use crate::error::StoreError;
use crate::google::SheetsStore;
use crate::memory::MemoryStore;
use crate::store::BookStore;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Lazily established store handle shared by the whole process.
///
/// The first successful connect is kept for the life of the process and never
/// torn down. A failed attempt leaves the cell empty so the next caller retries.
pub struct Connection {
    sheet: SheetSettings,
    credentials: CredentialSettings,
    store: OnceCell<Arc<dyn BookStore>>,
}

impl Connection {
    pub fn new(sheet: SheetSettings, credentials: CredentialSettings) -> Self {
        Self {
            sheet,
            credentials,
            store: OnceCell::new(),
        }
    }

    /// A connection that is already established with `store`.
    pub fn with_store(store: Arc<dyn BookStore>) -> Self {
        Self {
            sheet: SheetSettings::default(),
            credentials: CredentialSettings::default(),
            store: OnceCell::new_with(Some(store)),
        }
    }

    pub fn backend(&self) -> StoreBackend {
        self.sheet.backend
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// Return the cached store, connecting first if nothing is cached yet.
    pub async fn connect(&self) -> Result<Arc<dyn BookStore>, StoreError> {
        match self
            .store
            .get_or_try_init(|| open_store(&self.sheet, &self.credentials))
            .await
        {
            Ok(store) => Ok(Arc::clone(store)),
            Err(err) => {
                tracing::error!(backend = ?self.sheet.backend, error = %err, "connecting to the store failed");
                Err(err)
            }
        }
    }
}

async fn open_store(
    sheet: &SheetSettings,
    credentials: &CredentialSettings,
) -> Result<Arc<dyn BookStore>, StoreError> {
    match sheet.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Google => {
            let (key, source) = credentials::resolve(credentials).await?;
            let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
            let auth = ServiceAccountAuth::new(client.clone(), key)?;

            // Authenticate now so bad credentials fail the connect, not the first read.
            auth.access_token().await?;
            tracing::info!(
                client = auth.client_email(),
                source = %source,
                "service account authenticated"
            );

            let store = SheetsStore::open(client, Arc::new(auth), sheet).await?;
            Ok(Arc::new(store))
        }
    }
}
