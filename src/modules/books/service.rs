//! The shelf: snapshot reads and the two mutations, each followed by an invalidation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bookclub_sheets::{BookStore, Connection, Row, StoreError};
use tokio::sync::RwLock;

use super::models::{current_pick, BookRecord, NewBook, Status};

/// Everything one page render needs, read in a single pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub records: Vec<BookRecord>,
}

impl Snapshot {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let records = rows.iter().map(BookRecord::from_row).collect();
        Self { rows, records }
    }

    pub fn current_pick(&self) -> Option<&BookRecord> {
        current_pick(&self.records)
    }

    /// Non-empty titles in storage order, for the status selector.
    pub fn titles(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|record| record.title.as_str())
            .filter(|title| !title.is_empty())
            .collect()
    }
}

/// Outcome of an add-book submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(BookRecord),
    /// The title was blank; nothing was written.
    Skipped,
}

struct CachedSnapshot {
    snapshot: Snapshot,
    fetched_at: Instant,
}

pub struct Shelf {
    connection: Arc<Connection>,
    cache_ttl: Duration,
    cached: RwLock<Option<CachedSnapshot>>,
}

impl Shelf {
    /// A zero `cache_ttl` makes every snapshot a fresh read.
    pub fn new(connection: Arc<Connection>, cache_ttl: Duration) -> Self {
        Self {
            connection,
            cache_ttl,
            cached: RwLock::new(None),
        }
    }

    async fn store(&self) -> Result<Arc<dyn BookStore>, StoreError> {
        self.connection.connect().await
    }

    /// Current rows of the sheet.
    ///
    /// Only a failed connection is an error. A failed read yields an empty
    /// snapshot, which is never cached.
    pub async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        if !self.cache_ttl.is_zero() {
            if let Some(cached) = self.cached.read().await.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(cached.snapshot.clone());
                }
            }
        }

        let store = self.store().await?;
        let rows = match store.fetch_rows().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(store = %store.describe(), error = %err, "read failed; serving empty shelf");
                return Ok(Snapshot::default());
            }
        };

        let snapshot = Snapshot::from_rows(rows);
        if !self.cache_ttl.is_zero() {
            *self.cached.write().await = Some(CachedSnapshot {
                snapshot: snapshot.clone(),
                fetched_at: Instant::now(),
            });
        }
        Ok(snapshot)
    }

    /// Drop any cached snapshot so the next read goes to the store.
    pub async fn invalidate(&self) {
        self.cached.write().await.take();
    }

    /// Append `book` as Available. A blank title is a no-op.
    pub async fn add_book(&self, book: NewBook) -> Result<AddOutcome, StoreError> {
        let book = book.trimmed();
        if book.title.is_empty() {
            tracing::debug!("add-book submitted without a title; ignoring");
            return Ok(AddOutcome::Skipped);
        }

        let status = Status::Available;
        let store = self.store().await?;
        store
            .append(&book.title, &book.author, &book.owner, status.label())
            .await?;
        self.invalidate().await;

        tracing::info!(title = %book.title, owner = %book.owner, "book added");
        Ok(AddOutcome::Added(BookRecord {
            title: book.title,
            author: book.author,
            owner: book.owner,
            status: status.label().to_string(),
        }))
    }

    /// Overwrite the status of the first book titled `title`.
    ///
    /// Last write wins: nothing detects a concurrent edit between lookup and write.
    pub async fn set_status(&self, title: &str, status: Status) -> Result<(), StoreError> {
        let store = self.store().await?;
        store.find_and_set_status(title, status.label()).await?;
        self.invalidate().await;

        tracing::info!(title, status = %status, "status updated");
        Ok(())
    }
}
