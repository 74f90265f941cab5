//! In-process store with the same contract as the spreadsheet, for demos and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::row::Row;
use crate::store::{ensure_title, title_index, BookStore, COLUMNS, STATUS_COLUMN};

pub struct MemoryStore {
    header: Vec<String>,
    lines: RwLock<Vec<Vec<String>>>,
}

impl MemoryStore {
    /// Empty table with the standard header.
    pub fn new() -> Self {
        Self::with_lines(Vec::<[&str; 4]>::new())
    }

    /// Table pre-filled with `(title, author, owner, status)` lines.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = [S; 4]>,
        S: Into<String>,
    {
        let lines = lines
            .into_iter()
            .map(|line| line.into_iter().map(Into::into).collect())
            .collect();
        Self {
            header: COLUMNS.iter().map(|c| c.to_string()).collect(),
            lines: RwLock::new(lines),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>, StoreError> {
        let lines = self.lines.read().await;
        Ok(lines
            .iter()
            .map(|line| Row::from_sheet(&self.header, line))
            .collect())
    }

    async fn append(
        &self,
        title: &str,
        author: &str,
        owner: &str,
        status: &str,
    ) -> Result<(), StoreError> {
        ensure_title(title)?;
        let mut lines = self.lines.write().await;
        lines.push(vec![
            title.to_string(),
            author.to_string(),
            owner.to_string(),
            status.to_string(),
        ]);
        Ok(())
    }

    async fn find_and_set_status(&self, title: &str, status: &str) -> Result<(), StoreError> {
        let column = title_index(&self.header);
        let mut lines = self.lines.write().await;
        let line = lines
            .iter_mut()
            .find(|line| line.get(column).map(String::as_str) == Some(title))
            .ok_or_else(|| StoreError::TitleNotFound(title.to_string()))?;

        if line.len() < STATUS_COLUMN {
            line.resize(STATUS_COLUMN, String::new());
        }
        line[STATUS_COLUMN - 1] = status.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.get("Status").unwrap_or("")).collect()
    }

    #[tokio::test]
    async fn append_keeps_storage_order() {
        let store = MemoryStore::with_lines([["Dune", "Herbert", "Alice", "Available"]]);
        store
            .append("Hyperion", "Simmons", "Bob", "Available")
            .await
            .unwrap();

        let rows = store.fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("Title"), Some("Hyperion"));
        assert_eq!(rows[1].get("Owner"), Some("Bob"));
        assert_eq!(rows[1].get("Status"), Some("Available"));
    }

    #[tokio::test]
    async fn append_without_title_writes_nothing() {
        let store = MemoryStore::new();
        let err = store.append("", "Herbert", "Alice", "Available").await;
        assert!(matches!(err, Err(StoreError::EmptyTitle)));
        assert!(store.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn set_status_touches_only_first_match() {
        let store = MemoryStore::with_lines([
            ["Dune", "Herbert", "Alice", "Available"],
            ["Hyperion", "Simmons", "Bob", "Available"],
            ["Dune", "Herbert", "Carol", "Available"],
        ]);
        store.find_and_set_status("Dune", "Borrowed").await.unwrap();

        let rows = store.fetch_rows().await.unwrap();
        assert_eq!(statuses(&rows), vec!["Borrowed", "Available", "Available"]);
        assert_eq!(rows[0].get("Owner"), Some("Alice"));
    }

    #[tokio::test]
    async fn set_status_for_unknown_title_fails_without_mutation() {
        let store = MemoryStore::with_lines([["Dune", "Herbert", "Alice", "Available"]]);
        let before = store.fetch_rows().await.unwrap();

        let err = store.find_and_set_status("Solaris", "Lost").await;
        assert!(matches!(err, Err(StoreError::TitleNotFound(t)) if t == "Solaris"));
        assert_eq!(store.fetch_rows().await.unwrap(), before);
    }
}
