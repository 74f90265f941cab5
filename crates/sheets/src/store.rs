//! The store seam: every read and write of the book table goes through [`BookStore`].

use async_trait::async_trait;

use crate::error::StoreError;
use crate::row::Row;

/// Fixed column order of the book table.
pub const COLUMNS: [&str; 4] = ["Title", "Author", "Owner", "Status"];

/// Header used to find a book by title.
pub const TITLE_COLUMN: &str = "Title";

/// 1-based position of the status column; updates always write here.
pub const STATUS_COLUMN: usize = 4;

/// Row-level access to the one sheet that holds the shelf.
///
/// There is no optimistic concurrency: a writer landing between the lookup and
/// the write of [`BookStore::find_and_set_status`] is silently overwritten.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Human-readable name of the backing resource, for logs.
    fn describe(&self) -> String;

    /// Every data row in storage order.
    async fn fetch_rows(&self) -> Result<Vec<Row>, StoreError>;

    /// Every data row, or an empty list when the read fails.
    ///
    /// An empty result is therefore ambiguous between "no books" and "read failed".
    async fn list_all(&self) -> Vec<Row> {
        match self.fetch_rows().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(store = %self.describe(), error = %err, "read failed; serving empty shelf");
                Vec::new()
            }
        }
    }

    /// Append one row with the four fixed columns.
    async fn append(
        &self,
        title: &str,
        author: &str,
        owner: &str,
        status: &str,
    ) -> Result<(), StoreError>;

    /// Overwrite the status cell of the first row whose title equals `title`.
    async fn find_and_set_status(&self, title: &str, status: &str) -> Result<(), StoreError>;
}

/// Reject blank titles before anything is written.
pub(crate) fn ensure_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    Ok(())
}

/// 0-based index of the title column in `header`, column A when absent.
pub(crate) fn title_index(header: &[String]) -> usize {
    header
        .iter()
        .position(|name| name.trim() == TITLE_COLUMN)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_titles_are_rejected() {
        assert!(matches!(ensure_title(""), Err(StoreError::EmptyTitle)));
        assert!(matches!(ensure_title("   "), Err(StoreError::EmptyTitle)));
        assert!(ensure_title("Dune").is_ok());
    }

    #[test]
    fn title_column_falls_back_to_first() {
        let header: Vec<String> = vec!["Owner".into(), "Title".into()];
        assert_eq!(title_index(&header), 1);

        let header: Vec<String> = vec!["Name".into(), "Author".into()];
        assert_eq!(title_index(&header), 0);
    }
}
