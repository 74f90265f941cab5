use std::fmt;
use std::str::FromStr;

use bookclub_sheets::Row;
use serde::{Deserialize, Serialize};

/// Lending state of a book, stored in the sheet by its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    Available,
    Borrowed,
    CurrentlyReading,
    Lost,
}

impl Status {
    /// Every status, in the order offered by the status selector.
    pub const ALL: [Status; 4] = [
        Status::Available,
        Status::Borrowed,
        Status::CurrentlyReading,
        Status::Lost,
    ];

    /// Cell text written to the sheet.
    pub fn label(self) -> &'static str {
        match self {
            Status::Available => "Available",
            Status::Borrowed => "Borrowed",
            Status::CurrentlyReading => "Currently Reading",
            Status::Lost => "Lost",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for Status {
    type Err = UnknownStatus;

    /// Accepts labels case-insensitively, with or without the space or an underscore.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "available" => Ok(Status::Available),
            "borrowed" => Ok(Status::Borrowed),
            "currentlyreading" => Ok(Status::CurrentlyReading),
            "lost" => Ok(Status::Lost),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_string()
    }
}

/// One book as read from the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub owner: String,
    /// Raw status cell; labels outside [`Status`] are kept as written.
    pub status: String,
}

impl BookRecord {
    /// Read the four known columns by header name; absent columns are empty.
    pub fn from_row(row: &Row) -> Self {
        let cell = |column: &str| row.get(column).unwrap_or_default().to_string();
        Self {
            title: cell("Title"),
            author: cell("Author"),
            owner: cell("Owner"),
            status: cell("Status"),
        }
    }

    pub fn parsed_status(&self) -> Option<Status> {
        self.status.parse().ok()
    }
}

/// Add-book input, shared by the HTML form and the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub owner: String,
}

impl NewBook {
    /// Same book with surrounding whitespace removed from every field.
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            owner: self.owner.trim().to_string(),
        }
    }
}

/// Status-update input of the JSON API.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub title: String,
    pub status: Status,
}

/// Status-update input of the HTML form; the status is parsed by the handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
}

/// The first record marked as currently read, in storage order.
///
/// Several records may carry the status; no tie-break beyond storage order is applied.
pub fn current_pick(records: &[BookRecord]) -> Option<&BookRecord> {
    records
        .iter()
        .find(|record| record.parsed_status() == Some(Status::CurrentlyReading))
}
