//! Google Sheets v4 backed store.

use std::sync::Arc;

use async_trait::async_trait;
use bookclub_kernel::settings::SheetSettings;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AccessTokens;
use crate::error::StoreError;
use crate::row::Row;
use crate::store::{ensure_title, title_index, BookStore, STATUS_COLUMN};

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const VALUE_INPUT: &str = "RAW";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// The first worksheet of one spreadsheet, addressed by id.
pub struct SheetsStore {
    client: Client,
    tokens: Arc<dyn AccessTokens>,
    sheets_base: Url,
    spreadsheet_id: String,
    worksheet: String,
}

impl SheetsStore {
    /// Resolve the spreadsheet (by id, or by name through Drive) and its first worksheet.
    pub async fn open(
        client: Client,
        tokens: Arc<dyn AccessTokens>,
        settings: &SheetSettings,
    ) -> Result<Self, StoreError> {
        let sheets_base = parse_base(&settings.sheets_api_base)?;
        let spreadsheet_id = match settings
            .spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            Some(id) => id.to_string(),
            None => {
                find_spreadsheet_by_name(
                    &client,
                    tokens.as_ref(),
                    &settings.drive_api_base,
                    &settings.spreadsheet_name,
                )
                .await?
            }
        };

        let mut store = Self {
            client,
            tokens,
            sheets_base,
            spreadsheet_id,
            worksheet: String::new(),
        };
        store.worksheet = store.first_worksheet().await?;

        tracing::info!(
            spreadsheet = %store.spreadsheet_id,
            worksheet = %store.worksheet,
            "opened spreadsheet"
        );
        Ok(store)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.sheets_base.clone();
        url.path_segments_mut()
            .map_err(|_| cannot_be_base(&self.sheets_base))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        check_status(response).await
    }

    async fn first_worksheet(&self) -> Result<String, StoreError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(title,index)");

        let response = match self.send(self.client.get(url)).await {
            Err(StoreError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(StoreError::SpreadsheetNotFound(self.spreadsheet_id.clone()));
            }
            other => other?,
        };
        let meta: SpreadsheetMeta = response.json().await.map_err(decode_error)?;

        meta.sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .min_by_key(|props| props.index)
            .map(|props| props.title)
            .ok_or_else(|| StoreError::Decode("spreadsheet has no worksheets".to_string()))
    }

    /// All lines of the worksheet, header included, as display strings.
    async fn read_lines(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let range = quote_sheet(&self.worksheet);
        let url = self.endpoint(&["values", range.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        let body: ValueRange = response.json().await.map_err(decode_error)?;

        Ok(body
            .values
            .into_iter()
            .map(|line| line.into_iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl BookStore for SheetsStore {
    fn describe(&self) -> String {
        format!("{}/{}", self.spreadsheet_id, self.worksheet)
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>, StoreError> {
        let mut lines = self.read_lines().await?.into_iter();
        let Some(header) = lines.next() else {
            return Ok(Vec::new());
        };

        Ok(lines
            .filter(|line| line.iter().any(|cell| !cell.trim().is_empty()))
            .map(|line| Row::from_sheet(&header, &line))
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

        let range = format!("{}!A1:append", quote_sheet(&self.worksheet));
        let mut url = self.endpoint(&["values", range.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT)
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = json!({ "values": [[title, author, owner, status]] });
        self.send(self.client.post(url).json(&body)).await?;

        tracing::info!(store = %self.describe(), title, "appended row");
        Ok(())
    }

    async fn find_and_set_status(&self, title: &str, status: &str) -> Result<(), StoreError> {
        let lines = self.read_lines().await?;
        let Some((header, data)) = lines.split_first() else {
            return Err(StoreError::TitleNotFound(title.to_string()));
        };

        let column = title_index(header);
        let position = data
            .iter()
            .position(|line| line.get(column).map(String::as_str) == Some(title))
            .ok_or_else(|| StoreError::TitleNotFound(title.to_string()))?;

        // Sheet rows are 1-based and row 1 is the header.
        let sheet_row = position + 2;
        let cell = format!(
            "{}!{}{}",
            quote_sheet(&self.worksheet),
            column_letter(STATUS_COLUMN),
            sheet_row
        );
        let mut url = self.endpoint(&["values", cell.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT);

        let body = json!({ "range": cell, "majorDimension": "ROWS", "values": [[status]] });
        self.send(self.client.put(url).json(&body)).await?;

        tracing::info!(store = %self.describe(), title, status, row = sheet_row, "updated status");
        Ok(())
    }
}

async fn find_spreadsheet_by_name(
    client: &Client,
    tokens: &dyn AccessTokens,
    drive_base: &str,
    name: &str,
) -> Result<String, StoreError> {
    let base = parse_base(drive_base)?;
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| cannot_be_base(&base))?
        .pop_if_empty()
        .extend(["drive", "v3", "files"]);

    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    let query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME
    );
    url.query_pairs_mut()
        .append_pair("q", &query)
        .append_pair("fields", "files(id,name)")
        .append_pair("supportsAllDrives", "true")
        .append_pair("includeItemsFromAllDrives", "true");

    let token = tokens.access_token().await?;
    let response = check_status(client.get(url).bearer_auth(token).send().await?).await?;
    let listing: FileList = response.json().await.map_err(decode_error)?;

    listing
        .files
        .into_iter()
        .find(|file| file.name == name)
        .map(|file| file.id)
        .ok_or_else(|| StoreError::SpreadsheetNotFound(name.to_string()))
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        message: api_message(&body),
    })
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn parse_base(raw: &str) -> Result<Url, StoreError> {
    Url::parse(raw).map_err(|e| StoreError::Configuration(format!("invalid API base '{}': {}", raw, e)))
}

fn cannot_be_base(url: &Url) -> StoreError {
    StoreError::Configuration(format!("'{}' cannot be used as an API base", url))
}

fn decode_error(err: reqwest::Error) -> StoreError {
    StoreError::Decode(err.to_string())
}

/// A1-notation sheet prefix; single quotes inside the title are doubled.
fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// 1-based column index to A1 letters (1 → A, 27 → AA).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
