use crate::macros::setter;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Method, Request, RequestData};
use url::Url;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

// Common

/// Which CSV header feeds each transaction field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transaction_date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: u64,
    pub error: String,
}

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct ImportCsv {
    /// Base64 encoded file body.
    file_content: String,
    mapping: ColumnMapping,
    date_format: String,
}

impl ImportCsv {
    pub fn new(file_content: impl Into<String>, mapping: ColumnMapping) -> Self {
        Self {
            file_content: file_content.into(),
            mapping,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    setter!(date_format: String);

    pub fn file_content(&self) -> &str {
        &self.file_content
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }
}

impl Request for ImportCsv {
    type Data = Self;
    type Response = ImportResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/csv/import".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

// Responses

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub status: ImportStatus,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub created_count: Option<u64>,
    #[serde(default)]
    pub error_count: Option<u64>,
    #[serde(default)]
    pub errors: Option<Vec<ImportRowError>>,
}

// Export

/// Query for the CSV export download. Export is a plain GET link the browser
/// (or any HTTP tool) follows, so only the URL is built here.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<String>,
    pub columns: Vec<String>,
    pub date_format: Option<String>,
}

impl ExportParams {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt start_date: NaiveDate);
    setter!(opt end_date: NaiveDate);
    setter!(opt category_id: String);
    setter!(opt date_format: String);

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

pub fn export_url(base_url: &str, params: &ExportParams) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{}/csv/export", base_url.trim_end_matches('/')))?;
    {
        let mut query = url.query_pairs_mut();
        if let Some(start) = params.start_date {
            query.append_pair("start_date", &start.to_string());
        }
        if let Some(end) = params.end_date {
            query.append_pair("end_date", &end.to_string());
        }
        if let Some(ref category_id) = params.category_id {
            query.append_pair("category_id", category_id);
        }
        if !params.columns.is_empty() {
            query.append_pair("columns", &params.columns.join(","));
        }
        if let Some(ref date_format) = params.date_format {
            query.append_pair("date_format", date_format);
        }
    }
    // An empty serializer still leaves a dangling '?'
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            amount: "Amount".to_string(),
            currency: None,
            category_name: "Category".to_string(),
            description: Some("Memo".to_string()),
            transaction_date: "Date".to_string(),
            kind: "Type".to_string(),
        }
    }

    #[test]
    fn test_import_payload_defaults_date_format() {
        let payload = serde_json::to_value(ImportCsv::new("YQ==", mapping())).unwrap();
        assert_eq!(
            payload,
            json!({
                "file_content": "YQ==",
                "mapping": {
                    "amount": "Amount",
                    "category_name": "Category",
                    "description": "Memo",
                    "transaction_date": "Date",
                    "type": "Type",
                },
                "date_format": "%Y-%m-%d",
            })
        );
    }

    #[test]
    fn test_pending_import_response() {
        let response: ImportResponse =
            serde_json::from_value(json!({ "status": "pending", "task_id": "t-1" })).unwrap();
        assert_eq!(response.status, ImportStatus::Pending);
        assert_eq!(response.task_id.as_deref(), Some("t-1"));
        assert_eq!(response.errors, None);
    }

    #[test]
    fn test_export_url_without_params() {
        let url = export_url("http://localhost:8000/api/v1/", &ExportParams::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/csv/export");
    }

    #[test]
    fn test_export_url_with_params() {
        let params = ExportParams::new()
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .category_id("cat-1")
            .columns(["date", "amount"])
            .date_format("%d.%m.%Y");
        let url = export_url("http://localhost:8000/api/v1", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/csv/export?start_date=2024-01-01&category_id=cat-1&columns=date%2Camount&date_format=%25d.%25m.%25Y"
        );
    }
}
