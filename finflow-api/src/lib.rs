pub mod endpoints;
mod error;
mod macros;
pub mod repositories;

pub use crate::error::{ApiError, ErrorKind};
use repositories::*;
use tower_api_client::{Client as ApiClient, Request as ApiRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

pub struct Client {
    inner: ApiClient,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: ApiClient::new(base_url),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, ApiError>
    where
        R: ApiRequest,
    {
        self.inner.send(request).await.map_err(From::from)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

pub struct Request;

impl Request {
    pub fn new() -> Self {
        Self {}
    }

    pub fn transactions() -> TransactionRepository {
        TransactionRepository::new()
    }

    pub fn categories() -> CategoryRepository {
        CategoryRepository::new()
    }

    pub fn budgets() -> BudgetRepository {
        BudgetRepository::new()
    }

    pub fn recurring() -> RecurringRepository {
        RecurringRepository::new()
    }

    pub fn analytics() -> AnalyticsRepository {
        AnalyticsRepository::new()
    }

    pub fn csv() -> CsvRepository {
        CsvRepository::new()
    }

    pub fn tasks() -> TaskRepository {
        TaskRepository::new()
    }
}
