use crate::entity::Entity;
use chrono::NaiveDate;
use finflow_api::{
    endpoints::{
        analytics::{CategorySpending, Summary, TrendPeriod, TrendPoint},
        budgets::{Budget, BudgetUpdate, NewBudget},
        categories::{Category, CategoryUpdate, NewCategory},
        csv::{ImportCsv, ImportResponse},
        recurring::{NewRecurringTransaction, RecurringTransaction, RecurringTransactionUpdate},
        tasks::TaskStatusResponse,
        transactions::{NewTransaction, Transaction, TransactionFilters, TransactionUpdate},
        TransactionType,
    },
    ApiError, Client, Request,
};
use std::future::Future;
use std::sync::Arc;

/// CRUD calls for one entity collection.
pub trait RemoteCollection<E: Entity>: Send + Sync + 'static {
    fn list(&self, filter: E::Filter) -> impl Future<Output = Result<Vec<E>, ApiError>> + Send;

    fn create(&self, draft: E::Draft) -> impl Future<Output = Result<E, ApiError>> + Send;

    fn update(
        &self,
        id: String,
        patch: E::Patch,
    ) -> impl Future<Output = Result<E, ApiError>> + Send;

    fn delete(&self, id: String) -> impl Future<Output = Result<(), ApiError>> + Send;
}

pub trait AnalyticsSource: Send + Sync + 'static {
    fn summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Summary, ApiError>> + Send;

    fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        period: Option<TrendPeriod>,
    ) -> impl Future<Output = Result<Vec<TrendPoint>, ApiError>> + Send;

    fn top_categories(
        &self,
        limit: u32,
        kind: Option<TransactionType>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CategorySpending>, ApiError>> + Send;
}

/// CSV submission and background task status.
pub trait TaskSource: Send + Sync + 'static {
    fn import_csv(
        &self,
        request: ImportCsv,
    ) -> impl Future<Output = Result<ImportResponse, ApiError>> + Send;

    fn task_status(
        &self,
        task_id: String,
    ) -> impl Future<Output = Result<TaskStatusResponse, ApiError>> + Send;
}

/// Remote backed by the REST API.
#[derive(Clone)]
pub struct HttpRemote {
    client: Arc<Client>,
}

impl HttpRemote {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl RemoteCollection<Transaction> for HttpRemote {
    async fn list(&self, filter: TransactionFilters) -> Result<Vec<Transaction>, ApiError> {
        let page = self
            .client
            .send(Request::transactions().list(filter))
            .await?;
        tracing::debug!(
            "Fetched page {}/{} of transactions",
            page.pagination.page,
            page.pagination.total_pages
        );
        Ok(page.data)
    }

    async fn create(&self, draft: NewTransaction) -> Result<Transaction, ApiError> {
        let res = self.client.send(Request::transactions().create(draft)).await?;
        Ok(res.data)
    }

    async fn update(&self, id: String, patch: TransactionUpdate) -> Result<Transaction, ApiError> {
        let res = self
            .client
            .send(Request::transactions().update(&id, patch))
            .await?;
        Ok(res.data)
    }

    async fn delete(&self, id: String) -> Result<(), ApiError> {
        self.client.send(Request::transactions().delete(&id)).await?;
        Ok(())
    }
}

impl RemoteCollection<Category> for HttpRemote {
    async fn list(&self, filter: Option<TransactionType>) -> Result<Vec<Category>, ApiError> {
        self.client.send(Request::categories().list(filter)).await
    }

    async fn create(&self, draft: NewCategory) -> Result<Category, ApiError> {
        self.client.send(Request::categories().create(draft)).await
    }

    async fn update(&self, id: String, patch: CategoryUpdate) -> Result<Category, ApiError> {
        self.client
            .send(Request::categories().update(&id, patch))
            .await
    }

    async fn delete(&self, id: String) -> Result<(), ApiError> {
        self.client.send(Request::categories().delete(&id)).await?;
        Ok(())
    }
}

impl RemoteCollection<Budget> for HttpRemote {
    async fn list(&self, _filter: ()) -> Result<Vec<Budget>, ApiError> {
        self.client.send(Request::budgets().list()).await
    }

    async fn create(&self, draft: NewBudget) -> Result<Budget, ApiError> {
        self.client.send(Request::budgets().create(draft)).await
    }

    async fn update(&self, id: String, patch: BudgetUpdate) -> Result<Budget, ApiError> {
        self.client.send(Request::budgets().update(&id, patch)).await
    }

    async fn delete(&self, id: String) -> Result<(), ApiError> {
        self.client.send(Request::budgets().delete(&id)).await?;
        Ok(())
    }
}

impl RemoteCollection<RecurringTransaction> for HttpRemote {
    async fn list(&self, _filter: ()) -> Result<Vec<RecurringTransaction>, ApiError> {
        self.client.send(Request::recurring().list()).await
    }

    async fn create(
        &self,
        draft: NewRecurringTransaction,
    ) -> Result<RecurringTransaction, ApiError> {
        self.client.send(Request::recurring().create(draft)).await
    }

    async fn update(
        &self,
        id: String,
        patch: RecurringTransactionUpdate,
    ) -> Result<RecurringTransaction, ApiError> {
        self.client
            .send(Request::recurring().update(&id, patch))
            .await
    }

    async fn delete(&self, id: String) -> Result<(), ApiError> {
        self.client.send(Request::recurring().delete(&id)).await?;
        Ok(())
    }
}

impl AnalyticsSource for HttpRemote {
    async fn summary(&self, start: NaiveDate, end: NaiveDate) -> Result<Summary, ApiError> {
        self.client
            .send(Request::analytics().summary(start, end))
            .await
    }

    async fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        period: Option<TrendPeriod>,
    ) -> Result<Vec<TrendPoint>, ApiError> {
        let mut req = Request::analytics().trends(start, end);
        if let Some(period) = period {
            req = req.period(period);
        }
        Ok(self.client.send(req).await?.into_points())
    }

    async fn top_categories(
        &self,
        limit: u32,
        kind: Option<TransactionType>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategorySpending>, ApiError> {
        let mut req = Request::analytics().top_categories(limit, start, end);
        if let Some(kind) = kind {
            req = req.kind(kind);
        }
        Ok(self.client.send(req).await?.into_spending())
    }
}

impl TaskSource for HttpRemote {
    async fn import_csv(&self, request: ImportCsv) -> Result<ImportResponse, ApiError> {
        self.client.send(request).await
    }

    async fn task_status(&self, task_id: String) -> Result<TaskStatusResponse, ApiError> {
        self.client.send(Request::tasks().status(&task_id)).await
    }
}
