//! In-memory remote for driving the store and poller without a server.

use crate::entity::Entity;
use crate::remote::{AnalyticsSource, RemoteCollection, TaskSource};
use chrono::NaiveDate;
use finflow_api::endpoints::{
    analytics::{CategorySpending, Summary, TrendPeriod, TrendPoint},
    budgets::Budget,
    categories::Category,
    csv::{ImportCsv, ImportResponse},
    recurring::RecurringTransaction,
    tasks::TaskStatusResponse,
    transactions::Transaction,
    TransactionType,
};
use finflow_api::ApiError;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

enum Reply<T> {
    Ready(Result<T, ApiError>),
    /// Settled later by the test through the paired sender.
    Deferred(oneshot::Receiver<Result<T, ApiError>>),
}

/// Queue of canned replies for one remote call, plus a log of the requests
/// it received. An exhausted script answers with a 500.
pub struct Script<Req, T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    requests: Mutex<Vec<Req>>,
}

impl<Req, T> Default for Script<Req, T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl<Req, T> Script<Req, T> {
    pub fn reply(&self, result: Result<T, ApiError>) -> &Self {
        self.lock_replies().push_back(Reply::Ready(result));
        self
    }

    pub fn ok(&self, value: T) -> &Self {
        self.reply(Ok(value))
    }

    pub fn err(&self, err: ApiError) -> &Self {
        self.reply(Err(err))
    }

    /// Queue a reply that stays pending until the returned sender is used.
    pub fn defer(&self) -> oneshot::Sender<Result<T, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.lock_replies().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn requests(&self) -> Vec<Req>
    where
        Req: Clone,
    {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply<T>>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn next(&self, request: Req) -> Result<T, ApiError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let reply = self.lock_replies().pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::transport("deferred reply dropped"))),
            None => Err(ApiError::status(500, "no scripted reply")),
        }
    }
}

/// Scripts for the four calls of one collection.
pub struct CollectionScript<E: Entity> {
    pub list: Script<E::Filter, Vec<E>>,
    pub create: Script<E::Draft, E>,
    pub update: Script<(String, E::Patch), E>,
    pub delete: Script<String, ()>,
}

impl<E: Entity> Default for CollectionScript<E> {
    fn default() -> Self {
        Self {
            list: Script::default(),
            create: Script::default(),
            update: Script::default(),
            delete: Script::default(),
        }
    }
}

#[derive(Default)]
pub struct ScriptedRemote {
    pub transactions: CollectionScript<Transaction>,
    pub categories: CollectionScript<Category>,
    pub budgets: CollectionScript<Budget>,
    pub recurring: CollectionScript<RecurringTransaction>,
    pub summary: Script<(NaiveDate, NaiveDate), Summary>,
    pub trends: Script<(NaiveDate, NaiveDate, Option<TrendPeriod>), Vec<TrendPoint>>,
    pub top_categories:
        Script<(u32, Option<TransactionType>, NaiveDate, NaiveDate), Vec<CategorySpending>>,
    pub imports: Script<ImportCsv, ImportResponse>,
    pub task_status: Script<String, TaskStatusResponse>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }
}

macro_rules! scripted_collection {
    ($entity:ty, $field:ident) => {
        impl RemoteCollection<$entity> for ScriptedRemote {
            async fn list(
                &self,
                filter: <$entity as Entity>::Filter,
            ) -> Result<Vec<$entity>, ApiError> {
                self.$field.list.next(filter).await
            }

            async fn create(&self, draft: <$entity as Entity>::Draft) -> Result<$entity, ApiError> {
                self.$field.create.next(draft).await
            }

            async fn update(
                &self,
                id: String,
                patch: <$entity as Entity>::Patch,
            ) -> Result<$entity, ApiError> {
                self.$field.update.next((id, patch)).await
            }

            async fn delete(&self, id: String) -> Result<(), ApiError> {
                self.$field.delete.next(id).await
            }
        }
    };
}

scripted_collection!(Transaction, transactions);
scripted_collection!(Category, categories);
scripted_collection!(Budget, budgets);
scripted_collection!(RecurringTransaction, recurring);

impl AnalyticsSource for ScriptedRemote {
    async fn summary(&self, start: NaiveDate, end: NaiveDate) -> Result<Summary, ApiError> {
        self.summary.next((start, end)).await
    }

    async fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        period: Option<TrendPeriod>,
    ) -> Result<Vec<TrendPoint>, ApiError> {
        self.trends.next((start, end, period)).await
    }

    async fn top_categories(
        &self,
        limit: u32,
        kind: Option<TransactionType>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategorySpending>, ApiError> {
        self.top_categories.next((limit, kind, start, end)).await
    }
}

impl TaskSource for ScriptedRemote {
    async fn import_csv(&self, request: ImportCsv) -> Result<ImportResponse, ApiError> {
        self.imports.next(request).await
    }

    async fn task_status(&self, task_id: String) -> Result<TaskStatusResponse, ApiError> {
        self.task_status.next(task_id).await
    }
}

/// Ready-made entities and responses for tests.
pub mod fixtures {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use finflow_api::endpoints::{
        analytics::Summary,
        budgets::{Budget, BudgetPeriod},
        categories::Category,
        csv::{ColumnMapping, ImportResponse, ImportStatus},
        tasks::{TaskStatus, TaskStatusResponse},
        transactions::{NewTransaction, Transaction},
        TransactionType,
    };
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    pub fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    pub fn transaction(id: &str, amount: i64) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind: TransactionType::Expense,
            amount: Decimal::from(amount),
            currency: "USD".to_string(),
            category_id: "cat-1".to_string(),
            description: None,
            transaction_date: date(2024, 1, 15),
            is_recurring: false,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    pub fn new_transaction(amount: i64) -> NewTransaction {
        NewTransaction::new(
            TransactionType::Expense,
            Decimal::from(amount),
            "USD",
            "cat-1",
            date(2024, 1, 15),
        )
    }

    pub fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            kind: TransactionType::Expense,
            color: "#ef4444".to_string(),
            icon: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    pub fn budget(id: &str, amount: i64) -> Budget {
        Budget {
            id: id.to_string(),
            category_id: "cat-1".to_string(),
            amount: Decimal::from(amount),
            currency: "USD".to_string(),
            period: BudgetPeriod::Monthly,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    pub fn summary(income: i64, expense: i64) -> Summary {
        Summary {
            total_income: Decimal::from(income),
            total_expense: Decimal::from(expense),
            balance: Decimal::from(income - expense),
            display_currency: Some("USD".to_string()),
            transaction_count: None,
            by_currency: Vec::new(),
            currency_rates: HashMap::new(),
        }
    }

    pub fn mapping() -> ColumnMapping {
        ColumnMapping {
            amount: "Amount".to_string(),
            currency: None,
            category_name: "Category".to_string(),
            description: Some("Description".to_string()),
            transaction_date: "Date".to_string(),
            kind: "Type".to_string(),
        }
    }

    pub fn import_pending(task_id: &str) -> ImportResponse {
        ImportResponse {
            status: ImportStatus::Pending,
            task_id: Some(task_id.to_string()),
            created_count: None,
            error_count: None,
            errors: None,
        }
    }

    pub fn task(task_id: &str, status: TaskStatus) -> TaskStatusResponse {
        TaskStatusResponse {
            task_id: task_id.to_string(),
            task_type: Some("csv_import".to_string()),
            status,
            result: None,
            error: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn task_completed(task_id: &str, result: serde_json::Value) -> TaskStatusResponse {
        TaskStatusResponse {
            result: Some(result),
            ..task(task_id, TaskStatus::Completed)
        }
    }
}
