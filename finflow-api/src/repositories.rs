use crate::endpoints::{
    analytics::{GetSummary, GetTopCategories, GetTrends},
    budgets::{BudgetUpdate, CreateBudget, DeleteBudget, ListBudgets, NewBudget, UpdateBudget},
    categories::{
        CategoryUpdate, CreateCategory, DeleteCategory, ListCategories, NewCategory,
        UpdateCategory,
    },
    csv::{ColumnMapping, ImportCsv},
    recurring::{
        CreateRecurringTransaction, DeleteRecurringTransaction, ListRecurringTransactions,
        NewRecurringTransaction, RecurringTransactionUpdate, UpdateRecurringTransaction,
    },
    tasks::GetTaskStatus,
    transactions::{
        CreateTransaction, DeleteTransaction, ListTransactions, NewTransaction,
        TransactionFilters, TransactionUpdate, UpdateTransaction,
    },
    TransactionType,
};
use chrono::NaiveDate;

pub struct TransactionRepository;

impl TransactionRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self, filters: TransactionFilters) -> ListTransactions {
        ListTransactions::new(filters)
    }

    pub fn create(&self, transaction: NewTransaction) -> CreateTransaction {
        CreateTransaction::new(transaction)
    }

    pub fn update(&self, transaction_id: &str, update: TransactionUpdate) -> UpdateTransaction {
        UpdateTransaction::new(transaction_id, update)
    }

    pub fn delete(&self, transaction_id: &str) -> DeleteTransaction {
        DeleteTransaction::new(transaction_id)
    }
}

pub struct CategoryRepository;

impl CategoryRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self, kind: Option<TransactionType>) -> ListCategories {
        ListCategories::new().kind(kind)
    }

    pub fn create(&self, category: NewCategory) -> CreateCategory {
        CreateCategory::new(category)
    }

    pub fn update(&self, category_id: &str, update: CategoryUpdate) -> UpdateCategory {
        UpdateCategory::new(category_id, update)
    }

    pub fn delete(&self, category_id: &str) -> DeleteCategory {
        DeleteCategory::new(category_id)
    }
}

pub struct BudgetRepository;

impl BudgetRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListBudgets {
        ListBudgets
    }

    pub fn create(&self, budget: NewBudget) -> CreateBudget {
        CreateBudget::new(budget)
    }

    pub fn update(&self, budget_id: &str, update: BudgetUpdate) -> UpdateBudget {
        UpdateBudget::new(budget_id, update)
    }

    pub fn delete(&self, budget_id: &str) -> DeleteBudget {
        DeleteBudget::new(budget_id)
    }
}

pub struct RecurringRepository;

impl RecurringRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListRecurringTransactions {
        ListRecurringTransactions::new()
    }

    pub fn create(&self, recurring: NewRecurringTransaction) -> CreateRecurringTransaction {
        CreateRecurringTransaction::new(recurring)
    }

    pub fn update(
        &self,
        recurring_id: &str,
        update: RecurringTransactionUpdate,
    ) -> UpdateRecurringTransaction {
        UpdateRecurringTransaction::new(recurring_id, update)
    }

    pub fn delete(&self, recurring_id: &str) -> DeleteRecurringTransaction {
        DeleteRecurringTransaction::new(recurring_id)
    }
}

pub struct AnalyticsRepository;

impl AnalyticsRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn summary(&self, start_date: NaiveDate, end_date: NaiveDate) -> GetSummary {
        GetSummary::new(start_date, end_date)
    }

    pub fn trends(&self, start_date: NaiveDate, end_date: NaiveDate) -> GetTrends {
        GetTrends::new(start_date, end_date)
    }

    pub fn top_categories(
        &self,
        limit: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> GetTopCategories {
        GetTopCategories::new(limit, start_date, end_date)
    }
}

pub struct CsvRepository;

impl CsvRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn import(&self, file_content: impl Into<String>, mapping: ColumnMapping) -> ImportCsv {
        ImportCsv::new(file_content, mapping)
    }
}

pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn status(&self, task_id: &str) -> GetTaskStatus {
        GetTaskStatus::new(task_id)
    }
}
