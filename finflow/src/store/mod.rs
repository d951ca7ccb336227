pub mod collection;
mod mutation;

use crate::entity::Entity;
use crate::error::StoreError;
use crate::remote::{AnalyticsSource, RemoteCollection};
use chrono::{Days, Local, NaiveDate};
use collection::Collection;
use finflow_api::endpoints::{
    analytics::{CategorySpending, Summary, TrendPeriod, TrendPoint},
    budgets::{Budget, BudgetUpdate, NewBudget},
    categories::{Category, CategoryUpdate, NewCategory},
    recurring::{NewRecurringTransaction, RecurringTransaction, RecurringTransactionUpdate},
    transactions::{NewTransaction, Transaction, TransactionFilters, TransactionUpdate},
    TransactionType,
};
use std::sync::{Arc, Mutex, PoisonError};

pub const DEFAULT_RANGE_DAYS: u64 = 30;
pub const DEFAULT_TOP_CATEGORIES: u32 = 5;

/// Everything the store caches. Only the store's own operations mutate it.
#[derive(Debug, Default)]
pub struct StoreState {
    transactions: Collection<Transaction>,
    categories: Collection<Category>,
    budgets: Collection<Budget>,
    recurring: Collection<RecurringTransaction>,
    summary: Option<Summary>,
    trends: Vec<TrendPoint>,
    top_categories: Vec<CategorySpending>,
    in_flight: usize,
    error: Option<String>,
}

/// Entity kinds with a collection slot in [`StoreState`].
pub trait Cached: Entity {
    fn collection(state: &StoreState) -> &Collection<Self>;
    fn collection_mut(state: &mut StoreState) -> &mut Collection<Self>;
}

macro_rules! cached {
    ($entity:ty, $slot:ident) => {
        impl Cached for $entity {
            fn collection(state: &StoreState) -> &Collection<Self> {
                &state.$slot
            }

            fn collection_mut(state: &mut StoreState) -> &mut Collection<Self> {
                &mut state.$slot
            }
        }
    };
}

cached!(Transaction, transactions);
cached!(Category, categories);
cached!(Budget, budgets);
cached!(RecurringTransaction, recurring);

/// Session-wide cache of remote entities with optimistic mutations.
///
/// Construct once and share through an `Arc`. Reads return owned snapshots;
/// the lock is never held across a remote call.
pub struct Store<R> {
    remote: Arc<R>,
    state: Mutex<StoreState>,
}

impl<R> Store<R> {
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn items<E: Cached>(&self) -> Vec<E> {
        self.with_state(|s| E::collection(s).items().to_vec())
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.items()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.items()
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.items()
    }

    pub fn recurring_transactions(&self) -> Vec<RecurringTransaction> {
        self.items()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.with_state(|s| s.summary.clone())
    }

    pub fn trends(&self) -> Vec<TrendPoint> {
        self.with_state(|s| s.trends.clone())
    }

    pub fn top_categories(&self) -> Vec<CategorySpending> {
        self.with_state(|s| s.top_categories.clone())
    }

    /// True while any operation is in flight.
    pub fn loading(&self) -> bool {
        self.with_state(|s| s.in_flight > 0)
    }

    pub fn error(&self) -> Option<String> {
        self.with_state(|s| s.error.clone())
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    pub fn set_error(&self, error: Option<String>) {
        self.with_state(|s| s.error = error);
    }
}

impl<R: RemoteCollection<Transaction>> Store<R> {
    pub async fn load_transactions(&self, filters: TransactionFilters) -> Result<(), StoreError> {
        self.run_load::<Transaction>(filters).await
    }

    pub async fn create_transaction(
        &self,
        draft: NewTransaction,
    ) -> Result<Transaction, StoreError> {
        self.run_create::<Transaction>(draft).await
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionUpdate,
    ) -> Result<Transaction, StoreError> {
        self.run_update::<Transaction>(id, patch).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), StoreError> {
        self.run_delete::<Transaction>(id).await
    }
}

impl<R: RemoteCollection<Category>> Store<R> {
    pub async fn load_categories(&self, kind: Option<TransactionType>) -> Result<(), StoreError> {
        self.run_load::<Category>(kind).await
    }

    pub async fn create_category(&self, draft: NewCategory) -> Result<Category, StoreError> {
        self.run_create::<Category>(draft).await
    }

    pub async fn update_category(
        &self,
        id: &str,
        patch: CategoryUpdate,
    ) -> Result<Category, StoreError> {
        self.run_update::<Category>(id, patch).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        self.run_delete::<Category>(id).await
    }
}

impl<R: RemoteCollection<Budget>> Store<R> {
    pub async fn load_budgets(&self) -> Result<(), StoreError> {
        self.run_load::<Budget>(()).await
    }

    pub async fn create_budget(&self, draft: NewBudget) -> Result<Budget, StoreError> {
        self.run_create::<Budget>(draft).await
    }

    pub async fn update_budget(&self, id: &str, patch: BudgetUpdate) -> Result<Budget, StoreError> {
        self.run_update::<Budget>(id, patch).await
    }

    pub async fn delete_budget(&self, id: &str) -> Result<(), StoreError> {
        self.run_delete::<Budget>(id).await
    }
}

impl<R: RemoteCollection<RecurringTransaction>> Store<R> {
    pub async fn load_recurring_transactions(&self) -> Result<(), StoreError> {
        self.run_load::<RecurringTransaction>(()).await
    }

    pub async fn create_recurring_transaction(
        &self,
        draft: NewRecurringTransaction,
    ) -> Result<RecurringTransaction, StoreError> {
        self.run_create::<RecurringTransaction>(draft).await
    }

    pub async fn update_recurring_transaction(
        &self,
        id: &str,
        patch: RecurringTransactionUpdate,
    ) -> Result<RecurringTransaction, StoreError> {
        self.run_update::<RecurringTransaction>(id, patch).await
    }

    pub async fn delete_recurring_transaction(&self, id: &str) -> Result<(), StoreError> {
        self.run_delete::<RecurringTransaction>(id).await
    }
}

impl<R: AnalyticsSource> Store<R> {
    pub async fn load_summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        let (start, end) = resolve_range(start, end, today());
        let fetch = self.remote.summary(start, end);
        self.run_fetch("summary", fetch, |s, summary| s.summary = Some(summary))
            .await
    }

    pub async fn load_trends(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        period: Option<TrendPeriod>,
    ) -> Result<(), StoreError> {
        let (start, end) = resolve_range(start, end, today());
        let fetch = self.remote.trends(start, end, period);
        self.run_fetch("trends", fetch, |s, trends| s.trends = trends)
            .await
    }

    pub async fn load_top_categories(
        &self,
        limit: Option<u32>,
        kind: Option<TransactionType>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        let (start, end) = resolve_range(start, end, today());
        let limit = limit.unwrap_or(DEFAULT_TOP_CATEGORIES);
        let fetch = self.remote.top_categories(limit, kind, start, end);
        self.run_fetch("top categories", fetch, |s, top| s.top_categories = top)
            .await
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fill missing bounds with the trailing window ending `today`.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let start = start.unwrap_or_else(|| {
        today
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS))
            .unwrap_or(today)
    });
    (start, end.unwrap_or(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_defaults_to_last_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (start, end) = resolve_range(None, None, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(end, today);
    }

    #[test]
    fn test_range_keeps_explicit_bounds() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(resolve_range(Some(start), Some(end), today), (start, end));
        assert_eq!(resolve_range(Some(start), None, today), (start, today));
    }
}
