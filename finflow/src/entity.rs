use chrono::{DateTime, Utc};
use finflow_api::endpoints::{
    budgets::{Budget, BudgetUpdate, NewBudget},
    categories::{Category, CategoryUpdate, NewCategory},
    recurring::{NewRecurringTransaction, RecurringTransaction, RecurringTransactionUpdate},
    transactions::{NewTransaction, Transaction, TransactionFilters, TransactionUpdate},
    TransactionType,
};
use uuid::Uuid;

/// Prefix reserved for ids the client invents before the server confirms a create.
pub const TEMP_ID_PREFIX: &str = "temp-";

pub fn is_tentative(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

pub fn temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

/// A record cached by the store. Identity is the only lookup key.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Client-chosen fields sent on create.
    type Draft: Clone + Send + Sync + 'static;
    /// Partial update; `None` fields are left alone.
    type Patch: Clone + Send + Sync + 'static;
    /// Query passed to `list`.
    type Filter: Clone + Default + Send + Sync + 'static;

    const NOUN: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> &str;

    /// Placeholder rendered while the create call is in flight.
    fn tentative(id: String, draft: &Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, patch: &Self::Patch);
}

impl Entity for Transaction {
    type Draft = NewTransaction;
    type Patch = TransactionUpdate;
    type Filter = TransactionFilters;

    const NOUN: &'static str = "transaction";
    const PLURAL: &'static str = "transactions";

    fn id(&self) -> &str {
        &self.id
    }

    fn tentative(id: String, draft: &NewTransaction, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: draft.kind,
            amount: draft.amount,
            currency: draft.currency.clone(),
            category_id: draft.category_id.clone(),
            description: Some(draft.description.clone()).filter(|d| !d.is_empty()),
            transaction_date: draft.transaction_date,
            is_recurring: draft.is_recurring,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &TransactionUpdate) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(ref currency) = patch.currency {
            self.currency = currency.clone();
        }
        if let Some(ref category_id) = patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = Some(description.clone());
        }
        if let Some(date) = patch.transaction_date {
            self.transaction_date = date;
        }
    }
}

impl Entity for Category {
    type Draft = NewCategory;
    type Patch = CategoryUpdate;
    type Filter = Option<TransactionType>;

    const NOUN: &'static str = "category";
    const PLURAL: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }

    fn tentative(id: String, draft: &NewCategory, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            kind: draft.kind,
            color: draft.color.clone(),
            icon: draft.icon.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &CategoryUpdate) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(ref color) = patch.color {
            self.color = color.clone();
        }
        if let Some(ref icon) = patch.icon {
            self.icon = Some(icon.clone());
        }
    }
}

impl Entity for Budget {
    type Draft = NewBudget;
    type Patch = BudgetUpdate;
    type Filter = ();

    const NOUN: &'static str = "budget";
    const PLURAL: &'static str = "budgets";

    fn id(&self) -> &str {
        &self.id
    }

    fn tentative(id: String, draft: &NewBudget, now: DateTime<Utc>) -> Self {
        Self {
            id,
            category_id: draft.category_id.clone(),
            amount: draft.amount,
            currency: draft.currency.clone(),
            period: draft.period,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &BudgetUpdate) {
        if let Some(ref category_id) = patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(period) = patch.period {
            self.period = period;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
    }
}

impl Entity for RecurringTransaction {
    type Draft = NewRecurringTransaction;
    type Patch = RecurringTransactionUpdate;
    type Filter = ();

    const NOUN: &'static str = "recurring transaction";
    const PLURAL: &'static str = "recurring transactions";

    fn id(&self) -> &str {
        &self.id
    }

    fn tentative(id: String, draft: &NewRecurringTransaction, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            amount: draft.amount,
            currency: draft.currency.clone(),
            category_id: draft.category_id.clone(),
            description: draft.description.clone(),
            kind: draft.kind,
            frequency: draft.frequency,
            interval: draft.interval,
            start_date: draft.start_date,
            end_date: draft.end_date,
            next_occurrence: draft.start_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &RecurringTransactionUpdate) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(ref currency) = patch.currency {
            self.currency = currency.clone();
        }
        if let Some(ref category_id) = patch.category_id {
            self.category_id = category_id.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = Some(description.clone());
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(frequency) = patch.frequency {
            self.frequency = frequency;
        }
        if let Some(interval) = patch.interval {
            self.interval = interval;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        // Outer None: untouched. Inner None: cleared.
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finflow_api::endpoints::recurring::Frequency;
    use rust_decimal::Decimal;

    #[test]
    fn test_temp_ids_are_marked_and_distinct() {
        let a = temp_id();
        let b = temp_id();
        assert!(is_tentative(&a));
        assert!(is_tentative(&b));
        assert_ne!(a, b);
        assert!(!is_tentative("txn-1"));
    }

    #[test]
    fn test_tentative_transaction_copies_draft() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let draft = NewTransaction::new(
            TransactionType::Expense,
            Decimal::from(50),
            "USD",
            "cat-1",
            date,
        );
        let now = Utc::now();
        let tentative = Transaction::tentative(temp_id(), &draft, now);

        assert!(is_tentative(tentative.id()));
        assert_eq!(tentative.amount, Decimal::from(50));
        assert_eq!(tentative.currency, "USD");
        assert_eq!(tentative.description, None);
        assert_eq!(tentative.created_at, now);
    }

    #[test]
    fn test_recurring_patch_clears_end_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let draft = NewRecurringTransaction {
            name: "Rent".to_string(),
            amount: Decimal::from(900),
            currency: "EUR".to_string(),
            category_id: "cat-rent".to_string(),
            description: None,
            kind: TransactionType::Expense,
            frequency: Frequency::Monthly,
            interval: 1,
            start_date: start,
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
        };
        let mut rule = RecurringTransaction::tentative("r-1".to_string(), &draft, Utc::now());

        rule.apply(&RecurringTransactionUpdate::new().interval(2u32));
        assert_eq!(rule.interval, 2);
        assert!(rule.end_date.is_some());

        rule.apply(&RecurringTransactionUpdate::new().clear_end_date());
        assert_eq!(rule.end_date, None);
    }
}
