use super::{DataEnvelope, Page, TransactionType};
use crate::macros::setter;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{EmptyResponse, Method, Request, RequestData};

// Common

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "date")]
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a transaction that the client chooses; the server assigns the rest.
///
/// `currency` and `is_recurring` are kept locally so a placeholder can be
/// rendered before the server answers, but they are not part of the create
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(skip_serializing)]
    pub currency: String,
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "date")]
    pub transaction_date: NaiveDate,
    #[serde(skip_serializing, default)]
    pub is_recurring: bool,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        currency: impl Into<String>,
        category_id: impl Into<String>,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            amount,
            currency: currency.into(),
            category_id: category_id.into(),
            description: String::new(),
            transaction_date,
            is_recurring: false,
        }
    }

    setter!(description: String);
    setter!(is_recurring: bool);
}

/// Partial update. Absent fields are left untouched by the server.
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct TransactionUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing)]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "date", skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,
}

impl TransactionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt kind: TransactionType);
    setter!(opt amount: Decimal);
    setter!(opt currency: String);
    setter!(opt category_id: String);
    setter!(opt description: String);
    setter!(opt transaction_date: NaiveDate);
}

#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct TransactionFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilters {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt page: u32);
    setter!(opt page_size: u32);
    setter!(opt kind: TransactionType);
    setter!(opt category_id: String);
    setter!(opt start_date: NaiveDate);
    setter!(opt end_date: NaiveDate);
}

// Requests

#[derive(Default, Debug, Clone)]
pub struct ListTransactions {
    filters: TransactionFilters,
}

impl ListTransactions {
    pub fn new(filters: TransactionFilters) -> Self {
        Self { filters }
    }
}

impl Request for ListTransactions {
    type Data = TransactionFilters;
    type Response = Page<Transaction>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/transactions".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(&self.filters)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTransaction {
    #[serde(flatten)]
    transaction: NewTransaction,
}

impl CreateTransaction {
    pub fn new(transaction: NewTransaction) -> Self {
        Self { transaction }
    }
}

impl Request for CreateTransaction {
    type Data = Self;
    type Response = DataEnvelope<Transaction>;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/transactions".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateTransaction {
    #[serde(skip)]
    transaction_id: String,
    #[serde(flatten)]
    transaction: TransactionUpdate,
}

impl UpdateTransaction {
    pub fn new(transaction_id: impl Into<String>, transaction: TransactionUpdate) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            transaction,
        }
    }
}

impl Request for UpdateTransaction {
    type Data = Self;
    type Response = DataEnvelope<Transaction>;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/transactions/{}", self.transaction_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteTransaction {
    pub transaction_id: String,
}

impl DeleteTransaction {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
        }
    }
}

impl Request for DeleteTransaction {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/transactions/{}", self.transaction_id).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_create_payload_uses_date_and_omits_local_fields() {
        let draft = NewTransaction::new(
            TransactionType::Expense,
            Decimal::new(5000, 2),
            "USD",
            "cat-1",
            date("2024-03-01"),
        )
        .description("Groceries");

        let payload = serde_json::to_value(CreateTransaction::new(draft)).unwrap();
        assert_eq!(
            payload,
            json!({
                "type": "expense",
                "amount": "50.00",
                "category_id": "cat-1",
                "description": "Groceries",
                "date": "2024-03-01",
            })
        );
    }

    #[test]
    fn test_update_payload_only_contains_changed_fields() {
        let update = TransactionUpdate::new()
            .amount(Decimal::new(125, 1))
            .currency("EUR")
            .transaction_date(date("2024-04-02"));

        let payload = serde_json::to_value(UpdateTransaction::new("txn-1", update)).unwrap();
        assert_eq!(payload, json!({ "amount": "12.5", "date": "2024-04-02" }));
    }

    #[test]
    fn test_transaction_accepts_numeric_amount_and_date_alias() {
        let raw = json!({
            "id": "txn-1",
            "type": "income",
            "amount": 1200.5,
            "currency": "USD",
            "category_id": "cat-9",
            "date": "2024-01-31",
            "created_at": "2024-01-31T10:00:00Z",
            "updated_at": "2024-01-31T10:00:00Z",
        });

        let transaction: Transaction = serde_json::from_value(raw).unwrap();
        assert_eq!(transaction.amount, Decimal::new(12005, 1));
        assert_eq!(transaction.transaction_date, date("2024-01-31"));
        assert_eq!(transaction.description, None);
        assert!(!transaction.is_recurring);
    }

    #[test]
    fn test_list_endpoint_and_filters() {
        let req = ListTransactions::new(
            TransactionFilters::new()
                .page(2u32)
                .kind(TransactionType::Expense)
                .start_date(date("2024-01-01")),
        );
        assert_eq!(req.endpoint(), "/transactions");
        assert_eq!(
            serde_json::to_value(&req.filters).unwrap(),
            json!({ "page": 2, "type": "expense", "start_date": "2024-01-01" })
        );
    }
}
