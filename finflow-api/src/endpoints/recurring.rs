use super::TransactionType;
use crate::macros::setter;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{EmptyResponse, Method, Request, RequestData};

// Common

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTransaction {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub next_occurrence: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRecurringTransaction {
    pub name: String,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Partial update of a recurring rule.
///
/// `end_date` distinguishes three intents: `None` leaves the field out of the
/// payload, `Some(None)` sends an explicit `null` to clear the end date, and
/// `Some(Some(date))` sets it.
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct RecurringTransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl RecurringTransactionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt name: String);
    setter!(opt amount: Decimal);
    setter!(opt currency: String);
    setter!(opt category_id: String);
    setter!(opt description: String);
    setter!(opt kind: TransactionType);
    setter!(opt frequency: Frequency);
    setter!(opt interval: u32);
    setter!(opt start_date: NaiveDate);
    setter!(opt is_active: bool);

    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(Some(end_date));
        self
    }

    pub fn clear_end_date(mut self) -> Self {
        self.end_date = Some(None);
        self
    }
}

// Requests

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRecurringTransactions {
    skip: u32,
    limit: u32,
}

impl Default for ListRecurringTransactions {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

impl ListRecurringTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(skip: u32);
    setter!(limit: u32);
}

impl Request for ListRecurringTransactions {
    type Data = Self;
    type Response = Vec<RecurringTransaction>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/recurring-transactions/".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRecurringTransaction {
    #[serde(flatten)]
    recurring: NewRecurringTransaction,
}

impl CreateRecurringTransaction {
    pub fn new(recurring: NewRecurringTransaction) -> Self {
        Self { recurring }
    }
}

impl Request for CreateRecurringTransaction {
    type Data = Self;
    type Response = RecurringTransaction;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/recurring-transactions/".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecurringTransaction {
    #[serde(skip)]
    recurring_id: String,
    #[serde(flatten)]
    recurring: RecurringTransactionUpdate,
}

impl UpdateRecurringTransaction {
    pub fn new(recurring_id: impl Into<String>, recurring: RecurringTransactionUpdate) -> Self {
        Self {
            recurring_id: recurring_id.into(),
            recurring,
        }
    }
}

impl Request for UpdateRecurringTransaction {
    type Data = Self;
    type Response = RecurringTransaction;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/recurring-transactions/{}", self.recurring_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteRecurringTransaction {
    pub recurring_id: String,
}

impl DeleteRecurringTransaction {
    pub fn new(recurring_id: impl Into<String>) -> Self {
        Self {
            recurring_id: recurring_id.into(),
        }
    }
}

impl Request for DeleteRecurringTransaction {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/recurring-transactions/{}", self.recurring_id).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_end_date_absent_null_or_set() {
        let untouched = RecurringTransactionUpdate::new().interval(2u32);
        assert_eq!(serde_json::to_value(&untouched).unwrap(), json!({ "interval": 2 }));

        let cleared = RecurringTransactionUpdate::new().clear_end_date();
        assert_eq!(serde_json::to_value(&cleared).unwrap(), json!({ "end_date": null }));

        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let set = RecurringTransactionUpdate::new().end_date(date);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({ "end_date": "2025-12-31" })
        );
    }

    #[test]
    fn test_list_defaults_to_first_hundred() {
        let req = ListRecurringTransactions::new();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "skip": 0, "limit": 100 })
        );
    }
}
