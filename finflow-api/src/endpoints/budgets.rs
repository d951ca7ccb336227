use crate::macros::setter;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{EmptyResponse, Method, Request, RequestData};

// Common

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budget draft. The server settles the currency from the category, so it is
/// only kept for the local placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBudget {
    pub category_id: String,
    pub amount: Decimal,
    #[serde(skip_serializing)]
    pub currency: String,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct BudgetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<BudgetPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl BudgetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt category_id: String);
    setter!(opt amount: Decimal);
    setter!(opt period: BudgetPeriod);
    setter!(opt start_date: NaiveDate);
    setter!(opt end_date: NaiveDate);
}

// Requests

#[derive(Default, Debug, Clone)]
pub struct ListBudgets;

impl Request for ListBudgets {
    type Data = ();
    type Response = Vec<Budget>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/budgets".into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateBudget {
    #[serde(flatten)]
    budget: NewBudget,
}

impl CreateBudget {
    pub fn new(budget: NewBudget) -> Self {
        Self { budget }
    }
}

impl Request for CreateBudget {
    type Data = Self;
    type Response = Budget;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/budgets".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateBudget {
    #[serde(skip)]
    budget_id: String,
    #[serde(flatten)]
    budget: BudgetUpdate,
}

impl UpdateBudget {
    pub fn new(budget_id: impl Into<String>, budget: BudgetUpdate) -> Self {
        Self {
            budget_id: budget_id.into(),
            budget,
        }
    }
}

impl Request for UpdateBudget {
    type Data = Self;
    type Response = Budget;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/budgets/{}", self.budget_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteBudget {
    pub budget_id: String,
}

impl DeleteBudget {
    pub fn new(budget_id: impl Into<String>) -> Self {
        Self {
            budget_id: budget_id.into(),
        }
    }
}

impl Request for DeleteBudget {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/budgets/{}", self.budget_id).into()
    }
}
