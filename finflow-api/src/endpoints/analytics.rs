use super::TransactionType;
use crate::macros::setter;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySummary {
    pub currency: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    #[serde(default)]
    pub display_currency: Option<String>,
    #[serde(default)]
    pub transaction_count: Option<u64>,
    #[serde(default)]
    pub by_currency: Vec<CurrencySummary>,
    #[serde(default)]
    pub currency_rates: HashMap<String, Decimal>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPeriod {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category_id: String,
    pub category_name: String,
    pub total_amount: Decimal,
    pub transaction_count: u64,
    pub percentage: Decimal,
}

// Requests

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetSummary {
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl GetSummary {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            currency: None,
        }
    }

    setter!(opt currency: String);
}

impl Request for GetSummary {
    type Data = Self;
    type Response = Summary;

    fn endpoint(&self) -> Cow<'_, str> {
        "/analytics/summary".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetTrends {
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<TrendPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl GetTrends {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            period: None,
            currency: None,
        }
    }

    setter!(opt period: TrendPeriod);
    setter!(opt currency: String);
}

impl Request for GetTrends {
    type Data = Self;
    type Response = TrendsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/analytics/trends".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetTopCategories {
    limit: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<TransactionType>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl GetTopCategories {
    pub fn new(limit: u32, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            limit,
            kind: None,
            start_date,
            end_date,
        }
    }

    setter!(opt kind: TransactionType);
}

impl Request for GetTopCategories {
    type Data = Self;
    type Response = TopCategoriesResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/analytics/top-categories".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsResponse {
    pub trends: Vec<RawTrend>,
}

/// Trend row as the server sends it: amounts are decimal strings keyed by month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrend {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl TrendsResponse {
    pub fn into_points(self) -> Vec<TrendPoint> {
        self.trends
            .into_iter()
            .map(|t| TrendPoint {
                date: t.month,
                income: t.income,
                expense: t.expense,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCategoriesResponse {
    #[serde(default)]
    pub top_categories: Vec<RawCategoryTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

impl TopCategoriesResponse {
    /// Convert server totals into spending shares. The server only reports
    /// names, so ids are positional (`cat-<index>`).
    pub fn into_spending(self) -> Vec<CategorySpending> {
        let total: Decimal = self.top_categories.iter().map(|c| c.amount).sum();
        self.top_categories
            .into_iter()
            .enumerate()
            .map(|(index, c)| {
                let percentage = if total > Decimal::ZERO {
                    c.amount / total * Decimal::ONE_HUNDRED
                } else {
                    Decimal::ZERO
                };
                CategorySpending {
                    category_id: format!("cat-{index}"),
                    category_name: c.category,
                    total_amount: c.amount,
                    transaction_count: 0,
                    percentage,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trends_parse_string_amounts() {
        let raw = json!({
            "trends": [
                { "month": "2024-01", "income": "1000.50", "expense": "400", "balance": "600.50" },
                { "month": "2024-02", "income": "0", "expense": "25.25", "balance": "-25.25" },
            ]
        });
        let points = serde_json::from_value::<TrendsResponse>(raw)
            .unwrap()
            .into_points();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2024-01");
        assert_eq!(points[0].income, Decimal::new(100050, 2));
        assert_eq!(points[1].expense, Decimal::new(2525, 2));
    }

    #[test]
    fn test_top_categories_percentages() {
        let raw = json!({
            "top_categories": [
                { "category": "Rent", "amount": "750" },
                { "category": "Food", "amount": "250" },
            ]
        });
        let spending = serde_json::from_value::<TopCategoriesResponse>(raw)
            .unwrap()
            .into_spending();

        assert_eq!(spending[0].category_id, "cat-0");
        assert_eq!(spending[0].category_name, "Rent");
        assert_eq!(spending[0].percentage, Decimal::from(75));
        assert_eq!(spending[1].percentage, Decimal::from(25));
    }

    #[test]
    fn test_top_categories_empty_total() {
        let response = TopCategoriesResponse {
            top_categories: vec![RawCategoryTotal {
                category: "Misc".to_string(),
                amount: Decimal::ZERO,
            }],
        };
        assert_eq!(response.into_spending()[0].percentage, Decimal::ZERO);
    }
}
