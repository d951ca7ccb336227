use super::TransactionType;
use crate::macros::setter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{EmptyResponse, Method, Request, RequestData};

// Common

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, kind: TransactionType, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            color: color.into(),
            icon: None,
        }
    }

    setter!(opt icon: String);
}

#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CategoryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt name: String);
    setter!(opt kind: TransactionType);
    setter!(opt color: String);
    setter!(opt icon: String);
}

// Requests

#[derive(Default, Debug, Clone, Serialize)]
pub struct ListCategories {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<TransactionType>,
}

impl ListCategories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: Option<TransactionType>) -> Self {
        self.kind = kind;
        self
    }
}

impl Request for ListCategories {
    type Data = Self;
    type Response = Vec<Category>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/categories".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        if self.kind.is_some() {
            RequestData::Query(self)
        } else {
            RequestData::Empty
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategory {
    #[serde(flatten)]
    category: NewCategory,
}

impl CreateCategory {
    pub fn new(category: NewCategory) -> Self {
        Self { category }
    }
}

impl Request for CreateCategory {
    type Data = Self;
    type Response = Category;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/categories".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCategory {
    #[serde(skip)]
    category_id: String,
    #[serde(flatten)]
    category: CategoryUpdate,
}

impl UpdateCategory {
    pub fn new(category_id: impl Into<String>, category: CategoryUpdate) -> Self {
        Self {
            category_id: category_id.into(),
            category,
        }
    }
}

impl Request for UpdateCategory {
    type Data = Self;
    type Response = Category;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/categories/{}", self.category_id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteCategory {
    pub category_id: String,
}

impl DeleteCategory {
    pub fn new(category_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
        }
    }
}

impl Request for DeleteCategory {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/categories/{}", self.category_id).into()
    }
}
