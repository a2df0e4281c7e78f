//! Catalog Types
//!
//! Categories and nominees as published for the event. A category's
//! nominees keep their declared order for the whole session: the
//! 1-based position of a nominee is its `nominee_id` on the results API.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::CatalogError;

/// A named award with an ordered list of nominees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// 1-based category number used by the results API
    pub number: u32,
    /// Display title
    pub title: String,
    /// Nominee names in declared order
    #[serde(default)]
    pub nominees: Vec<String>,
}

impl Category {
    /// Create a new category
    pub fn new<I, S>(number: u32, title: impl Into<String>, nominees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            number,
            title: title.into(),
            nominees: nominees.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of nominees
    pub fn nominee_count(&self) -> usize {
        self.nominees.len()
    }

    /// Look up a nominee by its 1-based id
    pub fn nominee(&self, nominee_id: u32) -> Option<&str> {
        let position = (nominee_id as usize).checked_sub(1)?;
        self.nominees.get(position).map(String::as_str)
    }
}

/// Ordered list of categories for the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

/// Accepted catalog file layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Category>),
    Wrapped { categories: Vec<Category> },
}

impl CategoryCatalog {
    /// Build a catalog, rejecting zero or duplicate category numbers
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for category in &categories {
            if category.number == 0 {
                return Err(CatalogError::InvalidCategory {
                    number: category.number,
                    reason: "category numbers start at 1".to_string(),
                });
            }
            if !seen.insert(category.number) {
                return Err(CatalogError::DuplicateNumber(category.number));
            }
        }

        Ok(Self { categories })
    }

    /// Parse a catalog from JSON.
    ///
    /// Accepts either a bare array of categories or an object with a
    /// `categories` array.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let categories = match document {
            CatalogDocument::List(list) => list,
            CatalogDocument::Wrapped { categories } => categories,
        };

        Self::new(categories)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category at a 0-based selection index
    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Selection index of the category with the given API number
    pub fn index_of_number(&self, number: u32) -> Option<usize> {
        self.categories.iter().position(|c| c.number == number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
