//! Category Selector
//!
//! The chart page offers three ways to pick a category: a native select,
//! a row of pills, and a bottom-sheet list on mobile. All three are views
//! of one active index held here, so they can never disagree.

mod touch;

pub use touch::{ScrollGuard, ScrollGuardConfig};

use serde::{Deserialize, Serialize};

use crate::catalog::CategoryCatalog;

/// One selectable category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    /// 0-based selection index
    pub index: usize,
    /// 1-based API number
    pub number: u32,
    pub label: String,
}

/// The three selection affordances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    Select,
    Pill,
    Sheet,
}

impl Affordance {
    pub const ALL: [Affordance; 3] = [Affordance::Select, Affordance::Pill, Affordance::Sheet];

    /// Attribute that marks the active item for this affordance
    pub fn state_attribute(self) -> &'static str {
        match self {
            Affordance::Select => "selected",
            Affordance::Pill => "aria-pressed",
            Affordance::Sheet => "aria-current",
        }
    }
}

/// One item of one affordance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorItem {
    pub index: usize,
    pub label: String,
    pub active: bool,
    /// Name and value of the state attribute, e.g. `("aria-pressed", "true")`
    pub state: (String, String),
}

/// Items of one affordance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorView {
    pub affordance: Affordance,
    pub items: Vec<SelectorItem>,
}

/// Single source of truth for the active category
#[derive(Debug, Clone)]
pub struct CategorySelector {
    options: Vec<CategoryOption>,
    active: usize,
}

impl CategorySelector {
    pub fn new(catalog: &CategoryCatalog) -> Self {
        Self {
            options: build_options(catalog),
            active: 0,
        }
    }

    pub fn options(&self) -> &[CategoryOption] {
        &self.options
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Move the selection; returns false for an unknown index
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn view(&self, affordance: Affordance) -> SelectorView {
        let items = self
            .options
            .iter()
            .map(|option| {
                let active = option.index == self.active;
                SelectorItem {
                    index: option.index,
                    label: option.label.clone(),
                    active,
                    state: (
                        affordance.state_attribute().to_string(),
                        active.to_string(),
                    ),
                }
            })
            .collect();

        SelectorView { affordance, items }
    }

    /// All three affordances, rendered from the same active index
    pub fn views(&self) -> Vec<SelectorView> {
        Affordance::ALL.iter().map(|&a| self.view(a)).collect()
    }
}

/// Option descriptors for every category in catalog order
pub fn build_options(catalog: &CategoryCatalog) -> Vec<CategoryOption> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, category)| CategoryOption {
            index,
            number: category.number,
            label: category.title.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::new(vec![
            Category::new(1, "Best Song", ["A"]),
            Category::new(2, "Best Film", ["B"]),
            Category::new(5, "Best Actor", ["C"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_options() {
        let options = build_options(&catalog());
        assert_eq!(options.len(), 3);
        assert_eq!(options[2].index, 2);
        assert_eq!(options[2].number, 5);
        assert_eq!(options[2].label, "Best Actor");
    }

    #[test]
    fn test_all_affordances_agree() {
        let mut selector = CategorySelector::new(&catalog());
        assert!(selector.set_active(1));

        for view in selector.views() {
            let active: Vec<_> = view.items.iter().filter(|i| i.active).collect();
            assert_eq!(active.len(), 1, "{:?}", view.affordance);
            assert_eq!(active[0].index, 1);
        }
    }

    #[test]
    fn test_state_attributes() {
        let selector = CategorySelector::new(&catalog());

        let pills = selector.view(Affordance::Pill);
        assert_eq!(
            pills.items[0].state,
            ("aria-pressed".to_string(), "true".to_string())
        );
        assert_eq!(pills.items[1].state.1, "false");

        let sheet = selector.view(Affordance::Sheet);
        assert_eq!(sheet.items[0].state.0, "aria-current");
    }

    #[test]
    fn test_unknown_index_rejected() {
        let mut selector = CategorySelector::new(&catalog());
        assert!(!selector.set_active(3));
        assert_eq!(selector.active(), 0);
    }
}
