//! UI Components
//!
//! The chart mount, the three selector affordances and toasts.

pub mod chart;
pub mod selector;
pub mod toast;

pub use chart::ChartMount;
pub use selector::{BottomSheet, CategorySelect, PillRow};
pub use toast::Toast;
