//! API Routes
//!
//! Route handlers organized by functionality.

pub mod categories;
pub mod chart;
pub mod health;
pub mod signals;
