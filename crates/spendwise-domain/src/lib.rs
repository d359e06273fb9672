//! spendwise-domain
//!
//! Pure domain models for recurring expenses and the records they produce.
//! No I/O, no storage, no scheduling logic. Only data types and core enums.

pub mod common;
pub mod expense;
pub mod pattern;

pub use common::*;
pub use expense::*;
pub use pattern::*;
