//! Validation rules for parsed commands

pub mod validation;

pub use validation::{validate, ValidationOutcome};
