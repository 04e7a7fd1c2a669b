//! Terminal output.

pub mod reporter;
