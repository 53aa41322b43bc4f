//! Command implementations

pub mod completions;
pub mod engines;
pub mod prepare;
