//! Shared types, errors and plumbing

pub mod errors;
pub mod gate;
pub mod traits;
pub mod types;
