//! Core types and traits for asynchronous analysis jobs.
//!
//! Wire DTOs use camelCase field names to match the console backend's JSON.

mod diff;
mod dto;
mod traits;

pub use diff::*;
pub use dto::*;
pub use traits::*;
