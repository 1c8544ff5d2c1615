//! Prompt text for the comparative narrative
//!
//! - `system`: the fixed analyst instruction
//! - `user`: the stock-data message rendered from every fetched table

mod system;
mod user;

pub use system::*;
pub use user::*;
