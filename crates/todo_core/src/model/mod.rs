//! Domain model for to-do lists and their embedded items.
//!
//! # Responsibility
//! - Define canonical data structures returned by the data access layer.
//! - Keep identity types opaque to callers.
//!
//! # Invariants
//! - Items never exist outside their parent list.
//! - Summaries carry a derived item count, never a stored one.

pub mod todo_list;
