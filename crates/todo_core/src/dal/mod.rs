//! To-do data access layer.
//!
//! # Responsibility
//! - Translate list/item use-cases into single atomic store calls.
//! - Map raw store documents into typed domain views.
//!
//! # Invariants
//! - The DAL never reads a document, mutates it in memory and writes it back.
//! - The DAL holds no state between calls besides the store handle.
//! - Errors are propagated unchanged; nothing is retried or swallowed.

mod mapping;
pub mod todo_dal;
