//! Storage adapter layer for list documents.
//!
//! # Responsibility
//! - Define the document store contract the DAL is written against.
//! - Isolate SQLite/JSON query details from the DAL.
//!
//! # Invariants
//! - Every mutation is one atomic statement returning its post-image.
//! - Store APIs distinguish "no match" (`None`/`0`) from faults (`Err`).

pub mod document_store;
pub mod sqlite_store;
