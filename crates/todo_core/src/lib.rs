//! Core data access for to-do lists.
//! Lists are stored one document per list; every mutation is a single
//! atomic conditional update.

pub mod config;
pub mod dal;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, TodoConfig};
pub use dal::todo_dal::ToDoDal;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo_list::{
    InvalidListId, ItemId, ListId, ListIdInput, ListSummary, ToDoItem, ToDoList,
    TodoValidationError,
};
pub use repo::document_store::{
    DocumentStore, ItemMutation, ListFilter, Projection, RawDocument, RepoError, RepoResult,
    SortOrder,
};
pub use repo::sqlite_store::{SqliteDocumentStore, StoreSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
