//! Document store contract consumed by the to-do data access layer.
//!
//! # Responsibility
//! - Describe the filter/projection/mutation vocabulary of list documents.
//! - Define the store-agnostic error type shared by store and DAL.
//!
//! # Invariants
//! - Every operation touches at most one statement on the backing store.
//! - `conditional_update` either applies fully and returns the post-image,
//!   or applies nothing and returns `None`.
//! - Raw documents use the persisted field names: `_id`, `name`, `items`
//!   (full projection) or `_id`, `name`, `item_count` (summary projection).

use crate::db::DbError;
use crate::model::todo_list::{InvalidListId, ListId, TodoValidationError};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Untyped list document as returned by the store.
pub type RawDocument = Value;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for list document persistence and mapping.
#[derive(Debug)]
pub enum RepoError {
    /// External identity is not a well-formed store identifier.
    InvalidListId(String),
    /// Name or label rejected before any store call.
    Validation(TodoValidationError),
    /// Store/backend fault, propagated unchanged.
    Db(DbError),
    /// Well-formed identity without a matching document.
    NotFound(ListId),
    /// Persisted document does not have the expected shape.
    InvalidData(String),
    /// Filter/mutation combination the store cannot express.
    UnsupportedUpdate(&'static str),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidListId(value) => write!(f, "malformed list id: `{value}`"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo list not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted list document: {message}")
            }
            Self::UnsupportedUpdate(message) => write!(f, "unsupported update: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidListId> for RepoError {
    fn from(value: InvalidListId) -> Self {
        Self::InvalidListId(value.0)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter<'a> {
    /// Every list document.
    All,
    /// The document with this identity.
    Id(ListId),
    /// The document with this identity, only if it embeds an item with
    /// `item_id`. Positional mutations target that item.
    IdWithItem { list_id: ListId, item_id: &'a str },
}

impl ListFilter<'_> {
    /// Identity targeted by the filter; `None` for [`ListFilter::All`].
    pub fn list_id(&self) -> Option<ListId> {
        match self {
            Self::Id(list_id) | Self::IdWithItem { list_id, .. } => Some(*list_id),
            Self::All => None,
        }
    }

    /// Item id matched by the filter, if any.
    pub fn matched_item(&self) -> Option<&str> {
        match self {
            Self::IdWithItem { item_id, .. } => Some(*item_id),
            Self::All | Self::Id(_) => None,
        }
    }
}

/// Shape of the documents produced by a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// `_id`, `name` and the embedded `items` array.
    Full,
    /// `_id`, `name` and `item_count`, computed by the store.
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// `name` ascending; ties broken by identity.
    NameAscending,
}

/// One atomic change to the embedded item array.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemMutation<'a> {
    /// Push one item document to the end of `items`.
    Append(RawDocument),
    /// Set `checked` on the item matched by the filter.
    SetChecked { checked: bool },
    /// Pull every item whose `id` equals `item_id`.
    Remove { item_id: &'a str },
}

/// Storage adapter for list documents.
///
/// `Session` is an opaque, caller-owned transaction handle. Implementations
/// run the call inside it when present and never commit or roll it back.
pub trait DocumentStore {
    type Session;

    /// Streams matching documents to `visit` in `sort` order.
    ///
    /// Stops at, and returns, the first error produced by `visit`.
    fn scan(
        &self,
        filter: &ListFilter<'_>,
        projection: Projection,
        sort: SortOrder,
        session: Option<&Self::Session>,
        visit: &mut dyn FnMut(RawDocument) -> RepoResult<()>,
    ) -> RepoResult<()>;

    /// Returns the first full document matching `filter`.
    fn find_one(
        &self,
        filter: &ListFilter<'_>,
        session: Option<&Self::Session>,
    ) -> RepoResult<Option<RawDocument>>;

    /// Inserts `{name, items}` and returns the store-generated identity.
    fn insert(&self, document: &RawDocument, session: Option<&Self::Session>)
        -> RepoResult<ListId>;

    /// Applies `mutation` to the single document matched by `filter` and
    /// returns the full post-update document, or `None` when nothing matched.
    fn conditional_update(
        &self,
        filter: &ListFilter<'_>,
        mutation: &ItemMutation<'_>,
        session: Option<&Self::Session>,
    ) -> RepoResult<Option<RawDocument>>;

    /// Deletes matching documents and returns how many were removed.
    fn delete(&self, filter: &ListFilter<'_>, session: Option<&Self::Session>)
        -> RepoResult<usize>;
}
