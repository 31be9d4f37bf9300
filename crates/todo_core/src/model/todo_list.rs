//! To-do list domain model.
//!
//! # Responsibility
//! - Define the typed views returned by the data access layer.
//! - Own identity types and input validation for lists and items.
//!
//! # Invariants
//! - `ListId` is assigned by the store and stays stable for the list lifetime.
//! - `ItemId` is generated locally and never reused for another item.
//! - `checked` is the only field of an item that changes after creation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque store identifier of one list document.
///
/// Serialized as a lowercase hyphenated UUID, the only form accepted back;
/// callers should treat the text as an opaque token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListId(Uuid);

impl ListId {
    /// Generates a fresh identifier. Only store adapters should call this.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses external input into a list identifier.
    ///
    /// Input is not trimmed or case-folded: it must be exactly the text the
    /// store writes.
    ///
    /// # Errors
    /// - Returns `InvalidListId` when `value` is not a well-formed identifier.
    pub fn parse(value: &str) -> Result<Self, InvalidListId> {
        Uuid::try_parse(value)
            .ok()
            .map(Self)
            .filter(|id| id.to_string() == value)
            .ok_or_else(|| InvalidListId(value.to_string()))
    }

    /// Returns whether `value` would be accepted by [`ListId::parse`].
    pub fn is_valid(value: &str) -> bool {
        Self::parse(value).is_ok()
    }
}

impl Display for ListId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ListId {
    type Err = InvalidListId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for ListId {
    type Error = InvalidListId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ListId> for String {
    fn from(value: ListId) -> Self {
        value.to_string()
    }
}

/// Rejected list identifier input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidListId(pub String);

impl Display for InvalidListId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed list id: `{}`", self.0)
    }
}

impl Error for InvalidListId {}

/// Caller-facing input accepted wherever a list identity is expected.
///
/// Lets callers pass raw route parameters (`&str`) or an already parsed
/// [`ListId`] through the same API.
pub trait ListIdInput {
    /// Converts the input into a validated list identifier.
    fn to_list_id(&self) -> Result<ListId, InvalidListId>;
}

impl ListIdInput for ListId {
    fn to_list_id(&self) -> Result<ListId, InvalidListId> {
        Ok(*self)
    }
}

impl ListIdInput for str {
    fn to_list_id(&self) -> Result<ListId, InvalidListId> {
        ListId::parse(self)
    }
}

impl ListIdInput for String {
    fn to_list_id(&self) -> Result<ListId, InvalidListId> {
        ListId::parse(self)
    }
}

/// Identifier of one item inside a list.
///
/// Generated from a random v4 UUID rendered as 32 lowercase hex chars.
/// Uniqueness is best-effort; the store does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One checkable entry of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoItem {
    pub id: ItemId,
    pub label: String,
    pub checked: bool,
}

impl ToDoItem {
    /// Creates an unchecked item with a freshly generated id.
    ///
    /// # Errors
    /// - Returns `TodoValidationError::EmptyLabel` for empty/blank labels.
    pub fn new(label: impl Into<String>) -> Result<Self, TodoValidationError> {
        let label = label.into();
        validate_label(&label)?;
        Ok(Self {
            id: ItemId::generate(),
            label,
            checked: false,
        })
    }
}

/// Full list view with embedded items in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoList {
    pub id: ListId,
    pub name: String,
    pub items: Vec<ToDoItem>,
}

impl ToDoList {
    /// Looks up one embedded item by id.
    pub fn item(&self, item_id: &str) -> Option<&ToDoItem> {
        self.items.iter().find(|item| item.id.as_str() == item_id)
    }
}

/// Summary projection used by list overviews.
///
/// `item_count` is computed by the store at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: ListId,
    pub name: String,
    pub item_count: u64,
}

/// Input validation failures raised before any store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    EmptyName,
    EmptyLabel,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "list name cannot be empty"),
            Self::EmptyLabel => write!(f, "item label cannot be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// Validates a list name.
pub fn validate_name(name: &str) -> Result<(), TodoValidationError> {
    if name.trim().is_empty() {
        return Err(TodoValidationError::EmptyName);
    }
    Ok(())
}

/// Validates an item label.
pub fn validate_label(label: &str) -> Result<(), TodoValidationError> {
    if label.trim().is_empty() {
        return Err(TodoValidationError::EmptyLabel);
    }
    Ok(())
}
