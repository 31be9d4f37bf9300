//! To-do list data access object.
//!
//! # Responsibility
//! - Provide the list/item use-cases consumed by the route layer.
//! - Validate identities and text input before any store call.
//!
//! # Invariants
//! - Each method issues at most one store call.
//! - `Option::None` means "no matching document"; `Err` means a fault.
//! - The optional session is handed to the store untouched.

use crate::dal::mapping::{list_from_document, summary_from_document};
use crate::model::todo_list::{
    validate_name, ListId, ListIdInput, ListSummary, ToDoItem, ToDoList,
};
use crate::repo::document_store::{
    DocumentStore, ItemMutation, ListFilter, Projection, RawDocument, RepoError, RepoResult,
    SortOrder,
};
use log::debug;
use serde_json::json;

/// Data access object for to-do lists, generic over the document store.
pub struct ToDoDal<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ToDoDal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns all list summaries sorted by name.
    ///
    /// Each call runs a fresh scan; an empty store yields an empty vector.
    pub fn list_todo_lists(&self, session: Option<&S::Session>) -> RepoResult<Vec<ListSummary>> {
        let mut summaries = Vec::new();
        self.for_each_todo_list(session, |summary| {
            summaries.push(summary);
            Ok(())
        })?;
        Ok(summaries)
    }

    /// Streams list summaries sorted by name to `visit`, one row at a time.
    ///
    /// Returning an error from `visit` stops the scan and propagates it.
    pub fn for_each_todo_list(
        &self,
        session: Option<&S::Session>,
        mut visit: impl FnMut(ListSummary) -> RepoResult<()>,
    ) -> RepoResult<()> {
        self.store.scan(
            &ListFilter::All,
            Projection::Summary,
            SortOrder::NameAscending,
            session,
            &mut |document| visit(summary_from_document(document)?),
        )
    }

    /// Creates an empty list and returns its store-generated identity.
    pub fn create_todo_list(&self, name: &str, session: Option<&S::Session>) -> RepoResult<ListId> {
        validate_name(name)?;
        let id = self
            .store
            .insert(&json!({ "name": name, "items": [] }), session)?;
        debug!("event=todo_list_create module=dal status=ok list_id={id}");
        Ok(id)
    }

    /// Fetches one full list.
    ///
    /// # Errors
    /// - `InvalidListId` for malformed input.
    /// - `NotFound` when no list has this identity.
    pub fn get_todo_list(
        &self,
        list_id: &(impl ListIdInput + ?Sized),
        session: Option<&S::Session>,
    ) -> RepoResult<ToDoList> {
        let list_id = list_id.to_list_id()?;
        match self.store.find_one(&ListFilter::Id(list_id), session)? {
            Some(document) => list_from_document(document),
            None => Err(RepoError::NotFound(list_id)),
        }
    }

    /// Deletes one list with all its items.
    ///
    /// Returns `true` iff exactly one document was removed.
    pub fn delete_todo_list(
        &self,
        list_id: &(impl ListIdInput + ?Sized),
        session: Option<&S::Session>,
    ) -> RepoResult<bool> {
        let list_id = list_id.to_list_id()?;
        let deleted = self.store.delete(&ListFilter::Id(list_id), session)?;
        debug!("event=todo_list_delete module=dal status=ok list_id={list_id} deleted={deleted}");
        Ok(deleted == 1)
    }

    /// Appends a new unchecked item and returns the updated list.
    ///
    /// Returns `None` when the list does not exist.
    pub fn create_item(
        &self,
        list_id: &(impl ListIdInput + ?Sized),
        label: &str,
        session: Option<&S::Session>,
    ) -> RepoResult<Option<ToDoList>> {
        let list_id = list_id.to_list_id()?;
        let item = ToDoItem::new(label)?;
        let document = json!({
            "id": item.id.as_str(),
            "label": item.label,
            "checked": item.checked,
        });
        self.apply(
            "todo_item_create",
            &ListFilter::Id(list_id),
            &ItemMutation::Append(document),
            session,
        )
    }

    /// Sets `checked` on one item and returns the updated list.
    ///
    /// Returns `None` when the list does not exist or has no such item.
    pub fn set_checked_state(
        &self,
        list_id: &(impl ListIdInput + ?Sized),
        item_id: &str,
        checked: bool,
        session: Option<&S::Session>,
    ) -> RepoResult<Option<ToDoList>> {
        let list_id = list_id.to_list_id()?;
        self.apply(
            "todo_item_check",
            &ListFilter::IdWithItem { list_id, item_id },
            &ItemMutation::SetChecked { checked },
            session,
        )
    }

    /// Removes one item and returns the updated list.
    ///
    /// A missing `item_id` leaves the list unchanged and still returns it.
    /// Returns `None` only when the list does not exist.
    pub fn delete_item(
        &self,
        list_id: &(impl ListIdInput + ?Sized),
        item_id: &str,
        session: Option<&S::Session>,
    ) -> RepoResult<Option<ToDoList>> {
        let list_id = list_id.to_list_id()?;
        self.apply(
            "todo_item_delete",
            &ListFilter::Id(list_id),
            &ItemMutation::Remove { item_id },
            session,
        )
    }

    fn apply(
        &self,
        event: &'static str,
        filter: &ListFilter<'_>,
        mutation: &ItemMutation<'_>,
        session: Option<&S::Session>,
    ) -> RepoResult<Option<ToDoList>> {
        let updated: Option<RawDocument> =
            self.store.conditional_update(filter, mutation, session)?;
        let status = if updated.is_some() { "ok" } else { "absent" };
        debug!("event={event} module=dal status={status}");
        updated.map(list_from_document).transpose()
    }
}
