//! Raw document to domain view conversion.

use crate::model::todo_list::{ItemId, ListId, ListSummary, ToDoItem, ToDoList};
use crate::repo::document_store::{RawDocument, RepoError, RepoResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct ListDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    items: Vec<ItemDocument>,
}

#[derive(Deserialize)]
struct ItemDocument {
    id: String,
    label: String,
    checked: bool,
}

#[derive(Deserialize)]
struct SummaryDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    item_count: u64,
}

pub(crate) fn list_from_document(document: RawDocument) -> RepoResult<ToDoList> {
    let ListDocument { id, name, items } = decode(document, "list")?;
    Ok(ToDoList {
        id: stored_list_id(&id)?,
        name,
        items: items
            .into_iter()
            .map(|item| ToDoItem {
                id: ItemId::from(item.id),
                label: item.label,
                checked: item.checked,
            })
            .collect(),
    })
}

pub(crate) fn summary_from_document(document: RawDocument) -> RepoResult<ListSummary> {
    let SummaryDocument {
        id,
        name,
        item_count,
    } = decode(document, "summary")?;
    Ok(ListSummary {
        id: stored_list_id(&id)?,
        name,
        item_count,
    })
}

fn decode<T: DeserializeOwned>(document: RawDocument, kind: &str) -> RepoResult<T> {
    serde_json::from_value(document)
        .map_err(|err| RepoError::InvalidData(format!("malformed {kind} document: {err}")))
}

fn stored_list_id(value: &str) -> RepoResult<ListId> {
    ListId::parse(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid list id `{value}` in todo_lists.id")))
}

#[cfg(test)]
mod tests {
    use super::{list_from_document, summary_from_document};
    use crate::model::todo_list::ListId;
    use crate::repo::document_store::RepoError;
    use serde_json::json;

    #[test]
    fn list_document_maps_items_in_order() {
        let id = ListId::generate();
        let list = list_from_document(json!({
            "_id": id.to_string(),
            "name": "chores",
            "items": [
                {"id": "a1", "label": "sweep", "checked": true},
                {"id": "b2", "label": "dust", "checked": false}
            ]
        }))
        .unwrap();

        assert_eq!(list.id, id);
        assert_eq!(list.name, "chores");
        let labels: Vec<_> = list.items.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(labels, ["sweep", "dust"]);
        assert!(list.items[0].checked);
        assert_eq!(list.items[1].id.as_str(), "b2");
    }

    #[test]
    fn missing_item_field_is_invalid_data() {
        let err = list_from_document(json!({
            "_id": ListId::generate().to_string(),
            "name": "chores",
            "items": [{"id": "a1", "label": "sweep"}]
        }))
        .unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("checked")));
    }

    #[test]
    fn malformed_stored_id_is_invalid_data() {
        let err = summary_from_document(json!({
            "_id": "42",
            "name": "chores",
            "item_count": 0
        }))
        .unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
