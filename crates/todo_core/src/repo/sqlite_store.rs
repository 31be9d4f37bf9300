//! SQLite implementation of the list document store.
//!
//! # Responsibility
//! - Persist one `todo_lists` row per list document, items embedded as a
//!   JSON array.
//! - Express every item mutation as a single `UPDATE ... RETURNING`
//!   statement built from SQLite JSON functions.
//!
//! # Invariants
//! - Documents are assembled by SQLite (`json_object`), so summaries never
//!   load the item array into Rust.
//! - Positional updates require an item predicate in the filter.
//! - Updates never rewrite an `items` value that is not a JSON array.
//! - The store never opens, commits or rolls back transactions on its own.

use crate::db::migrations::latest_version;
use crate::model::todo_list::ListId;
use crate::repo::document_store::{
    DocumentStore, ItemMutation, ListFilter, Projection, RawDocument, RepoError, RepoResult,
    SortOrder,
};
use rusqlite::types::{ToSql, Value};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const FULL_DOCUMENT_SQL: &str =
    "json_object('_id', id, 'name', name, 'items', json(items))";
// A non-array `items` yields a null count, which fails summary decoding.
const SUMMARY_DOCUMENT_SQL: &str = "json_object('_id', id, 'name', name, 'item_count',
    CASE json_type(items) WHEN 'array' THEN json_array_length(items) END)";
const ITEMS_ARRAY_SQL: &str = "json_type(todo_lists.items) = 'array'";
const MATCHED_ITEM_SQL: &str = "EXISTS (
    SELECT 1
    FROM json_each(todo_lists.items) AS item
    WHERE json_extract(item.value, '$.id') = :item_id
)";
const TOUCH_SQL: &str = "updated_at = (strftime('%s', 'now') * 1000)";

type BoundParams = Vec<(&'static str, Value)>;

/// Caller-owned transaction passed through DAL calls.
///
/// Dropping the session without committing rolls it back.
pub struct StoreSession<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> StoreSession<'conn> {
    /// Starts an immediate transaction on `conn`.
    pub fn begin(conn: &'conn Connection) -> RepoResult<Self> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        Ok(Self { tx })
    }

    pub fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> RepoResult<()> {
        self.tx.rollback()?;
        Ok(())
    }

    fn connection(&self) -> &Connection {
        &self.tx
    }
}

/// SQLite-backed list document store.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Creates a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is
    ///   not the one this store writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn conn<'s>(&'s self, session: Option<&'s StoreSession<'conn>>) -> &'s Connection {
        match session {
            Some(session) => session.connection(),
            None => self.conn,
        }
    }
}

impl<'conn> DocumentStore for SqliteDocumentStore<'conn> {
    type Session = StoreSession<'conn>;

    fn scan(
        &self,
        filter: &ListFilter<'_>,
        projection: Projection,
        sort: SortOrder,
        session: Option<&Self::Session>,
        visit: &mut dyn FnMut(RawDocument) -> RepoResult<()>,
    ) -> RepoResult<()> {
        let (where_sql, bind_values) = filter_sql(filter);
        let order_sql = match sort {
            SortOrder::NameAscending => " ORDER BY name ASC, id ASC",
        };
        let sql = format!(
            "SELECT {} FROM todo_lists WHERE {where_sql}{order_sql};",
            projection_sql(projection)
        );

        let mut stmt = self.conn(session).prepare(&sql)?;
        let mut rows = stmt.query(bind(&bind_values).as_slice())?;
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            visit(parse_document(&text)?)?;
        }

        Ok(())
    }

    fn find_one(
        &self,
        filter: &ListFilter<'_>,
        session: Option<&Self::Session>,
    ) -> RepoResult<Option<RawDocument>> {
        let (where_sql, bind_values) = filter_sql(filter);
        let sql = format!("SELECT {FULL_DOCUMENT_SQL} FROM todo_lists WHERE {where_sql} LIMIT 1;");

        let mut stmt = self.conn(session).prepare(&sql)?;
        let mut rows = stmt.query(bind(&bind_values).as_slice())?;
        if let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            return Ok(Some(parse_document(&text)?));
        }

        Ok(None)
    }

    fn insert(
        &self,
        document: &RawDocument,
        session: Option<&Self::Session>,
    ) -> RepoResult<ListId> {
        let name = document
            .get("name")
            .and_then(RawDocument::as_str)
            .ok_or_else(|| {
                RepoError::InvalidData("insert requires a string `name` field".to_string())
            })?;
        let items = match document.get("items") {
            None => "[]".to_string(),
            Some(items @ RawDocument::Array(_)) => items.to_string(),
            Some(_) => {
                return Err(RepoError::InvalidData(
                    "insert requires `items` to be an array".to_string(),
                ));
            }
        };

        let id = ListId::generate();
        self.conn(session).execute(
            "INSERT INTO todo_lists (id, name, items) VALUES (?1, ?2, json(?3));",
            params![id.to_string(), name, items],
        )?;

        Ok(id)
    }

    fn conditional_update(
        &self,
        filter: &ListFilter<'_>,
        mutation: &ItemMutation<'_>,
        session: Option<&Self::Session>,
    ) -> RepoResult<Option<RawDocument>> {
        if matches!(filter, ListFilter::All) {
            return Err(RepoError::UnsupportedUpdate(
                "conditional update must target one list",
            ));
        }

        let (where_sql, mut bind_values) = filter_sql(filter);
        let set_sql = mutation_sql(filter, mutation, &mut bind_values)?;
        let sql = format!(
            "UPDATE todo_lists
             SET {set_sql}, {TOUCH_SQL}
             WHERE {where_sql} AND {ITEMS_ARRAY_SQL}
             RETURNING {FULL_DOCUMENT_SQL};"
        );

        let conn = self.conn(session);
        let updated: Option<String> = conn
            .query_row(&sql, bind(&bind_values).as_slice(), |row| row.get(0))
            .optional()?;
        match updated {
            Some(text) => Ok(Some(parse_document(&text)?)),
            None => {
                if let Some(list_id) = filter.list_id() {
                    ensure_items_array(conn, list_id)?;
                }
                Ok(None)
            }
        }
    }

    fn delete(
        &self,
        filter: &ListFilter<'_>,
        session: Option<&Self::Session>,
    ) -> RepoResult<usize> {
        let (where_sql, bind_values) = filter_sql(filter);
        let sql = format!("DELETE FROM todo_lists WHERE {where_sql};");
        let deleted = self
            .conn(session)
            .execute(&sql, bind(&bind_values).as_slice())?;
        Ok(deleted)
    }
}

fn projection_sql(projection: Projection) -> &'static str {
    match projection {
        Projection::Full => FULL_DOCUMENT_SQL,
        Projection::Summary => SUMMARY_DOCUMENT_SQL,
    }
}

fn filter_sql(filter: &ListFilter<'_>) -> (String, BoundParams) {
    match filter {
        ListFilter::All => ("1 = 1".to_string(), Vec::new()),
        ListFilter::Id(list_id) => (
            "id = :list_id".to_string(),
            vec![(":list_id", Value::Text(list_id.to_string()))],
        ),
        ListFilter::IdWithItem { list_id, item_id } => (
            format!("id = :list_id AND {MATCHED_ITEM_SQL}"),
            vec![
                (":list_id", Value::Text(list_id.to_string())),
                (":item_id", Value::Text((*item_id).to_string())),
            ],
        ),
    }
}

fn mutation_sql(
    filter: &ListFilter<'_>,
    mutation: &ItemMutation<'_>,
    bind_values: &mut BoundParams,
) -> RepoResult<&'static str> {
    match mutation {
        ItemMutation::Append(item) => {
            bind_values.push((":item", Value::Text(item.to_string())));
            Ok("items = json_insert(items, '$[#]', json(:item))")
        }
        ItemMutation::SetChecked { checked } => {
            if filter.matched_item().is_none() {
                return Err(RepoError::UnsupportedUpdate(
                    "positional update requires an item predicate in the filter",
                ));
            }
            let literal = if *checked { "true" } else { "false" };
            bind_values.push((":checked", Value::Text(literal.to_string())));
            // :item_id is bound by the filter; the first match wins.
            Ok("items = json_set(
                items,
                (
                    SELECT '$[' || item.key || '].checked'
                    FROM json_each(todo_lists.items) AS item
                    WHERE json_extract(item.value, '$.id') = :item_id
                    ORDER BY item.key
                    LIMIT 1
                ),
                json(:checked)
            )")
        }
        ItemMutation::Remove { item_id } => {
            bind_values.push((":remove_id", Value::Text((*item_id).to_string())));
            Ok("items = (
                SELECT json_group_array(json(item.value) ORDER BY item.key)
                FROM json_each(todo_lists.items) AS item
                WHERE json_extract(item.value, '$.id') IS NOT :remove_id
            )")
        }
    }
}

fn bind(values: &BoundParams) -> Vec<(&str, &dyn ToSql)> {
    values
        .iter()
        .map(|(name, value)| (*name, value as &dyn ToSql))
        .collect()
}

fn parse_document(text: &str) -> RepoResult<RawDocument> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("document is not valid JSON: {err}")))
}

/// Distinguishes "no such list" from a list whose `items` is not an array.
fn ensure_items_array(conn: &Connection, list_id: ListId) -> RepoResult<()> {
    let items_type: Option<String> = conn
        .query_row(
            "SELECT json_type(items) FROM todo_lists WHERE id = ?1;",
            [list_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match items_type.as_deref() {
        None | Some("array") => Ok(()),
        Some(other) => Err(RepoError::InvalidData(format!(
            "list `{list_id}` stores `items` as {other}, expected array"
        ))),
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todo_lists")? {
        return Err(RepoError::MissingRequiredTable("todo_lists"));
    }

    for column in ["id", "name", "items", "created_at", "updated_at"] {
        if !table_has_column(conn, "todo_lists", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "todo_lists",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::SqliteDocumentStore;
    use crate::db::open_db_in_memory;
    use crate::model::todo_list::ListId;
    use crate::repo::document_store::{
        DocumentStore, ItemMutation, ListFilter, Projection, RepoError, SortOrder,
    };
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteDocumentStore::try_new(&conn).err().unwrap();
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn summary_projection_counts_items_without_returning_them() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let id = store
            .insert(
                &json!({"name": "groceries", "items": [
                    {"id": "a", "label": "milk", "checked": false},
                    {"id": "b", "label": "eggs", "checked": true}
                ]}),
                None,
            )
            .unwrap();

        let mut docs = Vec::new();
        store
            .scan(
                &ListFilter::All,
                Projection::Summary,
                SortOrder::NameAscending,
                None,
                &mut |doc| {
                    docs.push(doc);
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(
            docs,
            vec![json!({"_id": id.to_string(), "name": "groceries", "item_count": 2})]
        );
    }

    #[test]
    fn set_checked_without_item_predicate_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let id = store.insert(&json!({"name": "x", "items": []}), None).unwrap();

        let err = store
            .conditional_update(
                &ListFilter::Id(id),
                &ItemMutation::SetChecked { checked: true },
                None,
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::UnsupportedUpdate(_)));
    }

    #[test]
    fn conditional_update_on_missing_document_returns_none() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        let result = store
            .conditional_update(
                &ListFilter::Id(ListId::generate()),
                &ItemMutation::Append(json!({"id": "a", "label": "l", "checked": false})),
                None,
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn insert_requires_string_name() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        let err = store.insert(&json!({"items": []}), None).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn remove_keeps_remaining_items_in_order() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let id = store
            .insert(
                &json!({"name": "x", "items": [
                    {"id": "a", "label": "1", "checked": false},
                    {"id": "b", "label": "2", "checked": false},
                    {"id": "c", "label": "3", "checked": true}
                ]}),
                None,
            )
            .unwrap();

        let doc = store
            .conditional_update(
                &ListFilter::Id(id),
                &ItemMutation::Remove { item_id: "b" },
                None,
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            doc["items"],
            json!([
                {"id": "a", "label": "1", "checked": false},
                {"id": "c", "label": "3", "checked": true}
            ])
        );
    }
}
