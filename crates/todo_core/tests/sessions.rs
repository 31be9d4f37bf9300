use todo_core::db::open_db_in_memory;
use todo_core::{SqliteDocumentStore, StoreSession, ToDoDal};

#[test]
fn committed_session_work_is_visible() {
    let conn = open_db_in_memory().unwrap();
    let dal = ToDoDal::new(SqliteDocumentStore::try_new(&conn).unwrap());

    let session = StoreSession::begin(&conn).unwrap();
    let id = dal.create_todo_list("batched", Some(&session)).unwrap();
    dal.create_item(&id, "first", Some(&session)).unwrap().unwrap();
    let list = dal
        .create_item(&id, "second", Some(&session))
        .unwrap()
        .unwrap();
    assert_eq!(list.items.len(), 2);
    session.commit().unwrap();

    let list = dal.get_todo_list(&id, None).unwrap();
    let labels: Vec<_> = list.items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, ["first", "second"]);
}

#[test]
fn rolled_back_session_work_is_discarded() {
    let conn = open_db_in_memory().unwrap();
    let dal = ToDoDal::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let kept = dal.create_todo_list("kept", None).unwrap();

    let session = StoreSession::begin(&conn).unwrap();
    dal.create_todo_list("discarded", Some(&session)).unwrap();
    dal.create_item(&kept, "discarded item", Some(&session))
        .unwrap()
        .unwrap();
    assert_eq!(dal.list_todo_lists(Some(&session)).unwrap().len(), 2);
    session.rollback().unwrap();

    let summaries = dal.list_todo_lists(None).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, kept);
    assert_eq!(summaries[0].item_count, 0);
}

#[test]
fn dropped_session_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let dal = ToDoDal::new(SqliteDocumentStore::try_new(&conn).unwrap());

    {
        let session = StoreSession::begin(&conn).unwrap();
        dal.create_todo_list("temporary", Some(&session)).unwrap();
    }

    assert!(dal.list_todo_lists(None).unwrap().is_empty());
}
