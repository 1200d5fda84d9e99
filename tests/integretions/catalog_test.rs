use tiny_db::{storage::Type, utils::HandyRwLock};

use crate::test_utils::{create_heap_table, setup};

#[test]
fn test_lookup_by_name_and_id() {
    let db = setup();

    let first_rc = create_heap_table(&db, 2, &[vec![1, 2]]);
    let second_rc = create_heap_table(&db, 3, &[]);

    let first_id = first_rc.rl().get_id();
    let first_name = first_rc.rl().name.clone();

    let catalog = db.catalog();

    assert_eq!(catalog.get_table_id(&first_name).unwrap(), first_id);
    assert_eq!(
        catalog.get_table_by_name(&first_name).unwrap().rl().get_id(),
        first_id
    );

    let tuple_desc = catalog.get_tuple_desc(&first_id).unwrap();
    assert_eq!(tuple_desc.fields_count(), 2);
    assert_eq!(tuple_desc.get_field_type(0).unwrap(), Type::Int);

    assert_eq!(catalog.get_primary_key(&first_id).unwrap(), "int-column-0");

    let mut ids = catalog.table_ids();
    ids.sort();
    let mut expect = vec![first_id, second_rc.rl().get_id()];
    expect.sort();
    assert_eq!(ids, expect);
}

#[test]
fn test_missing_table_is_not_found() {
    let db = setup();
    let catalog = db.catalog();

    assert!(catalog.get_table(&12345).is_err());
    assert!(catalog.get_table_by_name("nope").is_err());
    assert!(catalog.get_tuple_desc(&12345).is_err());
}

#[test]
fn test_table_id_is_stable() {
    let db = setup();

    let table_rc = create_heap_table(&db, 1, &[vec![1]]);
    let id = table_rc.rl().get_id();

    // reopening the same file yields the same id
    let path = db.get_path().join("reopen.dat");
    let tuple_desc = tiny_db::storage::TupleDesc::small_int_desc(1);
    let a = tiny_db::storage::HeapTable::new(path.to_str().unwrap(), "a", "int-column-0", &tuple_desc)
        .unwrap();
    let b = tiny_db::storage::HeapTable::new(path.to_str().unwrap(), "b", "int-column-0", &tuple_desc)
        .unwrap();
    assert_eq!(a.get_id(), b.get_id());
    assert_ne!(a.get_id(), id);
}
