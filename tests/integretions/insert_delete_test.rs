use tiny_db::{
    execution::{Delete, Filter, Insert, OpIterator, SeqScan},
    storage::{Field, Tuple, TupleDesc},
    transaction::Transaction,
    utils::HandyRwLock,
    Op, Predicate,
};

use crate::test_utils::{collect_all, create_heap_table, setup, TupleList};

fn count_rows(db: &std::sync::Arc<tiny_db::Database>, table_id: u32) -> usize {
    let tx = Transaction::new();
    let mut scan = SeqScan::new(db.clone(), &tx, table_id, "t").unwrap();
    scan.open().unwrap();
    let count = collect_all(&mut scan).len();
    scan.close().unwrap();
    tx.commit(db).unwrap();
    count
}

#[test]
fn test_insert_into_empty_table() {
    let db = setup();

    // zero pages on disk, the first insert has to grow the file
    let table_rc = create_heap_table(&db, 2, &[]);
    let table_id = table_rc.rl().get_id();
    assert_eq!(table_rc.rl().num_pages(), 0);

    let tuple_desc = TupleDesc::small_int_desc(2);
    let tuples: Vec<Tuple> = (0..3).map(|v| Tuple::new_int_tuple(v, 2)).collect();

    let tx = Transaction::new();
    let child = Box::new(TupleList::new(tuple_desc, tuples));
    let mut insert = Insert::new(db.clone(), &tx, child, table_id);

    insert.open().unwrap();
    let result = insert.next().unwrap().unwrap();
    assert_eq!(result.get_cell(0).get_int().unwrap(), 3);

    // the count tuple is a one-shot
    assert!(insert.next().unwrap().is_none());

    insert.close().unwrap();
    tx.commit(&db).unwrap();

    assert_eq!(table_rc.rl().num_pages(), 1);
    assert_eq!(count_rows(&db, table_id), 3);
}

#[test]
fn test_insert_rejects_mismatched_child() {
    let db = setup();

    let table_rc = create_heap_table(&db, 2, &[]);
    let table_id = table_rc.rl().get_id();

    // three columns against a two-column table
    let tx = Transaction::new();
    let child = Box::new(TupleList::new(TupleDesc::small_int_desc(3), Vec::new()));
    let mut insert = Insert::new(db.clone(), &tx, child, table_id);

    assert!(insert.open().is_err());
    tx.abort(&db).unwrap();
}

#[test]
fn test_delete_with_filter() {
    let db = setup();

    let cells: Vec<Vec<i32>> = (0..100).map(|v| vec![v, v]).collect();
    let table_rc = create_heap_table(&db, 2, &cells);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let scan = Box::new(SeqScan::new(db.clone(), &tx, table_id, "t").unwrap());
    let predicate = Predicate::new(0, Op::LessThan, &Field::Int(30));
    let child = Box::new(Filter::new(predicate, scan));
    let mut delete = Delete::new(db.clone(), &tx, child);

    delete.open().unwrap();
    let result = delete.next().unwrap().unwrap();
    assert_eq!(result.get_cell(0).get_int().unwrap(), 30);
    assert!(delete.next().unwrap().is_none());

    delete.close().unwrap();
    tx.commit(&db).unwrap();

    assert_eq!(count_rows(&db, table_id), 70);
}

#[test]
fn test_insert_then_delete_round_trip() {
    let db = setup();

    let table_rc = create_heap_table(&db, 2, &[]);
    let table_id = table_rc.rl().get_id();

    // fill more than one page so the insert path crosses a page
    // boundary (504 tuples of two ints per page)
    let rows = 600;
    let tuple_desc = TupleDesc::small_int_desc(2);
    let tuples: Vec<Tuple> = (0..rows).map(|v| Tuple::new_int_tuple(v, 2)).collect();

    let tx = Transaction::new();
    let child = Box::new(TupleList::new(tuple_desc, tuples));
    let mut insert = Insert::new(db.clone(), &tx, child, table_id);
    insert.open().unwrap();
    let result = insert.next().unwrap().unwrap();
    assert_eq!(result.get_cell(0).get_int().unwrap(), rows);
    insert.close().unwrap();
    tx.commit(&db).unwrap();

    assert_eq!(table_rc.rl().num_pages(), 2);
    assert_eq!(count_rows(&db, table_id), rows as usize);

    // now delete everything
    let tx = Transaction::new();
    let scan = Box::new(SeqScan::new(db.clone(), &tx, table_id, "t").unwrap());
    let mut delete = Delete::new(db.clone(), &tx, scan);
    delete.open().unwrap();
    let result = delete.next().unwrap().unwrap();
    assert_eq!(result.get_cell(0).get_int().unwrap(), rows);
    delete.close().unwrap();
    tx.commit(&db).unwrap();

    assert_eq!(count_rows(&db, table_id), 0);
}
