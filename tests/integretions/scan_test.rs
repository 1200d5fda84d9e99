use log::info;
use tiny_db::{
    execution::{OpIterator, SeqScan},
    transaction::Transaction,
    utils::HandyRwLock,
};

use crate::test_utils::{create_random_heap_table, setup};

#[test]
fn test_small() {
    let db = setup();

    let column_sizes = [1, 2, 3, 4];
    let row_sizes = [0, 1, 2, 503, 504, 505, 1009];

    for columns in &column_sizes {
        for rows in &row_sizes {
            info!("validate scan, columns: {}, rows: {}", columns, rows);

            let mut cells: Vec<Vec<i32>> = Vec::new();
            let table_rc = create_random_heap_table(&db, *columns, *rows, &mut cells);
            let table_id = table_rc.rl().get_id();

            let tx = Transaction::new();
            let mut scan = SeqScan::new(db.clone(), &tx, table_id, "t").unwrap();
            scan.open().unwrap();

            let mut row_index = 0;
            while let Some(tuple) = scan.next().unwrap() {
                assert!(tuple.equal_cells(&cells[row_index]));
                row_index += 1;
            }
            assert_eq!(row_index, cells.len());

            scan.close().unwrap();
            tx.commit(&db).unwrap();
        }
    }
}

#[test]
fn test_rewind() {
    let db = setup();

    let mut cells: Vec<Vec<i32>> = Vec::new();
    let table_rc = create_random_heap_table(&db, 2, 1000, &mut cells);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let mut scan = SeqScan::new(db.clone(), &tx, table_id, "t").unwrap();
    scan.open().unwrap();

    // scan the first chunk of the table
    let mut row_index = 0;
    while let Some(tuple) = scan.next().unwrap() {
        assert!(tuple.equal_cells(&cells[row_index]));
        row_index += 1;
        if row_index >= 100 {
            break;
        }
    }

    // rewind, the stream must restart from the first tuple
    scan.rewind().unwrap();

    let mut row_index = 0;
    while let Some(tuple) = scan.next().unwrap() {
        assert!(tuple.equal_cells(&cells[row_index]));
        row_index += 1;
    }
    assert_eq!(row_index, cells.len());

    scan.close().unwrap();
    tx.commit(&db).unwrap();
}

#[test]
fn test_alias_renames_fields() {
    let db = setup();

    let mut cells: Vec<Vec<i32>> = Vec::new();
    let table_rc = create_random_heap_table(&db, 2, 1, &mut cells);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let scan = SeqScan::new(db.clone(), &tx, table_id, "orders").unwrap();

    let tuple_desc = scan.get_tuple_desc();
    assert_eq!(tuple_desc.get_field_pos("orders.int-column-0").unwrap(), 0);
    assert_eq!(tuple_desc.get_field_pos("orders.int-column-1").unwrap(), 1);
    tx.commit(&db).unwrap();
}

#[test]
fn test_end_of_stream_is_sticky() {
    let db = setup();

    let mut cells: Vec<Vec<i32>> = Vec::new();
    let table_rc = create_random_heap_table(&db, 1, 3, &mut cells);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let mut scan = SeqScan::new(db.clone(), &tx, table_id, "t").unwrap();
    scan.open().unwrap();

    while scan.next().unwrap().is_some() {}

    // end-of-stream repeats instead of failing
    assert!(scan.next().unwrap().is_none());
    assert!(!scan.has_next().unwrap());

    scan.close().unwrap();
    tx.commit(&db).unwrap();
}
