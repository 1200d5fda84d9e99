use tiny_db::{
    execution::{OpIterator, OrderBy, SeqScan},
    transaction::Transaction,
    utils::HandyRwLock,
};

use crate::test_utils::{collect_all, create_random_heap_table, setup};

#[test]
fn test_sorts_ascending_and_descending() {
    let db = setup();

    let mut cells: Vec<Vec<i32>> = Vec::new();
    let table_rc = create_random_heap_table(&db, 2, 500, &mut cells);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();

    for asc in [true, false].iter() {
        let scan = Box::new(SeqScan::new(db.clone(), &tx, table_id, "t").unwrap());
        let mut order_by = OrderBy::new(scan, 1, *asc);

        order_by.open().unwrap();
        let results = collect_all(&mut order_by);
        order_by.close().unwrap();

        assert_eq!(results.len(), cells.len());
        let keys: Vec<i32> = results
            .iter()
            .map(|t| t.get_cell(1).get_int().unwrap())
            .collect();

        let mut expect = keys.clone();
        expect.sort();
        if !*asc {
            expect.reverse();
        }
        assert_eq!(keys, expect, "asc: {}", asc);
    }

    tx.commit(&db).unwrap();
}

#[test]
fn test_rewind_replays_sorted_stream() {
    let db = setup();

    let mut cells: Vec<Vec<i32>> = Vec::new();
    let table_rc = create_random_heap_table(&db, 1, 50, &mut cells);
    let table_id = table_rc.rl().get_id();

    let tx = Transaction::new();
    let scan = Box::new(SeqScan::new(db.clone(), &tx, table_id, "t").unwrap());
    let mut order_by = OrderBy::new(scan, 0, true);

    order_by.open().unwrap();
    let first = collect_all(&mut order_by);
    order_by.rewind().unwrap();
    let second = collect_all(&mut order_by);
    order_by.close().unwrap();

    assert_eq!(first, second);

    tx.commit(&db).unwrap();
}
