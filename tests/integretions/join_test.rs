use tiny_db::{
    execution::{Filter, Join, OpIterator, SeqScan},
    storage::Field,
    transaction::Transaction,
    utils::HandyRwLock,
    JoinPredicate, Op, Predicate,
};

use crate::test_utils::{collect_all, create_heap_table, setup};

#[test]
fn test_equality_join() {
    let db = setup();
    let tx = Transaction::new();

    // keys 1..=5 on the left, 3..=8 on the right
    let left_cells: Vec<Vec<i32>> = (1..=5).map(|v| vec![v, v * 10]).collect();
    let right_cells: Vec<Vec<i32>> = (3..=8).map(|v| vec![v, v * 100]).collect();

    let left_rc = create_heap_table(&db, 2, &left_cells);
    let right_rc = create_heap_table(&db, 2, &right_cells);

    let left = Box::new(SeqScan::new(db.clone(), &tx, left_rc.rl().get_id(), "l").unwrap());
    let right = Box::new(SeqScan::new(db.clone(), &tx, right_rc.rl().get_id(), "r").unwrap());

    let mut join = Join::new(JoinPredicate::new(0, Op::Equals, 0), left, right);
    assert_eq!(join.get_tuple_desc().fields_count(), 4);

    join.open().unwrap();
    let results = collect_all(&mut join);
    join.close().unwrap();

    let mut rows: Vec<Vec<i32>> = results
        .iter()
        .map(|t| {
            (0..4)
                .map(|i| t.get_cell(i).get_int().unwrap())
                .collect::<Vec<i32>>()
        })
        .collect();
    rows.sort();

    assert_eq!(
        rows,
        vec![
            vec![3, 30, 3, 300],
            vec![4, 40, 4, 400],
            vec![5, 50, 5, 500],
        ]
    );

    tx.commit(&db).unwrap();
}

#[test]
fn test_join_emits_every_matching_pair() {
    let db = setup();
    let tx = Transaction::new();

    // duplicate keys multiply
    let left_cells = vec![vec![1, 0], vec![1, 1]];
    let right_cells = vec![vec![1, 2], vec![1, 3], vec![2, 4]];

    let left_rc = create_heap_table(&db, 2, &left_cells);
    let right_rc = create_heap_table(&db, 2, &right_cells);

    let left = Box::new(SeqScan::new(db.clone(), &tx, left_rc.rl().get_id(), "l").unwrap());
    let right = Box::new(SeqScan::new(db.clone(), &tx, right_rc.rl().get_id(), "r").unwrap());

    let mut join = Join::new(JoinPredicate::new(0, Op::Equals, 0), left, right);
    join.open().unwrap();
    let results = collect_all(&mut join);
    join.close().unwrap();

    // 2 left rows with key 1, each matching 2 right rows
    assert_eq!(results.len(), 4);

    tx.commit(&db).unwrap();
}

#[test]
fn test_less_than_join() {
    let db = setup();
    let tx = Transaction::new();

    let left_cells: Vec<Vec<i32>> = (1..=3).map(|v| vec![v]).collect();
    let right_cells: Vec<Vec<i32>> = (1..=3).map(|v| vec![v]).collect();

    let left_rc = create_heap_table(&db, 1, &left_cells);
    let right_rc = create_heap_table(&db, 1, &right_cells);

    let left = Box::new(SeqScan::new(db.clone(), &tx, left_rc.rl().get_id(), "l").unwrap());
    let right = Box::new(SeqScan::new(db.clone(), &tx, right_rc.rl().get_id(), "r").unwrap());

    let mut join = Join::new(JoinPredicate::new(0, Op::LessThan, 0), left, right);
    join.open().unwrap();
    let results = collect_all(&mut join);
    join.close().unwrap();

    // (1,2), (1,3), (2,3)
    assert_eq!(results.len(), 3);

    tx.commit(&db).unwrap();
}

#[test]
fn test_filter_over_scan() {
    let db = setup();
    let tx = Transaction::new();

    let cells: Vec<Vec<i32>> = (0..100).map(|v| vec![v, v % 7]).collect();
    let table_rc = create_heap_table(&db, 2, &cells);

    let scan = Box::new(SeqScan::new(db.clone(), &tx, table_rc.rl().get_id(), "t").unwrap());
    let predicate = Predicate::new(1, Op::Equals, &Field::Int(0));
    let mut filter = Filter::new(predicate, scan);

    filter.open().unwrap();
    let results = collect_all(&mut filter);

    // multiples of 7 in 0..100
    assert_eq!(results.len(), 15);
    for tuple in &results {
        assert_eq!(tuple.get_cell(0).get_int().unwrap() % 7, 0);
    }

    // the iterator law: rewind replays the same stream
    filter.rewind().unwrap();
    let replay = collect_all(&mut filter);
    assert_eq!(results, replay);

    filter.close().unwrap();
    tx.commit(&db).unwrap();
}
