use dualmode::concurrency::sync::{SwitchableMutex, SwitchableRwLock};
use dualmode::{Array, Set, Stack};
use std::cell::Cell;
use std::rc::Rc;

fn assert_send<T: Send>() {}
fn assert_sync<T: Sync>() {}

#[test]
fn collections_are_send_and_sync_for_thread_safe_elements() {
    assert_send::<Array<String>>();
    assert_sync::<Array<String>>();
    assert_send::<Set<u64>>();
    assert_sync::<Set<u64>>();
    assert_send::<Stack<Vec<u8>>>();
    assert_sync::<Stack<Vec<u8>>>();
}

#[test]
fn guards_follow_t_bounds() {
    // `Cell<u8>` is Send but not Sync: the rwlock hands out `&T` to several
    // readers and must not be Sync, while the mutex only ever hands out one
    // reference at a time.
    assert_send::<SwitchableRwLock<Cell<u8>>>();
    assert_send::<SwitchableMutex<Cell<u8>>>();
    assert_sync::<SwitchableMutex<Cell<u8>>>();
}

#[test]
fn non_send_elements_stay_local() {
    // Compiles only because nothing here requires Send or Sync.
    let array = Array::from_iter([Rc::new(1)]);
    let shared = array.get(0).unwrap();
    assert_eq!(Rc::strong_count(&shared), 2);
}
