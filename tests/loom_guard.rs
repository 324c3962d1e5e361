//! Model-checked interleavings of the concurrent guard mode.
//!
//! Run with `RUSTFLAGS="--cfg loom" cargo test --test loom_guard --release`.

#![cfg(loom)]

use dualmode::concurrency::sync::{SwitchableMutex, SwitchableRwLock};
use dualmode::Safety;
use loom::sync::Arc;
use loom::thread;

#[test]
fn loom_concurrent_writers_serialize() {
    loom::model(|| {
        let lock = Arc::new(SwitchableRwLock::new(0usize, Safety::Concurrent));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    *lock.write() += 1;
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*lock.read(), 2);
    });
}

#[test]
fn loom_reader_sees_whole_write() {
    loom::model(|| {
        let lock = Arc::new(SwitchableRwLock::new((0u32, 0u32), Safety::Concurrent));

        let writer = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                let mut guard = lock.write();
                guard.0 = 1;
                guard.1 = 1;
            })
        };

        let pair = *lock.read();
        assert!(pair == (0, 0) || pair == (1, 1));

        writer.join().unwrap();
        assert_eq!(*lock.read(), (1, 1));
    });
}

#[test]
fn loom_mutex_push_pop() {
    loom::model(|| {
        let stack = Arc::new(SwitchableMutex::new(Vec::new(), Safety::Concurrent));

        let pusher = {
            let stack = Arc::clone(&stack);
            thread::spawn(move || stack.lock().push(7))
        };
        let popped = stack.lock().pop();

        pusher.join().unwrap();
        let remaining = stack.lock().len();
        match popped {
            Some(7) => assert_eq!(remaining, 0),
            None => assert_eq!(remaining, 1),
            other => panic!("unexpected pop {other:?}"),
        }
    });
}
