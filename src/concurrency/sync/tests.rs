use super::*;
use crate::Safety;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_switchable_mutex_lock() {
    for safety in [Safety::Unsync, Safety::Concurrent] {
        let mutex = SwitchableMutex::new(Vec::new(), safety);
        {
            let mut guard = mutex.lock();
            guard.push(1);
            assert!(mutex.try_lock().is_none());
        }
        assert!(mutex.try_lock().is_some());
        assert_eq!(mutex.safety(), safety);
        assert_eq!(mutex.into_inner(), vec![1]);
    }
}

#[test]
fn test_switchable_mutex_contention() {
    let mutex = SwitchableMutex::new(0u32, Safety::Concurrent);
    let mutex = &mutex;

    thread::scope(|s| {
        s.spawn(move || {
            let mut guard = mutex.lock();
            thread::sleep(Duration::from_millis(50));
            *guard += 1;
        });

        s.spawn(move || {
            thread::sleep(Duration::from_millis(10));
            // Blocks until the first thread releases.
            *mutex.lock() += 1;
        });
    });

    assert_eq!(*mutex.lock(), 2);
}

#[test]
#[should_panic(expected = "unsynchronized collection")]
fn test_unsync_mutex_relock_panics() {
    let mutex = SwitchableMutex::new((), Safety::Unsync);
    let _first = mutex.lock();
    let _second = mutex.lock();
}

#[test]
fn test_switchable_mutex_poison_recovery() {
    let mutex = Arc::new(SwitchableMutex::new(10, Safety::Concurrent));
    let cloned = Arc::clone(&mutex);
    let _ = thread::spawn(move || {
        let _guard = cloned.lock();
        panic!("poison");
    })
    .join();
    assert_eq!(*mutex.lock(), 10);
    assert!(mutex.try_lock().is_some());
}

#[test]
fn test_switchable_mutex_shares_send_only_state() {
    use std::cell::Cell;

    const THREADS: u64 = 4;
    const ITERS: u64 = 250;

    let counter = SwitchableMutex::new(Cell::new(0u64), Safety::Concurrent);
    let counter = &counter;
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(move || {
                for _ in 0..ITERS {
                    let guard = counter.lock();
                    guard.set(guard.get() + 1);
                }
            });
        }
    });
    assert_eq!(counter.lock().get(), THREADS * ITERS);
}

#[test]
fn test_guards_are_mode_agnostic() {
    fn bump(lock: &SwitchableRwLock<u8>) -> u8 {
        *lock.write() += 1;
        *lock.read()
    }

    assert_eq!(bump(&SwitchableRwLock::unsync(1)), 2);
    assert_eq!(bump(&SwitchableRwLock::concurrent(1)), 2);
}
