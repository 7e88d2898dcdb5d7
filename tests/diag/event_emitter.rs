//! EventEmitter<T> — ordering, snapshot-on-emit, and panic isolation.

use std::sync::{Arc, Mutex};

use classhub_client::diag::EventEmitter;

fn make_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn listeners_run_in_registration_order() {
    let emitter: EventEmitter<String> = EventEmitter::new();
    let log = make_log();

    for name in ["a", "b", "c"] {
        let log = Arc::clone(&log);
        emitter.on(move |e: &String| log.lock().unwrap().push(format!("{name}:{e}")));
    }

    emitter.emit(&"x".to_string());

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:x".to_string(), "b:x".to_string(), "c:x".to_string()]
    );
}

#[test]
fn panicking_listener_does_not_stop_later_listeners() {
    let emitter: EventEmitter<u32> = EventEmitter::new();
    let log = make_log();

    emitter.on(|_: &u32| panic!("listener A misbehaves"));
    {
        let log = Arc::clone(&log);
        emitter.on(move |e: &u32| log.lock().unwrap().push(format!("b:{e}")));
    }

    // Must not propagate to the emitting call site either.
    emitter.emit(&7);

    assert_eq!(*log.lock().unwrap(), vec!["b:7".to_string()]);
}

#[test]
fn off_removes_only_the_given_listener() {
    let emitter: EventEmitter<u32> = EventEmitter::new();
    let log = make_log();

    let id_a = {
        let log = Arc::clone(&log);
        emitter.on(move |e: &u32| log.lock().unwrap().push(format!("a:{e}")))
    };
    {
        let log = Arc::clone(&log);
        emitter.on(move |e: &u32| log.lock().unwrap().push(format!("b:{e}")));
    }

    emitter.off(id_a);
    emitter.emit(&1);

    assert_eq!(*log.lock().unwrap(), vec!["b:1".to_string()]);
    assert_eq!(emitter.size(), 1);
}

#[test]
fn off_with_stale_id_is_a_no_op() {
    let emitter: EventEmitter<u32> = EventEmitter::new();
    let id = emitter.on(|_| {});
    emitter.off(id);
    emitter.off(id);
    assert_eq!(emitter.size(), 0);
}

#[test]
fn listener_added_during_emit_is_not_called_that_round() {
    let emitter: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    let log = make_log();

    {
        let inner_target = Arc::clone(&emitter);
        let log = Arc::clone(&log);
        emitter.on(move |e: &u32| {
            log.lock().unwrap().push(format!("outer:{e}"));
            let inner_log = Arc::clone(&log);
            inner_target.on(move |e: &u32| inner_log.lock().unwrap().push(format!("inner:{e}")));
        });
    }

    emitter.emit(&1);
    assert_eq!(*log.lock().unwrap(), vec!["outer:1".to_string()]);

    emitter.emit(&2);
    let entries = log.lock().unwrap();
    assert!(entries.contains(&"inner:2".to_string()));
}

#[test]
fn listener_removed_during_emit_still_runs_that_round() {
    let emitter: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    let log = make_log();

    let id_b = {
        let log = Arc::clone(&log);
        emitter.on(move |e: &u32| log.lock().unwrap().push(format!("b:{e}")))
    };

    // A removes B during the emission round; B was snapshotted before the
    // round started and still runs.
    {
        let emitter2 = Arc::clone(&emitter);
        let log = Arc::clone(&log);
        emitter.on(move |e: &u32| {
            log.lock().unwrap().push(format!("a:{e}"));
            emitter2.off(id_b);
        });
    }

    emitter.emit(&1);

    let entries = log.lock().unwrap().clone();
    assert_eq!(entries, vec!["b:1".to_string(), "a:1".to_string()]);
    assert_eq!(emitter.size(), 1);

    drop(entries);
    emitter.emit(&2);
    assert!(!log.lock().unwrap().contains(&"b:2".to_string()));
}
