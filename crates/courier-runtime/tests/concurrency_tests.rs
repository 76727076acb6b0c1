//! Concurrent start/stop tests
//!
//! Many targets started and stopped from several threads at once must end
//! with every listener released and every target stopped.

use courier_compiler::BindingModel;
use courier_compiler::decl::Declarations;
use courier_core::{Node, ReceiverState};
use courier_runtime::{Courier, DispatchRegistry, MemoryEventSource, QueuedExecutor, RecipientTable};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const DECLS: &str = r#"
[[types]]
name = "Counter"

[[types.fields]]
name = "value"
ty = "i32"
annotations = [{ receive_messages = "/count" }, { receive_data = "/count" }]

[[types.methods]]
name = "on_peers"
params = ["Vec<Node>"]
annotations = ["remote_nodes", "background_thread"]
"#;

#[derive(Default)]
struct Counter {
    value: AtomicI32,
}

fn courier(source: Arc<MemoryEventSource>) -> Courier {
    let (model, diagnostics) = BindingModel::build(&Declarations::from_toml(DECLS).unwrap());
    assert!(diagnostics.is_empty());
    let registry = DispatchRegistry::builder(&model)
        .bind(
            "Counter",
            RecipientTable::new()
                .assign("value", |c: &Counter, v: i32| c.value.store(v, Ordering::SeqCst))
                .remote_nodes("on_peers", |_: &Counter, _: Vec<Node>| {}),
        )
        .unwrap()
        .build();

    Courier::builder(registry)
        .source(source)
        .main_thread(Arc::new(QueuedExecutor::new()))
        .build()
        .unwrap()
}

#[test]
fn test_concurrent_start_stop_releases_everything() {
    let source = Arc::new(MemoryEventSource::new(Node::new("local", "Watch")));
    source.set_subscribe_delay(Some(Duration::from_millis(2)));
    let courier = Arc::new(courier(source.clone()));
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let mut handles = vec![];
    for _ in 0..num_threads {
        let courier = courier.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            let targets: Vec<Arc<Counter>> = (0..5).map(|_| Arc::new(Counter::default())).collect();
            barrier.wait();

            let mut pending = vec![];
            for target in &targets {
                pending.push(courier.start_receiving(target).unwrap());
                pending.push(courier.stop_receiving(target).unwrap());
                pending.push(courier.start_receiving(target).unwrap());
            }
            for target in &targets {
                pending.push(courier.stop_receiving(target).unwrap());
            }
            for handle in pending {
                courier.block_on(handle).unwrap();
            }
            targets
        }));
    }

    let targets: Vec<Arc<Counter>> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("thread should complete"))
        .collect();

    assert_eq!(source.listener_counts().total(), 0);
    for target in &targets {
        assert_eq!(courier.receiver_state(target), ReceiverState::Stopped);
    }
    source.receive_message("/count", b"1", "phone");
    assert!(targets.iter().all(|t| t.value.load(Ordering::SeqCst) == 0));
}

#[test]
fn test_events_during_start_do_not_panic() {
    let source = Arc::new(MemoryEventSource::new(Node::new("local", "Watch")));
    let courier = Arc::new(courier(source.clone()));
    let target = Arc::new(Counter::default());

    let emitter = {
        let source = source.clone();
        thread::spawn(move || {
            for i in 0..200 {
                source.receive_message("/count", i.to_string().as_bytes(), "phone");
                source.receive_data("/count", i.to_string().as_bytes(), "phone");
            }
        })
    };

    let started = courier.start_receiving(&target).unwrap();
    courier.block_on(started).unwrap();
    emitter.join().expect("emitter should complete");

    assert_eq!(courier.receiver_state(&target), ReceiverState::Receiving);
    source.receive_message("/count", b"500", "phone");
    assert_eq!(target.value.load(Ordering::SeqCst), 500);
}
