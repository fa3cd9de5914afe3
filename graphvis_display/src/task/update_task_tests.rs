//! Unit tests for update_task.rs

use crate::error::Error;
use crate::task::UpdateTask;

#[derive(Debug, Default)]
struct Counter {
    value: u32,
}

#[derive(Debug, Default)]
struct Outer {
    counter: Counter,
}

impl Outer {
    fn counter_mut(&mut self) -> &mut Counter {
        &mut self.counter
    }
}

#[test]
fn test_commit_runs_closure_once() {
    let snapshot = vec![3u32, 4, 5];
    let task = UpdateTask::new("sum", move |counter: &mut Counter| {
        counter.value += snapshot.iter().sum::<u32>();
        Ok(())
    });
    assert_eq!(task.label(), "sum");

    let mut counter = Counter::default();
    task.commit(&mut counter).unwrap();
    assert_eq!(counter.value, 12);
}

#[test]
fn test_commit_returns_closure_error() {
    let task = UpdateTask::new("fail", |_: &mut Counter| {
        Err(Error::InvalidRange { first: 4, last: 2, count: 3 })
    });
    let mut counter = Counter::default();
    assert_eq!(
        task.commit(&mut counter),
        Err(Error::InvalidRange { first: 4, last: 2, count: 3 })
    );
}

#[test]
fn test_route_targets_inner_value() {
    let task = UpdateTask::new("increment", |counter: &mut Counter| {
        counter.value += 1;
        Ok(())
    });
    let routed: UpdateTask<Outer> = task.route(Outer::counter_mut);
    assert_eq!(routed.label(), "increment");

    let mut outer = Outer::default();
    routed.commit(&mut outer).unwrap();
    assert_eq!(outer.counter.value, 1);
}

#[test]
fn test_task_moves_across_threads() {
    let task = UpdateTask::new("threaded", |counter: &mut Counter| {
        counter.value = 42;
        Ok(())
    });
    let task = std::thread::spawn(move || task).join().unwrap();

    let mut counter = Counter::default();
    task.commit(&mut counter).unwrap();
    assert_eq!(counter.value, 42);
}

#[test]
fn test_debug_shows_label() {
    let task = UpdateTask::new("icons: update camera", |_: &mut Counter| Ok(()));
    assert!(format!("{:?}", task).contains("icons: update camera"));
}
