//! Unit tests for task_queue.rs

use std::sync::Arc;
use std::thread;

use crate::error::Error;
use crate::task::{task_queue, DrainReport, UpdateTask};

fn push(value: u32) -> UpdateTask<Vec<u32>> {
    UpdateTask::new(format!("push {}", value), move |log: &mut Vec<u32>| {
        log.push(value);
        Ok(())
    })
}

#[test]
fn test_drain_commits_in_submission_order() {
    let (sender, receiver) = task_queue();
    for value in 0..5 {
        sender.send(push(value)).unwrap();
    }
    assert_eq!(receiver.pending(), 5);

    let mut log = Vec::new();
    let report = receiver.drain(&mut log);

    assert_eq!(report, DrainReport { committed: 5, failed: 0, error: None });
    assert_eq!(log, vec![0, 1, 2, 3, 4]);
    assert_eq!(receiver.pending(), 0);
}

#[test]
fn test_failed_task_does_not_stop_the_drain() {
    let (sender, receiver) = task_queue();
    sender.send(push(1)).unwrap();
    sender
        .send(UpdateTask::new("broken", |_: &mut Vec<u32>| {
            Err(Error::DriverCallFailure("staging write".to_string()))
        }))
        .unwrap();
    sender.send(push(2)).unwrap();

    let mut log = Vec::new();
    let report = receiver.drain(&mut log);

    assert_eq!(report.committed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.error, Some(Error::DriverCallFailure("staging write".to_string())));
    assert_eq!(report.total(), 3);
    assert_eq!(log, vec![1, 2]);
}

#[test]
fn test_drain_reports_fatal_failure_over_earlier_retryable_one() {
    let (sender, receiver) = task_queue();
    sender
        .send(UpdateTask::new("copy", |_: &mut Vec<u32>| {
            Err(Error::DriverCallFailure("queue busy".to_string()))
        }))
        .unwrap();
    sender
        .send(UpdateTask::new("allocate", |_: &mut Vec<u32>| {
            Err(Error::AllocationFailure("out of device memory".to_string()))
        }))
        .unwrap();
    sender
        .send(UpdateTask::new("copy again", |_: &mut Vec<u32>| {
            Err(Error::DriverCallFailure("queue busy".to_string()))
        }))
        .unwrap();
    sender.send(push(3)).unwrap();

    let mut log = Vec::new();
    let report = receiver.drain(&mut log);

    assert_eq!(report.failed, 3);
    assert_eq!(report.committed, 1);
    assert_eq!(report.error, Some(Error::AllocationFailure("out of device memory".to_string())));
    assert_eq!(log, vec![3]);
}

#[test]
fn test_tasks_sent_during_drain_wait_for_next_drain() {
    let (sender, receiver) = task_queue::<Vec<u32>>();
    let sender = Arc::new(sender);

    let inner = Arc::clone(&sender);
    sender
        .send(UpdateTask::new("resend", move |log: &mut Vec<u32>| {
            log.push(1);
            inner.send(push(2))
        }))
        .unwrap();

    let mut log = Vec::new();
    assert_eq!(receiver.drain(&mut log).committed, 1);
    assert_eq!(log, vec![1]);
    assert_eq!(receiver.pending(), 1);

    assert_eq!(receiver.drain(&mut log).committed, 1);
    assert_eq!(log, vec![1, 2]);
}

#[test]
fn test_empty_drain_reports_nothing() {
    let (_sender, receiver) = task_queue::<Vec<u32>>();
    let mut log = Vec::new();
    assert_eq!(receiver.drain(&mut log), DrainReport::default());
}

#[test]
fn test_send_fails_after_receiver_dropped() {
    let (sender, receiver) = task_queue::<Vec<u32>>();
    assert!(sender.is_connected());
    drop(receiver);

    assert!(!sender.is_connected());
    assert!(matches!(sender.send(push(1)), Err(Error::InvalidResource(_))));
}

#[test]
fn test_order_preserved_across_threads() {
    let (sender, receiver) = task_queue();
    let producer = thread::spawn(move || {
        for value in 0..1000 {
            sender.send(push(value)).unwrap();
        }
    });

    let mut log = Vec::new();
    while log.len() < 1000 {
        receiver.drain(&mut log);
        thread::yield_now();
    }
    producer.join().unwrap();

    assert_eq!(log, (0..1000).collect::<Vec<_>>());
}
