//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_allocation_failure_display() {
    let err = Error::AllocationFailure("staging buffer of 4096 bytes".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Allocation failure"));
    assert!(display.contains("4096 bytes"));
}

#[test]
fn test_invalid_range_display() {
    let err = Error::InvalidRange { first: 4, last: 9, count: 8 };
    assert_eq!(format!("{}", err), "Invalid range: [4, 9] for 8 elements");
}

#[test]
fn test_stale_handle_display() {
    let err = Error::StaleHandle("position buffer".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Stale handle"));
    assert!(display.contains("position buffer"));
}

#[test]
fn test_driver_call_failure_display() {
    let err = Error::DriverCallFailure("vkQueueSubmit returned ERROR_DEVICE_LOST".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Driver call failure"));
    assert!(display.contains("ERROR_DEVICE_LOST"));
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("vertex staging buffer".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("vertex staging buffer"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("no swapchain bound".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("no swapchain bound"));
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[test]
fn test_retryable_errors() {
    assert!(Error::DriverCallFailure("x".to_string()).is_retryable());
    assert!(Error::StaleHandle("x".to_string()).is_retryable());
    assert!(Error::InvalidResource("x".to_string()).is_retryable());

    assert!(!Error::AllocationFailure("x".to_string()).is_retryable());
    assert!(!Error::InvalidRange { first: 0, last: 1, count: 1 }.is_retryable());
    assert!(!Error::InitializationFailed("x".to_string()).is_retryable());
}

#[test]
fn test_only_allocation_failure_is_fatal() {
    assert!(Error::AllocationFailure("x".to_string()).is_fatal());
    assert!(!Error::DriverCallFailure("x".to_string()).is_fatal());
    assert!(!Error::StaleHandle("x".to_string()).is_fatal());
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::StaleHandle("x".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Error::InvalidRange { first: 1, last: 2, count: 3 });
    assert!(debug.contains("InvalidRange"));
    assert!(debug.contains("first: 1"));
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::DriverCallFailure("copy".to_string());
    assert_eq!(err.clone(), err);
}

#[test]
fn test_result_propagation() {
    fn inner() -> Result<u32> {
        Err(Error::InvalidResource("missing".to_string()))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }
    assert_eq!(outer(), Err(Error::InvalidResource("missing".to_string())));
}
