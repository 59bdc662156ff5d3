//! Logging utilities for gridmap.
//!
//! This module provides structured logging helpers so a run leaves a
//! searchable trail of what was loaded and rendered.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A second initialisation (e.g. from tests) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation failed"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = Uuid::new_v4();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log detailed information about a loaded grid
pub fn log_grid_load_stats(
    file_path: &str,
    rows: usize,
    num_lon: usize,
    num_lat: usize,
    value_range: Option<(f64, f64)>,
    missing: usize,
) {
    let (min_value, max_value) = value_range.unwrap_or((f64::NAN, f64::NAN));
    info!(
        operation = "grid_load",
        file_path = file_path,
        rows = rows,
        num_lon = num_lon,
        num_lat = num_lat,
        min_value = min_value,
        max_value = max_value,
        missing = missing,
        "Grid loaded successfully"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::GridMapError, context: &str) {
    error!(
        error = %error,
        context = context,
        data_shape = error.is_data_shape_error(),
        "Error occurred"
    );
}
