//! Example demonstrating the Aegis logging system
//!
//! This example shows how to:
//! - Initialize structured logging
//! - Use logging macros
//! - Configure local JSON file logging
//!
//! Run with:
//! ```bash
//! cargo run --example logging_demo
//! ```

use aegis::config::LoggingConfig;
use aegis::domain::ids::RunId;
use aegis::logging::init_logging;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a logging configuration with file logging enabled
    let config = LoggingConfig {
        local_enabled: true,
        local_path: "/tmp/aegis_example".to_string(),
        local_rotation: "daily".to_string(),
        local_max_size_mb: 100,
    };

    // Initialize logging (keep the guard alive for the duration of the program)
    let _guard = init_logging("debug", &config)?;

    // Log some basic messages
    tracing::info!("Aegis logging example started");
    tracing::debug!("This is a debug message");
    tracing::warn!("This is a warning message");

    // Use structured logging with fields
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = "development",
        "Application initialized"
    );

    // Demonstrate run lifecycle macros
    let run_id = RunId::generate();
    aegis::log_run_start!(&run_id, "MAIN_CAMPUS");

    // Simulate some work
    std::thread::sleep(Duration::from_millis(100));

    // Log record progress
    aegis::log_record_progress!(50, 100);

    // Simulate more work
    std::thread::sleep(Duration::from_millis(100));

    aegis::log_record_progress!(100, 100);

    // Demonstrate retry logging
    aegis::log_retry_attempt!(1, 7, "Peer out of resources");

    // Demonstrate error logging
    let error = aegis::domain::AegisError::Configuration("Example error".to_string());
    aegis::log_error_with_context!(&error, "Demonstrating error logging");

    // Log completion
    let duration = Duration::from_millis(200);
    aegis::log_run_complete!(99, 1, duration);

    // Log with correlation ID
    let correlation_id = uuid::Uuid::new_v4();
    tracing::info!(
        correlation_id = %correlation_id,
        operation = "backup",
        "Operation completed with correlation ID"
    );

    tracing::info!("Aegis logging example completed");

    println!("\n✅ Logging example completed successfully!");
    println!("📁 Check logs in: /tmp/aegis_example/aegis.log");
    println!("💡 Logs are in JSON format for production use");

    Ok(())
}
