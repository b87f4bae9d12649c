//! # Telemetry Flows
//!
//! Global subscriber installation. Kept to a single test because the
//! subscriber is process-wide.

#[cfg(test)]
mod tests {
    use agent_telemetry::{init_tracing, TelemetryConfig, TelemetryError};

    #[test]
    fn test_second_initialization_is_rejected() {
        let config = TelemetryConfig::default();

        assert!(init_tracing(&config).is_ok());

        assert_eq!(
            init_tracing(&config),
            Err(TelemetryError::AlreadyInitialized)
        );
    }
}
