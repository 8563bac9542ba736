//! Service-specific tests
//!
//! These run the real implementations against the host: external listing and
//! kill commands, and a local HTTP server for the readiness requests.


// Common test utilities for services
pub mod common {
    use std::time::Duration;

    /// Generous upper bound for one readiness request in tests
    pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);
}
