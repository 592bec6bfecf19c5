// src/services/telemetry.rs
// DOCUMENTATION: Error telemetry collaborator
// PURPOSE: Fire-and-forget exception capture at pipeline boundaries

use crate::errors::GalleryError;

/// Fire-and-forget exception sink. Never awaited for correctness;
/// implementations must not fail the caller.
pub trait ErrorReporter: Send + Sync {
    fn capture_exception(&self, error: &GalleryError);
}

/// Log-backed reporter used in production
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn capture_exception(&self, error: &GalleryError) {
        log::error!("Captured exception: {}", error);
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts captures so tests can assert telemetry delivery
    #[derive(Default)]
    pub struct CountingReporter {
        pub captured: AtomicUsize,
    }

    impl CountingReporter {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl ErrorReporter for CountingReporter {
        fn capture_exception(&self, _error: &GalleryError) {
            self.captured.fetch_add(1, Ordering::SeqCst);
        }
    }
}
