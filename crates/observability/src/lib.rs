//! Process-wide logging setup shared by the binaries.

/// Initialize tracing/logging once for the process.
///
/// Later calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filter, JSON layer).
pub mod tracing;
