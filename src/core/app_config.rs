// Application Configuration
// Defaults compiled from config.yaml at build time
// Modify config.yaml and rebuild to change these values

// Include the auto-generated config from build.rs
pub mod compiled {
    include!(concat!(env!("OUT_DIR"), "/compiled_config.rs"));
}

/// Built-in defaults for folder-mirror
/// Values are compiled in from config.yaml at build time
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Reconciliation defaults
    pub sync: SyncDefaults,

    /// Action log and diagnostics defaults
    pub logging: LoggingDefaults,
}

#[derive(Debug, Clone)]
pub struct SyncDefaults {
    /// Seconds between the end of one cycle and the start of the next
    pub interval_secs: u64,

    /// Bytes read per chunk when fingerprinting
    pub chunk_size: usize,

    /// Record per-path failures instead of aborting the cycle
    pub continue_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingDefaults {
    /// Echo action-log lines to stdout
    pub mirror_stdout: bool,

    /// Tracing filter used when RUST_LOG is unset
    pub filter: String,
}

impl Default for SyncDefaults {
    fn default() -> Self {
        Self {
            interval_secs: compiled::INTERVAL_SECS,
            chunk_size: compiled::CHUNK_SIZE,
            continue_on_error: compiled::CONTINUE_ON_ERROR,
        }
    }
}

impl Default for LoggingDefaults {
    fn default() -> Self {
        Self {
            mirror_stdout: compiled::MIRROR_STDOUT,
            filter: compiled::LOG_FILTER.to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync: SyncDefaults::default(),
            logging: LoggingDefaults::default(),
        }
    }
}
