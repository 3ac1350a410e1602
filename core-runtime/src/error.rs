use std::time::Duration;
use thiserror::Error;

/// Failures raised while setting up the runtime around the monitors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Poll interval {}ms is below the {}ms minimum", .requested.as_millis(), .minimum.as_millis())]
    PollIntervalTooShort { requested: Duration, minimum: Duration },

    #[error("No {capability} primitive available: {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Failed to start delivery queue {label}: {message}")]
    QueueSpawn { label: String, message: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
