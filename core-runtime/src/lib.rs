//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for reachability monitoring:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Notification center for process-wide broadcasts
//! - Delivery queues consumer callbacks run on
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the monitoring crates depend on.
//! It establishes the logging conventions, the serial delivery contexts, and
//! the broadcast mechanism used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod queue;

pub use error::{Error, Result};
