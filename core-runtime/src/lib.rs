//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the decode crates and the binaries that
//! host them.
//!
//! ## Overview
//!
//! - [`logging`]: `tracing-subscriber` setup from a serializable
//!   [`LoggingConfig`](logging::LoggingConfig), plus log-safe helpers.
//! - [`error`]: failures raised while configuring the runtime.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
