//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-mpeg`, `core-decode`, `core-runtime`). Host
//! applications can depend on `mp3-fastdecode` and enable the documented
//! features without needing to wire each crate individually.

pub use core_decode as decode;
pub use core_mpeg as mpeg;

#[cfg(feature = "logging")]
pub use core_runtime as runtime;
