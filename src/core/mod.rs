// src/core/mod.rs
//! Shared plumbing: file system access and the HTTP client used by every external service

pub mod fs_ops;
pub mod service_client;

pub use fs_ops::FsOps;
pub use service_client::ServiceClient;
