//! Invoice upload orchestration
//!
//! - [`coordinator`] walks patients and files through the attachment pipeline
//! - [`summary`] run counters and per-file failures
//! - [`throttle`] fixed pause between files

pub mod coordinator;
pub mod summary;
pub mod throttle;

pub use coordinator::UploadCoordinator;
pub use summary::{FailureKind, UploadFailure, UploadSummary};
pub use throttle::RateLimiter;
