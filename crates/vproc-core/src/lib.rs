//! Video processing request core.
//!
//! This crate provides:
//! - The use cases: submit, status updates, download authorization,
//!   status queries and retry
//! - Upload policy and content sniffing
//! - Configuration, fault types, metrics and tracing setup

pub mod config;
pub mod detect;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod owners;
pub mod policy;
pub mod processing;
pub mod services;

pub use config::CoreConfig;
pub use detect::{normalize_content_type, ContentTypeDetector, MagicByteDetector};
pub use error::{CoreError, CoreResult};
pub use logging::{init_tracing, RequestLogger};
pub use owners::{OwnerDirectory, StaticOwnerDirectory};
pub use policy::UploadPolicy;
pub use processing::ProcessingCore;
pub use services::{
    Collaborators, DownloadGrant, DownloadService, QueryService, RetryService, StatusChange,
    StatusUpdate, StatusUpdateService, SubmitReceipt, SubmitService, SubmitUpload,
};
