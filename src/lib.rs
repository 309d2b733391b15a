//! MobSF API client library.
//!
//! A Rust library and CLI for the Mobile Security Framework (MobSF) REST
//! API: upload an app binary, run a static-analysis scan, fetch PDF/JSON
//! reports, list and delete scans, and view decompiled sources.
//!
//! # Quick Start
//!
//! ```no_run
//! use mobsf_cli::MobsfClient;
//!
//! #[tokio::main]
//! async fn main() -> mobsf_cli::Result<()> {
//!     // Create client from environment variables
//!     let client = MobsfClient::from_env()?;
//!
//!     // Upload and scan an APK
//!     let upload = client.upload("app.apk").await?;
//!     let scan = client
//!         .scan(&upload.scan_type, &upload.file_name, &upload.hash, false)
//!         .await?;
//!     println!("Security score: {}/100", scan.security_score);
//!
//!     // Save the PDF report
//!     client.download_pdf_report(&upload.hash, "report.pdf").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every client operation fails with a [`MobsfError`] whose
//! [`cause`](MobsfError::cause) is one of the three [`ErrorCause`] kinds:
//! the call could not complete, a local file operation failed, or the server
//! answered with something other than a 200 carrying the expected payload.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `MOBSF_API_KEY` - Your MobSF API key (defaults to empty)
//! - `MOBSF_SERVER` - Server URL (defaults to `http://localhost:8000`)

pub mod app;
pub mod cli;
mod client;
pub mod config;
mod error;
pub mod logging;
mod models;
mod output;
mod retry;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{MobsfClient, UPLOAD_CHUNK_SIZE};
pub use config::ClientConfig;
pub use error::{ErrorCause, MobsfError, Result};
pub use retry::{retry_after, RetryPolicy};

// Re-export traits
pub use output::{PrettyPrint, ScanRow};
pub use traits::ScanService;

// Re-export models
pub use models::{
    decode,
    DeleteResult,
    ScanListEntry,
    ScanListResult,
    ScanResult,
    SourceViewResult,
    TrackerInfo,
    UploadResult,
    REPORT_CHUNK_SIZE,
};

// Re-export workflow types
pub use app::{App, AppError, OutputFormat, Thresholds};
