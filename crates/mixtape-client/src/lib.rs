//! HTTP client for the Mixtape generation service.
//!
//! This crate provides:
//! - The [`Transport`] seam the workflow drives
//! - Multipart submission with byte-level upload progress
//! - Streamed JSON response with byte-level download progress
//! - Artifact retrieval and the health probe
//! - Status-code mapping to user-facing error classes

pub mod client;
pub mod config;
pub mod error;
pub mod transport;
mod upload;


pub use client::MixtapeClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use transport::{
    noop_sender, progress_channel, ProgressReceiver, ProgressSender, TransferEvent, Transport,
};
