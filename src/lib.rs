#![forbid(unsafe_code)]

//! NutriScan training console backend.
//!
//! Tracks externally executed Colab training sessions, renders their
//! notebook documents, and persists datasets, model versions, and
//! aggregate stats as JSON document collections.

pub mod clients;
pub mod config;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod notebook;
pub mod store;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
