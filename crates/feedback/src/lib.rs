//! `feedback` - A minimal feedback collection service
//!
//! This library accepts feedback submissions over HTTP, persists them in
//! `SQLite`, and serves the most recent ones back as JSON.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Feedback, FeedbackInput, FeedbackRepresentation, NewFeedback};
pub use server::{build_router, AppState};
pub use storage::Storage;
