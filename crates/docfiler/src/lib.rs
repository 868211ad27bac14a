//! `docfiler` - a digital document filing system
//!
//! Stores office documents (gate passes, invoices, job cards and the like)
//! as typed records with a generated human-readable document id, and offers
//! search, dashboard statistics and a JSON HTTP API over the collection.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod docid;
pub mod document;
pub mod error;
pub mod http;
pub mod logging;
pub mod registry;
pub mod search;
pub mod service;
pub mod storage;

pub use config::Config;
pub use dashboard::DashboardStats;
pub use document::{DocumentPayload, DocumentRecord, Status};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use search::SearchCriteria;
pub use service::DocumentService;
