//! Inspect the TLS certificates of a list of HTTPS sites and mail an expiry report.

pub mod checker;
pub mod cli;
pub mod error;
pub mod expiry;
pub mod inspector;
pub mod mailer;
pub mod report;
pub mod settings;
pub mod site;
pub mod tls;

pub use error::Error;
