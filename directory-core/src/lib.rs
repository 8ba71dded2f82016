//! directory-core: the host side of the server directory's content filter.
//!
//! [`bootstrap`] prepares a root directory, loads its config, reads the
//! verified banned-term catalog and compiles it into a shared
//! [`ModerationGate`]. Any failure there is fatal for the host process.

pub mod commands;
pub mod config;
pub mod services;
pub mod utils;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use content_filter::{read_verified_or_embedded, ContentFilter};

pub use commands::{ensure_initialized, ensure_initialized_once, InitReport};
pub use config::CoreConfig;
pub use services::{
    AuditLog, GateOutcome, ListingSubmission, ModerationGate, ModerationRecord, RejectReason,
    Registration,
};

/// Load the catalog configured for `cfg` and compile it.
pub fn load_filter(cfg: &CoreConfig) -> Result<ContentFilter> {
    let path = cfg.catalog_file();
    let text = read_verified_or_embedded(&path, &cfg.filter.catalog, cfg.filter.locked)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    ContentFilter::from_toml(&text)
        .with_context(|| format!("compiling catalog {}", path.display()))
}

/// Initialize `root`, load its config and catalog, and build the gate.
pub fn bootstrap(root: &Path) -> Result<ModerationGate> {
    let report = ensure_initialized(root)?;
    let filter = load_filter(&report.config)?;
    let audit = AuditLog::from_config(&report.config);
    Ok(ModerationGate::new(Arc::new(filter), audit))
}
