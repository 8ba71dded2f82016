//! services/audit.rs
//! Moderation logbook: one JSONL record per gate decision worth keeping.
//!
//! - Writes to `<root>/logbook/moderation.jsonl` by default.
//! - Stores only a preview of the submitted text; passwords never reach here.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::utils::logbook::{append_jsonl, preview, read_jsonl};

/// A normalized record of a single moderation decision.
///
/// # Fields
/// - `id` — Random v4 identifier.
/// - `timestamp` — When the decision was recorded.
/// - `action` — `"listing"` or `"registration"`.
/// - `field` — Submission field that triggered the decision, if any.
/// - `outcome` — `"accepted"` or `"rejected"`.
/// - `reason` — Rejection code (e.g. `"inappropriate_content"`), if rejected.
/// - `matched_term` / `matched_kind` — Pattern that fired, if any.
/// - `input_preview` — Truncated copy of the offending field.
/// - `catalog_digest` — blake3 digest of the catalog in force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_kind: Option<String>,
    #[serde(default)]
    pub input_preview: String,
    #[serde(default)]
    pub catalog_digest: String,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    preview_len: usize,
    audit_accepted: bool,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>, preview_len: usize) -> Self {
        Self {
            path: path.into(),
            preview_len,
            audit_accepted: false,
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self {
            path: cfg.logbook.moderation.clone(),
            preview_len: cfg.policies.log_preview_len,
            audit_accepted: cfg.policies.audit_accepted,
        }
    }

    pub fn with_accepted(mut self, on: bool) -> Self {
        self.audit_accepted = on;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn audits_accepted(&self) -> bool {
        self.audit_accepted
    }

    pub fn preview(&self, text: &str) -> String {
        preview(text, self.preview_len)
    }

    pub fn record(&self, record: &ModerationRecord) -> Result<()> {
        append_jsonl(&self.path, record)
    }

    /// All moderation records, oldest first. Non-record lines such as the
    /// `system_init` seed are skipped.
    pub fn read_all(&self) -> Result<Vec<ModerationRecord>> {
        let rows: Vec<serde_json::Value> = read_jsonl(&self.path)?;
        Ok(rows
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    /// Most recent `limit` records, oldest first.
    pub fn tail(&self, limit: usize) -> Result<Vec<ModerationRecord>> {
        let mut all = self.read_all()?;
        let skip = all.len().saturating_sub(limit);
        Ok(all.split_off(skip))
    }
}
