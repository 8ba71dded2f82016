//! services/gate.rs
//! Moderation gate at the two points where user text enters the directory:
//! new server listings and new user registrations.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use content_filter::{ContentFilter, FilterMatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::audit::{AuditLog, ModerationRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingSubmission {
    pub name: String,
    pub invite: String,
    pub description: String,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Clone, Default, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingFields,
    InappropriateContent,
    OffensiveUsername,
}

impl RejectReason {
    /// Text shown back to the submitting user.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::MissingFields => "Missing fields",
            RejectReason::InappropriateContent => "Inappropriate content blocked",
            RejectReason::OffensiveUsername => "Choose a different username",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingFields => "missing_fields",
            RejectReason::InappropriateContent => "inappropriate_content",
            RejectReason::OffensiveUsername => "offensive_username",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl GateOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateOutcome::Accepted)
    }

    /// User-visible message for a rejection.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            GateOutcome::Accepted => None,
            GateOutcome::Rejected(r) => Some(r.message()),
        }
    }
}

/// Host-side wrapper around a shared [`ContentFilter`].
///
/// The filter is compiled once at startup and never mutated, so a gate can be
/// cloned freely into request handlers.
#[derive(Debug, Clone)]
pub struct ModerationGate {
    filter: Arc<ContentFilter>,
    audit: AuditLog,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl ModerationGate {
    pub fn new(filter: Arc<ContentFilter>, audit: AuditLog) -> Self {
        Self { filter, audit }
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Check a new server listing. Name, description and tags go through the
    /// filter in that order; absent tags are checked as an empty string.
    pub fn check_listing(&self, listing: &ListingSubmission) -> GateOutcome {
        if is_blank(&listing.name)
            || is_blank(&listing.invite)
            || is_blank(&listing.description)
        {
            return GateOutcome::Rejected(RejectReason::MissingFields);
        }

        let fields = [
            ("name", listing.name.as_str()),
            ("description", listing.description.as_str()),
            ("tags", listing.tags.as_deref().unwrap_or("")),
        ];
        for (field, text) in fields {
            if let Some(hit) = self.filter.find_match(text) {
                let outcome = GateOutcome::Rejected(RejectReason::InappropriateContent);
                self.log("listing", Some(field), text, outcome, Some(&hit));
                return outcome;
            }
        }

        if self.audit.audits_accepted() {
            self.log("listing", None, &listing.name, GateOutcome::Accepted, None);
        }
        GateOutcome::Accepted
    }

    /// Check a new registration. Only the username is filtered.
    pub fn check_registration(&self, registration: &Registration) -> GateOutcome {
        if is_blank(&registration.username) || registration.password.is_empty() {
            return GateOutcome::Rejected(RejectReason::MissingFields);
        }

        if let Some(hit) = self.filter.find_match(registration.username.as_str()) {
            let outcome = GateOutcome::Rejected(RejectReason::OffensiveUsername);
            self.log(
                "registration",
                Some("username"),
                &registration.username,
                outcome,
                Some(&hit),
            );
            return outcome;
        }

        if self.audit.audits_accepted() {
            self.log(
                "registration",
                Some("username"),
                &registration.username,
                GateOutcome::Accepted,
                None,
            );
        }
        GateOutcome::Accepted
    }

    fn log(
        &self,
        action: &str,
        field: Option<&str>,
        text: &str,
        outcome: GateOutcome,
        hit: Option<&FilterMatch>,
    ) {
        let reason = match outcome {
            GateOutcome::Accepted => None,
            GateOutcome::Rejected(r) => Some(r.as_str().to_string()),
        };
        if let Some(r) = &reason {
            tracing::info!(
                action,
                field = field.unwrap_or("-"),
                reason = %r,
                "submission rejected"
            );
        }
        let record = ModerationRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action: action.to_string(),
            field: field.map(str::to_string),
            outcome: if outcome.is_accepted() { "accepted" } else { "rejected" }.to_string(),
            reason,
            matched_term: hit.map(|h| h.term.clone()),
            matched_kind: hit.map(|h| h.kind.to_string()),
            input_preview: self.audit.preview(text),
            catalog_digest: self.filter.digest().to_string(),
        };
        // Audit failures never change the gate's answer
        if let Err(e) = self.audit.record(&record) {
            tracing::warn!(
                error = %e,
                path = %self.audit.path().display(),
                "failed to write moderation record"
            );
        }
    }
}
