// src/services/mod.rs

pub mod audit;  // moderation logbook (JSONL)
pub mod gate;   // listing + registration checks

// Public API
pub use audit::{AuditLog, ModerationRecord};
pub use gate::{GateOutcome, ListingSubmission, ModerationGate, RejectReason, Registration};
