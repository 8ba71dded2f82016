use std::fs;
use std::sync::Arc;

use content_filter::ContentFilter;
use directory_core::{
    bootstrap, AuditLog, GateOutcome, ListingSubmission, ModerationGate, RejectReason,
    Registration,
};

// ----------------------- Helpers --------------------------

fn listing(name: &str, description: &str, tags: Option<&str>) -> ListingSubmission {
    ListingSubmission {
        name: name.to_string(),
        invite: "https://discord.gg/abc123".to_string(),
        description: description.to_string(),
        tags: tags.map(str::to_string),
    }
}

fn registration(username: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: "hunter2".to_string(),
    }
}

fn gate_in(dir: &tempfile::TempDir) -> ModerationGate {
    let filter = ContentFilter::builtin().expect("builtin");
    let audit = AuditLog::new(dir.path().join("moderation.jsonl"), 16);
    ModerationGate::new(Arc::new(filter), audit)
}

// ----------------------- Tests ----------------------------

#[test]
fn clean_listing_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let gate = gate_in(&dir);
    let outcome = gate.check_listing(&listing(
        "Cool Gamers",
        "A chill Discord for friends",
        Some("gaming, chill"),
    ));
    assert_eq!(outcome, GateOutcome::Accepted);
    assert_eq!(outcome.message(), None);
    // Acceptances are not logged by default
    assert!(gate.audit().read_all().unwrap().is_empty());
}

#[test]
fn listing_with_banned_description_is_rejected_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let gate = gate_in(&dir);
    let outcome = gate.check_listing(&listing("Cool Gamers", "no sh1t allowed", None));
    assert_eq!(
        outcome,
        GateOutcome::Rejected(RejectReason::InappropriateContent)
    );
    assert_eq!(outcome.message(), Some("Inappropriate content blocked"));

    let records = gate.audit().read_all().unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.action, "listing");
    assert_eq!(r.field.as_deref(), Some("description"));
    assert_eq!(r.outcome, "rejected");
    assert_eq!(r.reason.as_deref(), Some("inappropriate_content"));
    assert_eq!(r.matched_term.as_deref(), Some("shit"));
    assert_eq!(r.matched_kind.as_deref(), Some("profanity"));
    assert_eq!(r.input_preview, "no sh1t allowed");
    assert_eq!(r.catalog_digest, gate.filter().digest());
}

#[test]
fn banned_tags_reject_the_listing() {
    let dir = tempfile::tempdir().unwrap();
    let gate = gate_in(&dir);
    let outcome = gate.check_listing(&listing("Retro games", "Old consoles", Some("nsfw, p0rn")));
    assert_eq!(
        outcome,
        GateOutcome::Rejected(RejectReason::InappropriateContent)
    );
    let records = gate.audit().read_all().unwrap();
    assert_eq!(records[0].field.as_deref(), Some("tags"));
}

#[test]
fn missing_fields_short_circuit_the_filter() {
    let dir = tempfile::tempdir().unwrap();
    let gate = gate_in(&dir);
    let mut l = listing("fuck", "", None);
    assert_eq!(
        gate.check_listing(&l),
        GateOutcome::Rejected(RejectReason::MissingFields)
    );
    l.description = "ok".into();
    l.invite = "   ".into();
    assert_eq!(gate.check_listing(&l).message(), Some("Missing fields"));
    assert!(gate.audit().read_all().unwrap().is_empty());
}

#[test]
fn offensive_username_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gate = gate_in(&dir);
    let outcome = gate.check_registration(&registration("fuckface"));
    assert_eq!(
        outcome,
        GateOutcome::Rejected(RejectReason::OffensiveUsername)
    );
    assert_eq!(outcome.message(), Some("Choose a different username"));
    assert!(gate.check_registration(&registration("friendly_gamer")).is_accepted());

    let mut no_password = registration("friendly_gamer");
    no_password.password.clear();
    assert_eq!(
        gate.check_registration(&no_password),
        GateOutcome::Rejected(RejectReason::MissingFields)
    );
}

#[test]
fn audit_log_never_contains_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let gate = gate_in(&dir);
    gate.check_registration(&registration("b1tch"));
    let raw = fs::read_to_string(gate.audit().path()).unwrap();
    assert!(!raw.contains("hunter2"));
    assert!(format!("{:?}", registration("x")).contains("<redacted>"));
}

#[test]
fn accepted_submissions_are_logged_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let filter = ContentFilter::builtin().unwrap();
    let audit = AuditLog::new(dir.path().join("m.jsonl"), 160).with_accepted(true);
    let gate = ModerationGate::new(Arc::new(filter), audit);

    gate.check_registration(&registration("friendly_gamer"));
    let records = gate.audit().read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, "accepted");
    assert!(records[0].reason.is_none());
}

#[test]
fn bootstrap_builds_a_working_gate() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join(".serverdir");
    let gate = bootstrap(&root).unwrap();

    assert!(root.join("config.toml").exists());
    assert!(root.join("filter/banned_terms.toml").exists());
    assert!(gate.check_registration(&registration("fuckface")).message().is_some());

    let records = gate.audit().read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(gate.audit().path(), root.join("logbook/moderation.jsonl"));
}

#[test]
fn bootstrap_restores_a_tampered_locked_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    bootstrap(&root).unwrap();

    let catalog = root.join("filter/banned_terms.toml");
    fs::write(&catalog, "name = \"empty\"\nversion = \"0\"\n").unwrap();

    let gate = bootstrap(&root).unwrap();
    assert!(gate.filter().contains_banned_words("sh1t"));
    assert!(fs::read_to_string(&catalog).unwrap().contains("[[category]]"));
}

#[test]
fn bootstrap_fails_on_a_broken_unlocked_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("config.toml"), "[filter]\nlocked = false\n").unwrap();
    bootstrap(&root).unwrap();

    fs::write(
        root.join("filter/banned_terms.toml"),
        "name = \"local\"\nversion = \"1\"\n\n[[category]]\nname = \"profanity\"\nterms = [\"\"]\n",
    )
    .unwrap();
    let err = bootstrap(&root).unwrap_err();
    assert!(format!("{err:#}").contains("compiling catalog"));
}

#[test]
fn unlocked_local_catalog_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("config.toml"), "[filter]\nlocked = false\n").unwrap();
    bootstrap(&root).unwrap();

    fs::write(
        root.join("filter/banned_terms.toml"),
        "name = \"local\"\nversion = \"1\"\n\n[[category]]\nname = \"profanity\"\nterms = [\"heck\"]\n",
    )
    .unwrap();
    let gate = bootstrap(&root).unwrap();
    assert!(gate.filter().contains_banned_words("h3ck"));
    assert!(!gate.filter().contains_banned_words("sh1t"));
    assert_eq!(gate.filter().name(), "local");
}
