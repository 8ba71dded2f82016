// directory-core/src/commands/init.rs

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use content_filter::write_default_catalog;

use crate::config::CoreConfig;

#[derive(Debug, Clone)]
pub struct InitReport {
    pub root: PathBuf,
    pub created: Vec<String>,
    pub existed: Vec<String>,
    pub config: CoreConfig,
}

// ---------- single global init gate ----------

static INIT: OnceCell<InitReport> = OnceCell::new();

/// Idempotent global initializer for the root named by `SERVERDIR_ROOT`.
/// Returns a &'static InitReport once initialization has completed.
pub fn ensure_initialized_once() -> Result<&'static InitReport> {
    INIT.get_or_try_init(|| ensure_initialized(&serverdir_root()))
}

/// Resolve the directory root. Allow override via SERVERDIR_ROOT (tests).
pub fn serverdir_root() -> PathBuf {
    std::env::var_os("SERVERDIR_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".serverdir"))
}

/// Create the on-disk layout under `root` (idempotent) and load its config.
pub fn ensure_initialized(root: &Path) -> Result<InitReport> {
    let root = root.to_path_buf();
    let mut created = Vec::new();
    let mut existed = Vec::new();

    ensure_dir(&root, "", &mut created, &mut existed)?;

    ensure_file(
        &root,
        "config.toml",
        Some(DEFAULT_CONFIG_TOML),
        &mut created,
        &mut existed,
    )?;

    let config = CoreConfig::load(&root)?;

    // Catalog directory + embedded default
    let filter_dir = config.filter.path.clone();
    ensure_dir(&filter_dir, "", &mut created, &mut existed)?;
    for name in write_default_catalog(&filter_dir)
        .with_context(|| format!("seeding catalog into {:?}", filter_dir))?
    {
        created.push(format!("filter/{name}"));
    }

    initialize_logbook(&config, &mut created, &mut existed)?;

    tracing::info!(
        root = %root.display(),
        created = created.len(),
        existed = existed.len(),
        "directory root initialized"
    );

    Ok(InitReport {
        root,
        created,
        existed,
        config,
    })
}

fn ensure_dir(
    base: &Path,
    rel: &str,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = if rel.is_empty() { base.to_path_buf() } else { base.join(rel) };
    let label = if rel.is_empty() { p.display().to_string() } else { rel.to_string() };
    if p.exists() {
        existed.push(label);
        return Ok(());
    }
    fs::create_dir_all(&p).with_context(|| format!("create_dir_all({:?})", p))?;
    created.push(label);
    Ok(())
}

fn ensure_file(
    base: &Path,
    rel_file: &str,
    content_if_absent: Option<&str>,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = base.join(rel_file);
    if p.exists() {
        existed.push(rel_file.to_string());
        return Ok(());
    }
    write_atomic(&p, content_if_absent.unwrap_or("").as_bytes())?;
    created.push(rel_file.to_string());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create_dir_all({:?})", parent))?;
    }
    let tmp = path.with_extension("tmp");
    {
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp)
            .with_context(|| format!("open temp file {:?}", tmp))?;
        f.write_all(bytes)?;
        f.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("rename {:?} -> {:?}", tmp, path))?;
    Ok(())
}

/// Create the moderation logbook, seeded with a `system_init` line.
fn initialize_logbook(
    config: &CoreConfig,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    ensure_dir(&config.logbook.path, "", created, existed)?;

    let p = &config.logbook.moderation;
    let label = "moderation log".to_string();
    if p.exists() && fs::metadata(p)?.len() > 0 {
        existed.push(label);
        return Ok(());
    }
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
    }
    let init_event = serde_json::json!({
        "ts": Utc::now().to_rfc3339(),
        "event": "system_init",
        "data": { "system": config.system.name, "version": config.system.version },
    });
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(p)
        .with_context(|| format!("open {:?}", p))?;
    writeln!(f, "{init_event}")?;
    created.push(label);
    Ok(())
}

// ---------- defaults ----------

const DEFAULT_CONFIG_TOML: &str = r#"[system]
name = "serverdir"
version = "0.1.0"

[filter]
path = "filter"
catalog = "banned_terms.toml"
locked = true

[logbook]
path = "logbook"
moderation = "logbook/moderation.jsonl"

[policies]
log_preview_len = 160
audit_accepted = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");

        let first = ensure_initialized(&root).unwrap();
        assert!(first.created.iter().any(|c| c == "config.toml"));
        assert!(first.created.iter().any(|c| c == "filter/banned_terms.toml"));
        assert!(root.join("filter/banned_terms.toml").exists());
        assert!(root.join("logbook/moderation.jsonl").exists());

        let second = ensure_initialized(&root).unwrap();
        assert!(second.created.is_empty(), "created again: {:?}", second.created);
        assert!(second.existed.iter().any(|c| c == "config.toml"));
    }

    #[test]
    fn moderation_log_outside_logbook_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("config.toml"),
            "[logbook]\nmoderation = \"audit/2026/moderation.jsonl\"\n",
        )
        .unwrap();

        let report = ensure_initialized(&root).unwrap();
        assert!(report.created.iter().any(|c| c == "moderation log"));
        let log = fs::read_to_string(root.join("audit/2026/moderation.jsonl")).unwrap();
        assert!(log.contains("system_init"));
    }

    #[test]
    fn default_config_parses_to_defaults() {
        let cfg: CoreConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(cfg.filter.catalog, "banned_terms.toml");
        assert!(cfg.filter.locked);
        assert!(!cfg.policies.audit_accepted);
    }
}
