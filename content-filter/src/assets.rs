use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use crate::error::{FilterError, Result};

/// === Embedded default catalog ===
pub const BANNED_TERMS_TOML_NAME: &str = "banned_terms.toml";
pub const BANNED_TERMS_TOML: &str = include_str!("../assets/banned_terms.toml");

/// Return the embedded text for a known catalog file, if any.
pub fn default_catalog_text(name: &str) -> Option<&'static str> {
    match name {
        BANNED_TERMS_TOML_NAME => Some(BANNED_TERMS_TOML),
        _ => None,
    }
}

/// blake3 hex digest of a catalog's text, recorded alongside audit entries.
pub fn catalog_digest(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> FilterError + '_ {
    move |source| FilterError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Seed missing default catalogs into a destination directory (idempotent).
/// Returns the names of the files that were created.
pub fn write_default_catalog(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(io_err(dir))?;

    let mut created = Vec::new();

    for (name, text) in [(BANNED_TERMS_TOML_NAME, BANNED_TERMS_TOML)] {
        let path = dir.join(name);
        if !path.exists() {
            fs::write(&path, text).map_err(io_err(&path))?;
            created.push(name.to_string());
        }
    }

    Ok(created)
}

/// Verified reader with "locked" mode.
///
/// - If `path` exists and an embedded copy of `name` is known, the blake3
///   digests are compared:
///   - equal: the file is returned.
///   - different and `locked`: the file is overwritten with the embedded copy,
///     which is returned.
///   - different and not locked: the local edit wins.
/// - If `path` is missing and an embedded copy is known, it is written to disk
///   best-effort and returned.
/// - Unknown names fall back to reading the file, or an empty string.
pub fn read_verified_or_embedded(
    path: &Path,
    name: &str,
    locked: bool,
) -> Result<Cow<'static, str>> {
    let embedded_opt = default_catalog_text(name);

    if path.exists() {
        let file_text = fs::read_to_string(path).map_err(io_err(path))?;
        let Some(embedded) = embedded_opt else {
            return Ok(Cow::Owned(file_text));
        };
        if catalog_digest(&file_text) == catalog_digest(embedded) {
            return Ok(Cow::Owned(file_text));
        }
        if !locked {
            tracing::info!(path = %path.display(), "using locally edited catalog");
            return Ok(Cow::Owned(file_text));
        }
        tracing::warn!(path = %path.display(), "catalog differs from embedded copy; restoring");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }
        fs::write(path, embedded).map_err(io_err(path))?;
        return Ok(Cow::Borrowed(embedded));
    }

    match embedded_opt {
        Some(embedded) => {
            if let Some(dir) = path.parent() {
                let _ = fs::create_dir_all(dir);
            }
            // Caller still gets the embedded text if this write fails
            if let Err(e) = fs::write(path, embedded) {
                tracing::warn!(path = %path.display(), error = %e, "could not seed catalog");
            }
            Ok(Cow::Borrowed(embedded))
        }
        None => Ok(Cow::Owned(String::new())),
    }
}

/// Convenience: resolve `<root>/filter/<name>`
pub fn catalog_path(root: &Path, name: &str) -> PathBuf {
    root.join("filter").join(name)
}
