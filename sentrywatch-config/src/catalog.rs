// sentrywatch-config/src/catalog.rs
// ============================================================================
// Module: Sentrywatch Rule Catalog Discovery
// Description: Walks a catalog directory and loads every rule document in it.
// Purpose: Turn a directory on disk into a validated Vec<Rule>.
// Dependencies: sentrywatch-core, tracing
// ============================================================================

//! ## Overview
//! The rule catalog is a directory of YAML documents, one rule per file,
//! organized into arbitrary subdirectories. [`load_catalog`] walks the
//! directory recursively, derives each document's stable id from its
//! catalog-relative path, and parses it with
//! [`sentrywatch_core::parse_rule_document`]. A malformed document is logged
//! and skipped; it never aborts the rest of the catalog load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use sentrywatch_core::Rule;
use sentrywatch_core::derive_rule_id;
use sentrywatch_core::parse_rule_document;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures walking the catalog directory itself. A per-document parse
/// failure is not represented here — it is logged and skipped instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog directory (or a directory beneath it) could not be read.
    #[error("failed to read catalog directory {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error message.
        source: String,
    },
    /// A discovered path's relative form could not be expressed as UTF-8
    /// or normalized against the catalog root.
    #[error("catalog entry {0} has a non-UTF-8 or unroot-able path")]
    InvalidEntryPath(String),
}

// ============================================================================
// SECTION: Catalog Loading
// ============================================================================

/// Walks `catalog_dir` recursively and parses every `.yaml`/`.yml` document
/// found beneath it into a [`Rule`], keyed by its derived rule id.
///
/// # Errors
///
/// Returns [`CatalogError`] when the directory tree itself cannot be
/// traversed. Individual malformed rule documents are logged via
/// `tracing::warn!` and excluded from the result rather than failing the
/// whole load.
pub fn load_catalog(catalog_dir: &Path) -> Result<BTreeMap<String, Rule>, CatalogError> {
    let mut relative_paths = Vec::new();
    collect_rule_paths(catalog_dir, catalog_dir, &mut relative_paths)?;

    let mut rules = BTreeMap::new();
    for relative in relative_paths {
        let absolute = catalog_dir.join(&relative);
        let raw = match fs::read_to_string(&absolute) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %relative, error = %err, "skipping unreadable rule document");
                continue;
            }
        };
        let id = derive_rule_id(&relative);
        match parse_rule_document(id, &raw) {
            Ok(rule) => {
                rules.insert(rule.id.as_str().to_string(), rule);
            }
            Err(err) => {
                tracing::warn!(path = %relative, error = %err, "skipping malformed rule document");
            }
        }
    }
    Ok(rules)
}

/// Recursively collects catalog-relative paths of `.yaml`/`.yml` files
/// beneath `current`, rooted at `root`.
fn collect_rule_paths(
    root: &Path,
    current: &Path,
    paths: &mut Vec<String>,
) -> Result<(), CatalogError> {
    let entries = fs::read_dir(current).map_err(|err| CatalogError::Io {
        path: current.display().to_string(),
        source: err.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| CatalogError::Io {
            path: current.display().to_string(),
            source: err.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_rule_paths(root, &path, paths)?;
        } else if path.is_file() && has_yaml_extension(&path) {
            let relative = path
                .strip_prefix(root)
                .map_err(|_| CatalogError::InvalidEntryPath(path.display().to_string()))?;
            let text = relative
                .to_str()
                .ok_or_else(|| CatalogError::InvalidEntryPath(path.display().to_string()))?;
            paths.push(text.replace('\\', "/"));
        }
    }
    Ok(())
}

/// True when `path`'s extension is `yaml` or `yml` (case-insensitive).
fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::load_catalog;

    const VALID_RULE: &str = r#"
name: Impossible Travel
description: Sign-in from two distant locations in a short window.
severity: High
enabled: true
source: SignIn
conditions:
  match: all
  rules:
    - field: riskLevel
      operator: equals
      value: high
"#;

    #[test]
    fn loads_rules_from_nested_directories() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("signin")).expect("create subdir");
        fs::write(dir.path().join("signin").join("impossible-travel.yaml"), VALID_RULE)
            .expect("write rule");

        let rules = load_catalog(dir.path()).expect("catalog should load");
        assert_eq!(rules.len(), 1);
        assert!(rules.contains_key("signin/impossible-travel"));
    }

    #[test]
    fn skips_malformed_documents_without_failing_the_load() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("good.yaml"), VALID_RULE).expect("write good rule");
        fs::write(dir.path().join("bad.yaml"), "not: [a, valid, rule").expect("write bad rule");

        let rules = load_catalog(dir.path()).expect("catalog should still load");
        assert_eq!(rules.len(), 1);
        assert!(rules.contains_key("good"));
    }

    #[test]
    fn ignores_non_yaml_files() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("good.yaml"), VALID_RULE).expect("write good rule");
        fs::write(dir.path().join("README.md"), "not a rule").expect("write readme");

        let rules = load_catalog(dir.path()).expect("catalog should load");
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn empty_catalog_directory_yields_no_rules() {
        let dir = tempdir().expect("tempdir");
        let rules = load_catalog(dir.path()).expect("empty catalog should load");
        assert!(rules.is_empty());
    }
}
