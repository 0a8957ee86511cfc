//! YAML persistence of the registry.
//!
//! # Storage layout
//!
//! ```text
//! ~/.repodeck/            (mode 0700)
//!   repos.yaml            (the registry: mode 0600, replaced wholesale)
//!   active.yaml           (label of the active entry: mode 0600)
//!   config.yaml           (see `crate::config`)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::types::{Entry, Label, Registry};
use crate::validate::{check_on_disk, check_registry};

pub const REGISTRY_FILE: &str = "repos.yaml";
pub const ACTIVE_FILE: &str = "active.yaml";
pub const FORMAT_VERSION: u32 = 1;

/// On-disk shape of `repos.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub version: u32,
    #[serde(default)]
    pub repos: Vec<Entry>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ActiveFile {
    label: Label,
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.repodeck/`: pure, no I/O.
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".repodeck")
}

/// `<home>/.repodeck/`, created with mode `0700` if it does not yet exist.
pub fn ensure_root_at(home: &Path) -> Result<PathBuf, RegistryError> {
    let dir = root_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.repodeck/repos.yaml`: pure, no I/O.
pub fn registry_path_at(home: &Path) -> PathBuf {
    root_at(home).join(REGISTRY_FILE)
}

/// `<home>/.repodeck/active.yaml`: pure, no I/O.
pub fn active_path_at(home: &Path) -> PathBuf {
    root_at(home).join(ACTIVE_FILE)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the registry from `<home>/.repodeck/repos.yaml`.
///
/// Returns `RegistryError::RegistryNotFound` if absent,
/// `RegistryError::Parse` (with path + line context) if malformed YAML, and
/// the invariant error if the file holds an empty or duplicated list.
pub fn load_at(home: &Path) -> Result<Registry, RegistryError> {
    let path = registry_path_at(home);
    if !path.exists() {
        return Err(RegistryError::RegistryNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let file: RegistryFile =
        serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse { path, source: e })?;
    check_registry(&file.repos)?;
    Ok(Registry::new(file.repos))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Registry, RegistryError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic, full replace)
// ---------------------------------------------------------------------------

/// Atomically replace `<home>/.repodeck/repos.yaml` with `registry`.
///
/// The registry is checked first; an invalid list never reaches the disk.
/// Write flow: serialize → `repos.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, registry: &Registry) -> Result<(), RegistryError> {
    check_registry(&registry.entries)?;
    let file = RegistryFile {
        version: FORMAT_VERSION,
        repos: registry.entries.clone(),
        updated_at: Utc::now(),
    };
    let yaml = serde_yaml::to_string(&file)?;
    write_atomic(home, &registry_path_at(home), &yaml)
}

/// `save_at` convenience wrapper.
pub fn save(registry: &Registry) -> Result<(), RegistryError> {
    save_at(&home()?, registry)
}

/// Backend-side full replace: registry invariants, every path on disk, then
/// [`save_at`]. Nothing is written unless every check passes.
pub fn replace_at(home: &Path, entries: &[Entry]) -> Result<(), RegistryError> {
    check_registry(entries)?;
    for entry in entries {
        check_on_disk(entry)?;
    }
    save_at(home, &Registry::new(entries.to_vec()))
}

/// `replace_at` convenience wrapper.
pub fn replace(entries: &[Entry]) -> Result<(), RegistryError> {
    replace_at(&home()?, entries)
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Create the registry with a single entry.
///
/// Idempotent: if the registry file already exists, loads and returns it unchanged.
pub fn init_at(home: &Path, first: Entry) -> Result<Registry, RegistryError> {
    if registry_path_at(home).exists() {
        return load_at(home);
    }
    let registry = Registry::new(vec![first]);
    save_at(home, &registry)?;
    Ok(registry)
}

/// `init_at` convenience wrapper.
pub fn init(first: Entry) -> Result<Registry, RegistryError> {
    init_at(&home()?, first)
}

// ---------------------------------------------------------------------------
// 5. Active selection
// ---------------------------------------------------------------------------

/// Label stored in `active.yaml`, or `None` when no selection was ever made.
pub fn load_active_at(home: &Path) -> Result<Option<Label>, RegistryError> {
    let path = active_path_at(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    let file: ActiveFile =
        serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse { path, source: e })?;
    Ok(Some(file.label))
}

/// `load_active_at` convenience wrapper.
pub fn load_active() -> Result<Option<Label>, RegistryError> {
    load_active_at(&home()?)
}

pub fn save_active_at(home: &Path, label: &Label) -> Result<(), RegistryError> {
    let yaml = serde_yaml::to_string(&ActiveFile {
        label: label.clone(),
    })?;
    write_atomic(home, &active_path_at(home), &yaml)
}

/// `save_active_at` convenience wrapper.
pub fn save_active(label: &Label) -> Result<(), RegistryError> {
    save_active_at(&home()?, label)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

pub(crate) fn home() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}

/// `.tmp` is always in the same directory as the target (same filesystem: no EXDEV).
fn write_atomic(home: &Path, path: &Path, contents: &str) -> Result<(), RegistryError> {
    ensure_root_at(home)?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn two() -> Registry {
        Registry::new(vec![
            Entry::new("frontend", "/code/web"),
            Entry::new("backend", "/code/api"),
        ])
    }

    #[test]
    fn registry_path_is_correct() {
        let home = make_home();
        assert!(registry_path_at(home.path()).ends_with(".repodeck/repos.yaml"));
        assert!(active_path_at(home.path()).ends_with(".repodeck/active.yaml"));
    }

    #[test]
    fn root_created_with_perms() {
        let home = make_home();
        let dir = ensure_root_at(home.path()).expect("ensure_root_at");
        assert!(dir.exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
        }
    }

    #[test]
    fn save_and_load_preserves_order() {
        let home = make_home();
        save_at(home.path(), &two()).expect("save");
        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, two());
    }

    #[test]
    fn save_refuses_invalid_registry() {
        let home = make_home();
        let err = save_at(home.path(), &Registry::default()).unwrap_err();
        assert!(matches!(err, RegistryError::Empty));
        assert!(!registry_path_at(home.path()).exists());
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        save_at(home.path(), &two()).expect("save");
        let tmp = registry_path_at(home.path()).with_file_name("repos.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_registry_returns_not_found() {
        let home = make_home();
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, RegistryError::RegistryNotFound { .. }));
    }

    #[test]
    fn replace_checks_paths_before_writing() {
        let home = make_home();
        let repo = make_home();
        let real = repo.path().to_string_lossy().into_owned();
        save_at(home.path(), &Registry::new(vec![Entry::new("a", real.clone())])).expect("save");

        let missing = repo.path().join("gone").to_string_lossy().into_owned();
        let err = replace_at(
            home.path(),
            &[Entry::new("a", real.clone()), Entry::new("b", missing.clone())],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), format!("Path '{missing}' does not exist"));
        assert_eq!(load_at(home.path()).expect("load").len(), 1);

        let sub = repo.path().join("sub");
        std::fs::create_dir_all(&sub).expect("mkdir");
        let sub = sub.to_string_lossy().into_owned();
        replace_at(home.path(), &[Entry::new("b", sub), Entry::new("a", real)]).expect("replace");
        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded.entries[0].label.as_str(), "b");
    }

    #[test]
    fn init_is_idempotent() {
        let home = make_home();
        let first = init_at(home.path(), Entry::new("frontend", "/code/web")).expect("init");
        assert_eq!(first.len(), 1);
        save_at(home.path(), &two()).expect("save");
        let again = init_at(home.path(), Entry::new("other", "/elsewhere")).expect("init again");
        assert_eq!(again, two(), "existing registry must be returned unchanged");
    }

    #[test]
    fn active_roundtrip_and_default() {
        let home = make_home();
        assert_eq!(load_active_at(home.path()).expect("load"), None);
        save_active_at(home.path(), &Label::from("backend")).expect("save");
        assert_eq!(
            load_active_at(home.path()).expect("load"),
            Some(Label::from("backend"))
        );
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(RegistryError::HomeNotFound.to_string().contains("home directory"));
    }
}
