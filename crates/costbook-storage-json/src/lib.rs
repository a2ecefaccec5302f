use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use costbook_core::{
    storage::{ledger_warnings, LedgerStore},
    CoreError,
};
use costbook_domain::CostLedger;
use tracing::{debug, warn};
use uuid::Uuid;

const LEDGER_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence, one `<ledger-id>.json` document per ledger.
///
/// Writes go to a temporary sibling and are renamed into place, so readers see
/// either the previous or the next revision of a ledger. Revision checks are
/// serialized through an in-process lock; two processes sharing one directory
/// are not coordinated.
pub struct JsonLedgerStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLedgerStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{}.{}", id, LEDGER_EXTENSION))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Storage("ledger write lock poisoned".into()))
    }

    fn stored_ids(&self) -> Result<Vec<Uuid>, CoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let parsed = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok());
            match parsed {
                Some(id) => ids.push(id),
                None => debug!(path = %path.display(), "skipping non-ledger file"),
            }
        }
        Ok(ids)
    }
}

impl LedgerStore for JsonLedgerStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<CostLedger>, CoreError> {
        let path = self.ledger_path(id);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        parse_ledger(&data, &path).map(Some)
    }

    fn insert(&self, ledger: &CostLedger) -> Result<CostLedger, CoreError> {
        let _guard = self.lock()?;
        let path = self.ledger_path(ledger.id);
        if path.exists() {
            return Err(CoreError::Storage(format!(
                "ledger {} already exists",
                ledger.id
            )));
        }
        let mut stored = ledger.clone();
        stored.revision = 1;
        save_ledger_to_path(&stored, &path)?;
        Ok(stored)
    }

    fn replace(&self, ledger: &CostLedger) -> Result<CostLedger, CoreError> {
        let _guard = self.lock()?;
        let path = self.ledger_path(ledger.id);
        if !path.exists() {
            return Err(CoreError::LedgerNotFound(ledger.id));
        }
        let current = load_ledger_from_path(&path)?;
        if current.revision != ledger.revision {
            return Err(CoreError::RevisionMismatch {
                ledger: ledger.id,
                expected: ledger.revision,
                found: current.revision,
            });
        }
        let mut stored = ledger.clone();
        stored.revision = ledger.revision + 1;
        save_ledger_to_path(&stored, &path)?;
        Ok(stored)
    }

    fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let _guard = self.lock()?;
        let path = self.ledger_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    fn select_ids(&self, project_id: Option<Uuid>) -> Result<Vec<Uuid>, CoreError> {
        let Some(project) = project_id else {
            let mut ids = self.stored_ids()?;
            ids.sort();
            return Ok(ids);
        };
        let mut selected = Vec::new();
        for id in self.stored_ids()? {
            // a ledger deleted between listing and loading is simply skipped
            let Some(ledger) = self.find_by_id(id)? else {
                continue;
            };
            if ledger.project_id == project {
                selected.push((ledger.created_at, id));
            }
        }
        selected.sort();
        Ok(selected.into_iter().map(|(_, id)| id).collect())
    }
}

/// Saves a ledger document to an arbitrary path on disk.
pub fn save_ledger_to_path(ledger: &CostLedger, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_ledger(ledger)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a ledger document, recomputing its derived totals.
pub fn load_ledger_from_path(path: &Path) -> Result<CostLedger, CoreError> {
    let data = fs::read_to_string(path)?;
    parse_ledger(&data, path)
}

fn parse_ledger(data: &str, path: &Path) -> Result<CostLedger, CoreError> {
    let ledger: CostLedger =
        serde_json::from_str(data).map_err(|err| CoreError::Serde(err.to_string()))?;
    for warning in ledger_warnings(&ledger) {
        warn!(ledger = %ledger.id, path = %path.display(), "{warning}");
    }
    Ok(ledger)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_ledger(ledger: &CostLedger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_keeps_original_extension() {
        let tmp = tmp_path(Path::new("/data/abc.json"));
        assert_eq!(tmp, PathBuf::from("/data/abc.json.tmp"));
    }
}
