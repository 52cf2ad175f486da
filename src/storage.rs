// Manages local file storage for appointments.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the serialized shape of Appointment require incrementing
// LOCAL_STORAGE_VERSION below and teaching `parse` about the old layout.
use crate::context::AppContext;
use crate::model::Appointment;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// Version history:
// - v0: bare JSON array, as written by the browser version
// - v1: { version, appointments } wrapper
const LOCAL_STORAGE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct LocalStorageData {
    #[serde(default)]
    version: u32,
    appointments: Vec<Appointment>,
}

/// Where the appointment list lives between runs.
///
/// `load` is called once at startup and `save` after every mutation. Callers
/// treat both as best effort: a failed load starts from an empty list and a
/// failed save is only logged.
pub trait Persistence: Send + std::fmt::Debug {
    fn load(&self) -> Result<Vec<Appointment>>;
    fn save(&self, appointments: &[Appointment]) -> Result<()>;
}

// --- File backend ---

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self::at(ctx.get_appointments_path()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut name = file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        file_path.with_file_name(name)
    }

    /// Runs `f` while holding an exclusive lock on a sidecar `.lock` file, so
    /// the TUI and a `remind` process never interleave writes.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Decodes any known layout. The flag is true when the file should be
    /// rewritten in the current layout.
    fn parse(json: &str) -> Result<(Vec<Appointment>, bool)> {
        if let Ok(data) = serde_json::from_str::<LocalStorageData>(json) {
            if data.version > LOCAL_STORAGE_VERSION {
                anyhow::bail!(
                    "Appointment file version {} is newer than supported version {}",
                    data.version,
                    LOCAL_STORAGE_VERSION
                );
            }
            let upgrade = data.version < LOCAL_STORAGE_VERSION;
            return Ok((data.appointments, upgrade));
        }

        let appointments = serde_json::from_str::<Vec<Appointment>>(json)
            .context("Appointment file is neither a versioned document nor a bare list")?;
        log::info!("Migrating appointment file from v0 to v{}", LOCAL_STORAGE_VERSION);
        Ok((appointments, true))
    }

    fn encode(appointments: &[Appointment]) -> Result<String> {
        let data = LocalStorageData {
            version: LOCAL_STORAGE_VERSION,
            appointments: appointments.to_vec(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Moves an unreadable file out of the way so the next save can't clobber it.
    fn quarantine(&self) -> Option<PathBuf> {
        let stem = self.path.file_stem()?.to_string_lossy().to_string();
        let target = self.path.with_file_name(format!(
            "{}.corrupt-{}.json",
            stem,
            chrono::Utc::now().timestamp()
        ));
        match fs::rename(&self.path, &target) {
            Ok(()) => Some(target),
            Err(e) => {
                log::error!("Could not move aside {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

impl Persistence for LocalStorage {
    fn load(&self) -> Result<Vec<Appointment>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let bytes = Self::with_lock(&self.path, || Ok(fs::read(&self.path)?))
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let decoded = std::str::from_utf8(&bytes)
            .context("Appointment file is not valid UTF-8")
            .and_then(Self::parse);
        match decoded {
            Ok((appointments, upgrade)) => {
                if upgrade {
                    // Upgrade in place; losing this write only means migrating again.
                    if let Err(e) = self.save(&appointments) {
                        log::warn!("Could not rewrite upgraded appointment file: {}", e);
                    }
                }
                Ok(appointments)
            }
            Err(e) => {
                let moved = self.quarantine();
                Err(e.context(match moved {
                    Some(p) => format!("Unreadable appointment file kept at {}", p.display()),
                    None => format!("Unreadable appointment file {}", self.path.display()),
                }))
            }
        }
    }

    fn save(&self, appointments: &[Appointment]) -> Result<()> {
        let json = Self::encode(appointments)?;
        Self::with_lock(&self.path, || Self::atomic_write(&self.path, &json))
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

// --- In-memory backend ---

/// Keeps a serialized copy in memory. Clones share the same slot, so a test can
/// hand one clone to the controller and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with raw stored text, valid or not.
    pub fn with_raw(raw: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut slot) = storage.slot.lock() {
            *slot = Some(raw.to_string());
        }
        storage
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl Persistence for MemoryStorage {
    fn load(&self) -> Result<Vec<Appointment>> {
        match self.raw() {
            None => Ok(vec![]),
            Some(json) => Ok(LocalStorage::parse(&json)?.0),
        }
    }

    fn save(&self, appointments: &[Appointment]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        let json = LocalStorage::encode(appointments)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        *slot = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
