#![allow(dead_code)]

use pantryman_core::config::{AppConfig, PREF_DATA_DIR};
use pantryman_core::engine_api::{EngineOpener, PantryEngine};
use pantryman_core::errors::{ExError, ExErrorKind};
use pantryman_core::model::{Ingredient, IngredientDraft, PantryUpdate, StorageRoot};
use pantryman_engine::notifier::{ChangeNotifier, ChangeReceiver};
use pantryman_engine::session::Session;
use pantryman_engine::switch::DirectorySwitchController;
use pantryman_store::dataset::YamlEngineOpener;
use pantryman_store::grants::GrantRegistry;
use pantryman_store::locator::StorageLocator;
use pantryman_store::migrator::{FileCopier, Migrator, VerifiedCopier};
use pantryman_store::prefs::{FilePreferences, Preferences};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use tempfile::TempDir;

pub const MANIFEST: &str = "version: 1\nitems:\n  - ingredient: Ingredient 0\n    quantity: 2.0\n    quantity_type: g\n    last_updated: 2024-03-01\n";

pub fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

/// Manifest plus `records` ingredient records named `Ingredient <i>`
pub fn seed_dataset(root: &Path, records: usize) {
    write(root, "pantry.yaml", MANIFEST);
    for i in 0..records {
        write(
            root,
            &format!("ingredients/ingredient_{}.yaml", i),
            &format!("name: Ingredient {}\ncategory: Category {}\ntags: []\n", i, i % 2),
        );
    }
    write(root, "recipes/stew.md", "---\nTitle: Stew\n---\nSimmer.\n");
}

/// Number of regular files below `root`, recursively
pub fn file_count(root: &Path) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                file_count(&path)
            } else {
                1
            }
        })
        .sum()
}

// ===== Engine instrumentation =====

/// Counts engines opened and engines still live
#[derive(Clone, Default)]
pub struct EngineCounters {
    pub opened: Arc<AtomicUsize>,
    pub live: Arc<AtomicUsize>,
}

impl EngineCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct CountingOpener {
    pub counters: EngineCounters,
}

struct CountingEngine {
    inner: Box<dyn PantryEngine>,
    live: Arc<AtomicUsize>,
    closed: bool,
}

impl PantryEngine for CountingEngine {
    fn root(&self) -> &Path {
        self.inner.root()
    }

    fn list_ingredients(&self) -> Result<Vec<Ingredient>, ExError> {
        self.inner.list_ingredients()
    }

    fn list_categories(&self) -> Result<Vec<String>, ExError> {
        self.inner.list_categories()
    }

    fn set_pantry_status(&mut self, name: &str, update: PantryUpdate) -> Result<(), ExError> {
        self.inner.set_pantry_status(name, update)
    }

    fn create_ingredient(&mut self, draft: IngredientDraft) -> Result<(), ExError> {
        self.inner.create_ingredient(draft)
    }

    fn update_ingredient(&mut self, old: &str, draft: IngredientDraft) -> Result<(), ExError> {
        self.inner.update_ingredient(old, draft)
    }

    fn delete_ingredient(&mut self, name: &str) -> Result<(), ExError> {
        self.inner.delete_ingredient(name)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.inner.close();
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for CountingEngine {
    fn drop(&mut self) {
        self.close();
    }
}

impl EngineOpener for CountingOpener {
    fn open(&self, root: &Path) -> Result<Box<dyn PantryEngine>, ExError> {
        let inner = YamlEngineOpener.open(root)?;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingEngine {
            inner,
            live: self.counters.live.clone(),
            closed: false,
        }))
    }
}

// ===== Copy fault injection =====

/// Fails the named files; copies everything else for real
pub struct FailingCopier {
    fail: HashSet<String>,
}

impl FailingCopier {
    pub fn new(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            fail: names.iter().map(|n| n.to_string()).collect(),
        })
    }
}

impl FileCopier for FailingCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<u64, ExError> {
        let name = from.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail.contains(&name) {
            return Err(ExError::new(ExErrorKind::Io).with_message("injected failure"));
        }
        VerifiedCopier.copy(from, to)
    }
}

/// Blocks every copy until the test opens the gate
pub struct GatedCopier {
    gate: Mutex<mpsc::Receiver<()>>,
}

impl GatedCopier {
    pub fn new() -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(Self { gate: Mutex::new(rx) }), tx)
    }
}

impl FileCopier for GatedCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<u64, ExError> {
        if let Ok(gate) = self.gate.lock() {
            gate.recv().ok();
        }
        VerifiedCopier.copy(from, to)
    }
}

// ===== Harness =====

/// App home in a temp dir, wired the same way `PantryApp` wires it, with
/// engine counters and an injectable migrator.
pub struct Harness {
    pub home: TempDir,
    pub config: AppConfig,
    pub prefs: Arc<FilePreferences>,
    pub grants: Arc<GrantRegistry>,
    pub locator: Arc<StorageLocator>,
    pub controller: DirectorySwitchController,
    pub receiver: ChangeReceiver,
    pub session: Session,
    pub counters: EngineCounters,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_migrator(Migrator::new())
    }

    pub fn with_migrator(migrator: Migrator) -> Self {
        let home = TempDir::new().unwrap();
        let config = AppConfig::new(home.path());
        let prefs = Arc::new(FilePreferences::new(config.preferences_path()));
        let grants = Arc::new(GrantRegistry::new(config.grants_path()));
        let locator = Arc::new(StorageLocator::from_config(
            &config,
            prefs.clone(),
            grants.clone(),
        ));
        let (publisher, receiver) = ChangeNotifier::channel();
        let controller =
            DirectorySwitchController::new(locator.clone(), publisher).with_migrator(migrator);
        let counters = EngineCounters::default();
        let session = Session::new(Arc::new(CountingOpener {
            counters: counters.clone(),
        }));
        Self {
            home,
            config,
            prefs,
            grants,
            locator,
            controller,
            receiver,
            session,
            counters,
        }
    }

    /// A directory under the app home (not created)
    pub fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }

    /// Create a dataset with `records` records and make it the active root
    pub fn activate_source(&self, records: usize) -> PathBuf {
        let source = self.path("source");
        seed_dataset(&source, records);
        self.prefs
            .set(PREF_DATA_DIR, &source.to_string_lossy())
            .unwrap();
        source
    }

    /// An existing empty directory under the app home
    pub fn empty_dir(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn active_pref(&self) -> Option<String> {
        self.prefs.get(PREF_DATA_DIR).unwrap()
    }

    pub fn bind_active(&mut self) {
        let resolved = self.locator.resolve_active_root();
        self.session.bind_active(&resolved).unwrap();
    }
}

pub fn local(path: &Path) -> StorageRoot {
    StorageRoot::local(path)
}
