//! Engine owner: binding state, snapshot cache and rebind
//!
//! The session holds at most one `EngineHandle`. Rebinding always releases
//! the current handle before opening the next one; if the open fails the
//! session is left in an explicit `Failed` state with no handle.

use crate::handle::EngineHandle;
use crate::notifier::{ChangeEvent, ChangeReceiver};
use pantryman_core::engine_api::{EngineOpener, PantryEngine};
use pantryman_core::errors::{ExError, PantryError};
use pantryman_core::model::{Ingredient, IngredientDraft, PantryUpdate, StorageRoot};
use pantryman_core::{log_op_end, log_op_error, log_op_start};
use pantryman_store::errors::Result;
use pantryman_store::locator::ResolvedRoot;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Binding state of the session
#[derive(Debug, Clone)]
pub enum BindingState {
    Unbound,
    Bound { root: StorageRoot, path: PathBuf },
    Failed { root: StorageRoot, error: ExError },
}

impl BindingState {
    pub fn is_bound(&self) -> bool {
        matches!(self, BindingState::Bound { .. })
    }
}

pub struct Session {
    opener: Arc<dyn EngineOpener>,
    handle: Option<EngineHandle>,
    state: BindingState,
    ingredients: Vec<Ingredient>,
    categories: Vec<String>,
    last_error: Option<ExError>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("ingredients", &self.ingredients.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(opener: Arc<dyn EngineOpener>) -> Self {
        Self {
            opener,
            handle: None,
            state: BindingState::Unbound,
            ingredients: Vec::new(),
            categories: Vec::new(),
            last_error: None,
        }
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    /// Directory of the open handle, if any
    pub fn bound_path(&self) -> Option<&Path> {
        self.handle.as_ref().map(EngineHandle::root)
    }

    /// Most recent error swallowed by a `bool` operation
    pub fn last_error(&self) -> Option<&ExError> {
        self.last_error.as_ref()
    }

    /// Bind to the root the locator resolved at startup.
    ///
    /// # Errors
    ///
    /// Same as [`Session::rebind`].
    pub fn bind_active(&mut self, resolved: &ResolvedRoot) -> Result<()> {
        self.rebind(&resolved.root, &resolved.path)
    }

    /// Release the current engine and open one on `path`.
    ///
    /// On success the ingredient and category snapshots are reloaded from
    /// the new engine. On failure no handle is held.
    ///
    /// # Errors
    ///
    /// `EngineInit` if the new root cannot be opened.
    pub fn rebind(&mut self, root: &StorageRoot, path: &Path) -> Result<()> {
        let start = Instant::now();
        log_op_start!("rebind", root = %root);

        self.release();

        let result = EngineHandle::open(self.opener.as_ref(), path).and_then(|handle| {
            self.handle = Some(handle);
            self.refresh()
        });
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                self.state = BindingState::Bound {
                    root: root.clone(),
                    path: path.to_path_buf(),
                };
                log_op_end!(
                    "rebind",
                    duration_ms = duration_ms,
                    ingredient_count = self.ingredients.len()
                );
                Ok(())
            }
            Err(e) => {
                self.release();
                self.state = BindingState::Failed {
                    root: root.clone(),
                    error: e.clone(),
                };
                log_op_error!("rebind", e.clone(), duration_ms = duration_ms, root = %root);
                Err(e)
            }
        }
    }

    /// Apply a pending directory change, if there is one.
    ///
    /// Returns `None` when nothing was pending.
    pub fn on_resume(&mut self, receiver: &ChangeReceiver) -> Option<Result<()>> {
        let ChangeEvent::DirectoryChanged { root, path } = receiver.take()?;
        tracing::info!(root = %root, "Directory changed elsewhere, rebinding");
        Some(self.rebind(&root, &path))
    }

    /// Close the engine and drop cached snapshots
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
        self.ingredients.clear();
        self.categories.clear();
        self.state = BindingState::Unbound;
    }

    /// Reload snapshots from the bound engine.
    ///
    /// # Errors
    ///
    /// `NotBound` without a handle, or any engine query failure.
    pub fn refresh(&mut self) -> Result<()> {
        let engine = self.engine()?;
        let ingredients = engine.list_ingredients()?;
        let categories = engine.list_categories()?;
        self.ingredients = ingredients;
        self.categories = categories;
        Ok(())
    }

    fn engine(&self) -> Result<&dyn PantryEngine> {
        match &self.handle {
            Some(handle) => handle.engine(),
            None => Err(ExError::from(PantryError::NotBound).with_op("session")),
        }
    }

    /// Run a mutating request, refresh snapshots on success and fold the
    /// outcome into the boundary's `bool`.
    fn mutate<F>(&mut self, op: &'static str, request: F) -> bool
    where
        F: FnOnce(&mut dyn PantryEngine) -> Result<()>,
    {
        let start = Instant::now();
        let outcome = match self.handle.as_mut() {
            Some(handle) => handle.engine_mut().and_then(request),
            None => Err(ExError::from(PantryError::NotBound)),
        };
        let result = outcome.and_then(|()| self.refresh());

        match result {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                let e = e.with_op(op);
                log_op_error!(
                    op,
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                self.last_error = Some(e);
                false
            }
        }
    }

    // ===== Engine contract =====

    /// Cached ingredients, sorted by name
    pub fn list_ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn list_ingredients_by_category(&self) -> BTreeMap<String, Vec<Ingredient>> {
        let mut grouped: BTreeMap<String, Vec<Ingredient>> = BTreeMap::new();
        for ingredient in &self.ingredients {
            grouped
                .entry(ingredient.category.clone())
                .or_default()
                .push(ingredient.clone());
        }
        grouped
    }

    /// Cached categories, sorted and unique
    pub fn list_categories(&self) -> &[String] {
        &self.categories
    }

    pub fn set_pantry_status(
        &mut self,
        name: &str,
        in_pantry: bool,
        quantity: Option<f64>,
        unit: Option<&str>,
    ) -> bool {
        let update = PantryUpdate::from_parts(in_pantry, quantity, unit);
        self.mutate("set_pantry_status", |engine| {
            engine.set_pantry_status(name, update)
        })
    }

    pub fn create_ingredient(
        &mut self,
        name: &str,
        category: &str,
        kb: Option<&str>,
        tags: &[String],
    ) -> bool {
        let draft = draft(name, category, kb, tags);
        self.mutate("create_ingredient", |engine| engine.create_ingredient(draft))
    }

    pub fn update_ingredient(
        &mut self,
        old_name: &str,
        new_name: &str,
        category: &str,
        kb: Option<&str>,
        tags: &[String],
    ) -> bool {
        let draft = draft(new_name, category, kb, tags);
        self.mutate("update_ingredient", |engine| {
            engine.update_ingredient(old_name, draft)
        })
    }

    pub fn delete_ingredient(&mut self, name: &str) -> bool {
        self.mutate("delete_ingredient", |engine| engine.delete_ingredient(name))
    }
}

fn draft(name: &str, category: &str, kb: Option<&str>, tags: &[String]) -> IngredientDraft {
    let draft = IngredientDraft::new(name, category).with_tags(tags.iter().cloned());
    match kb {
        Some(kb) => draft.with_kb(kb),
        None => draft,
    }
}
