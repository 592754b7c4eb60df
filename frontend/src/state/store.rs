//! # Entity Store
//!
//! One store per list screen. Holds the fetched list, the loading and error
//! flags and the CRUD dialog state.
//!
//! ## Responsibilities:
//! - Fetch on first load, re-fetch on explicit refresh
//! - Keep the previous list when a fetch fails (stale but consistent)
//! - Track which create/edit/view dialog is open
//!
//! There is no subscription protocol: callers refresh explicitly after every
//! mutation they await.

use log::{info, warn};
use std::fmt::Display;
use std::future::Future;

/// Create/edit/view dialog of a list screen
#[derive(Debug, Clone, PartialEq)]
pub enum CrudDialog<T> {
    Closed,
    Creating,
    Editing(T),
    Viewing(T),
}

impl<T> CrudDialog<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, CrudDialog::Closed)
    }

    pub fn record(&self) -> Option<&T> {
        match self {
            CrudDialog::Editing(record) | CrudDialog::Viewing(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    name: &'static str,
    items: Vec<T>,
    loading: bool,
    loaded: bool,
    error: Option<String>,
    dialog: CrudDialog<T>,
}

impl<T> EntityStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
            loading: false,
            loaded: false,
            error: None,
            dialog: CrudDialog::Closed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// In-place edits of derived fields; the next refresh overwrites them
    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether at least one fetch has succeeded since creation or teardown
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dialog(&self) -> &CrudDialog<T> {
        &self.dialog
    }

    pub fn open_create(&mut self) {
        self.dialog = CrudDialog::Creating;
    }

    pub fn open_edit(&mut self, record: T) {
        self.dialog = CrudDialog::Editing(record);
    }

    pub fn open_view(&mut self, record: T) {
        self.dialog = CrudDialog::Viewing(record);
    }

    pub fn close_dialog(&mut self) {
        self.dialog = CrudDialog::Closed;
    }

    /// Run `fetch` and replace the list with its result.
    ///
    /// On failure the previous list is kept and the error recorded; the error
    /// is also handed back so the caller can notify.
    pub async fn refresh_with<F, E>(&mut self, fetch: F) -> Result<usize, E>
    where
        F: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        self.loading = true;
        self.error = None;
        let result = fetch.await;
        self.loading = false;

        match result {
            Ok(items) => {
                info!("📋 Loaded {} {}", items.len(), self.name);
                let count = items.len();
                self.items = items;
                self.loaded = true;
                Ok(count)
            }
            Err(e) => {
                warn!("⚠️ Failed to load {}: {}", self.name, e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop everything, as when the screen is left
    pub fn teardown(&mut self) {
        self.items.clear();
        self.loading = false;
        self.loaded = false;
        self.error = None;
        self.dialog = CrudDialog::Closed;
    }
}

impl<T: Clone> EntityStore<T> {
    /// Open the edit dialog for the first record matching `pred`
    pub fn edit_where<P: Fn(&T) -> bool>(&mut self, pred: P) -> bool {
        match self.items.iter().find(|r| pred(r)).cloned() {
            Some(record) => {
                self.open_edit(record);
                true
            }
            None => false,
        }
    }
}
