//! # Planner State Module
//!
//! Map-side state of the checkpoint planner: where the map is centred, the
//! address search box and its results, the marker for a checkpoint about to
//! be created and positions of checkpoints dragged but not yet saved.

use shared::LatLng;
use std::collections::BTreeMap;

use crate::services::geocoding::SearchResult;

#[derive(Debug, Clone)]
pub struct PlannerState {
    center: LatLng,
    pub search_text: String,
    results: Vec<SearchResult>,
    pending_marker: Option<LatLng>,
    /// Suggested description for the pending marker, from reverse geocoding
    pending_address: Option<String>,
    drafts: BTreeMap<String, LatLng>,
}

impl PlannerState {
    pub fn new(center: LatLng) -> Self {
        Self {
            center,
            search_text: String::new(),
            results: Vec::new(),
            pending_marker: None,
            pending_address: None,
            drafts: BTreeMap::new(),
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn pending_marker(&self) -> Option<LatLng> {
        self.pending_marker
    }

    pub fn pending_address(&self) -> Option<&str> {
        self.pending_address.as_deref()
    }

    /// Store a search response. Zero results leave the map where it is.
    pub fn apply_search_results(&mut self, results: Vec<SearchResult>) {
        self.results = results;
    }

    /// Pick result `index`: drop the marker there, centre on it and clear the
    /// search. Returns the chosen result, `None` for an out-of-range index.
    pub fn select_result(&mut self, index: usize) -> Option<SearchResult> {
        let chosen = self.results.get(index).cloned()?;
        self.place_marker(chosen.position);
        self.pending_address = Some(chosen.display_name.clone());
        self.results.clear();
        self.search_text.clear();
        Some(chosen)
    }

    /// Marker from a map click
    pub fn place_marker(&mut self, position: LatLng) {
        self.pending_marker = Some(position);
        self.pending_address = None;
        self.center = position;
    }

    pub fn set_pending_address(&mut self, address: Option<String>) {
        self.pending_address = address;
    }

    pub fn clear_marker(&mut self) {
        self.pending_marker = None;
        self.pending_address = None;
    }

    /// Record a drag of an existing checkpoint
    pub fn move_checkpoint(&mut self, checkpoint_id: impl Into<String>, position: LatLng) {
        self.drafts.insert(checkpoint_id.into(), position);
    }

    pub fn draft(&self, checkpoint_id: &str) -> Option<LatLng> {
        self.drafts.get(checkpoint_id).copied()
    }

    pub fn drafts(&self) -> impl Iterator<Item = (&str, LatLng)> {
        self.drafts.iter().map(|(id, pos)| (id.as_str(), *pos))
    }

    pub fn has_drafts(&self) -> bool {
        !self.drafts.is_empty()
    }

    /// Remove a draft once it has been saved
    pub fn take_draft(&mut self, checkpoint_id: &str) -> Option<LatLng> {
        self.drafts.remove(checkpoint_id)
    }

    pub fn discard_draft(&mut self, checkpoint_id: &str) -> bool {
        self.drafts.remove(checkpoint_id).is_some()
    }

    pub fn discard_all_drafts(&mut self) {
        self.drafts.clear();
    }
}
