//! In-memory plot store
//!
//! The authoritative collection of plots for a session, drafts and saved
//! parcels alike. It is the local implementation of the persistence contract
//! (list / create / save-all / delete), so every service and test runs
//! against the same store the workflow mutates.
//!
//! Mutation happens only through the explicit operations below; a failed
//! operation leaves the collection untouched.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use shared::{Plot, PlotId};

use crate::error::{AppError, AppResult};

/// Session-scoped plot collection behind a read-write lock
#[derive(Debug, Default)]
pub struct PlotStore {
    plots: RwLock<BTreeMap<PlotId, Plot>>,
}

impl PlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All plots, oldest first
    pub async fn list(&self) -> Vec<Plot> {
        let plots = self.plots.read().await;
        let mut all: Vec<Plot> = plots.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    /// Unsaved draft plots, oldest first
    pub async fn drafts(&self) -> Vec<Plot> {
        self.list().await.into_iter().filter(|p| !p.is_saved).collect()
    }

    /// Persisted plots, oldest first
    pub async fn saved(&self) -> Vec<Plot> {
        self.list().await.into_iter().filter(|p| p.is_saved).collect()
    }

    pub async fn get(&self, id: &PlotId) -> AppResult<Plot> {
        self.plots
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Plot".to_string()))
    }

    pub async fn insert(&self, plot: Plot) -> Plot {
        let mut plots = self.plots.write().await;
        plots.insert(plot.id.clone(), plot.clone());
        plot
    }

    /// Mutate a single plot in place.
    ///
    /// Saved plots are immutable from the workflow's perspective; attempts to
    /// touch one fail without modifying the store.
    pub async fn update<F>(&self, id: &PlotId, mutate: F) -> AppResult<Plot>
    where
        F: FnOnce(&mut Plot),
    {
        let mut plots = self.plots.write().await;
        let plot = plots
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Plot".to_string()))?;
        if plot.is_saved {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "Saved plots cannot be modified".to_string(),
                message_th: "แปลงที่บันทึกแล้วไม่สามารถแก้ไขได้".to_string(),
            });
        }
        mutate(plot);
        plot.updated_at = Utc::now();
        Ok(plot.clone())
    }

    pub async fn remove(&self, id: &PlotId) -> AppResult<()> {
        let mut plots = self.plots.write().await;
        plots
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Plot".to_string()))
    }

    /// Discard every unsaved draft, returning how many were dropped.
    /// Saved plots are untouched.
    pub async fn discard_drafts(&self) -> usize {
        let mut plots = self.plots.write().await;
        let before = plots.len();
        plots.retain(|_, plot| plot.is_saved);
        before - plots.len()
    }

    /// Persist a batch: every id is re-namespaced from draft to persisted and
    /// marked saved, atomically. If any id is missing or already saved the
    /// whole batch is rejected and the store is left as it was.
    pub async fn mark_saved(&self, ids: &[PlotId]) -> AppResult<Vec<Plot>> {
        let mut plots = self.plots.write().await;

        for id in ids {
            match plots.get(id) {
                None => return Err(AppError::Persistence(format!("unknown plot {}", id))),
                Some(plot) if plot.is_saved => {
                    return Err(AppError::Persistence(format!("plot {} already saved", id)))
                }
                Some(_) => {}
            }
        }

        let now = Utc::now();
        let mut saved = Vec::with_capacity(ids.len());
        for id in ids {
            // Presence was checked above
            let mut plot = plots.remove(id).expect("plot vanished during save");
            plot.id = PlotId::persisted();
            plot.is_saved = true;
            plot.is_confirmed = false;
            plot.updated_at = now;
            plots.insert(plot.id.clone(), plot.clone());
            saved.push(plot);
        }

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PlotSource;

    fn draft(name: &str, area: f64) -> Plot {
        Plot::draft(name.to_string(), None, area, PlotSource::Manual)
    }

    #[tokio::test]
    async fn insert_and_list_preserves_creation_order() {
        let store = PlotStore::new();
        let a = store.insert(draft("a", 1.0)).await;
        let b = store.insert(draft("b", 2.0)).await;

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);
    }

    #[tokio::test]
    async fn update_rejects_saved_plots() {
        let store = PlotStore::new();
        let plot = store.insert(draft("a", 1.0)).await;
        let saved = store.mark_saved(&[plot.id.clone()]).await.unwrap();

        let result = store
            .update(&saved[0].id, |p| p.farmer_name = "x".to_string())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn mark_saved_renames_ids_atomically() {
        let store = PlotStore::new();
        let a = store.insert(draft("a", 1.0)).await;
        let missing = PlotId::draft();

        // One bad id rejects the whole batch
        let err = store.mark_saved(&[a.id.clone(), missing]).await;
        assert!(err.is_err());
        assert!(!store.get(&a.id).await.unwrap().is_saved);

        let saved = store.mark_saved(&[a.id.clone()]).await.unwrap();
        assert!(saved[0].id.is_persisted());
        assert!(saved[0].is_saved);
        assert!(store.get(&a.id).await.is_err());
    }

    #[tokio::test]
    async fn discard_drafts_keeps_saved_plots() {
        let store = PlotStore::new();
        let keep = store.insert(draft("keep", 1.0)).await;
        store.insert(draft("drop", 2.0)).await;
        let saved = store.mark_saved(&[keep.id.clone()]).await.unwrap();

        let dropped = store.discard_drafts().await;
        assert_eq!(dropped, 1);
        let remaining = store.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, saved[0].id);
        assert!(remaining[0].is_saved);
    }
}
