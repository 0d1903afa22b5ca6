use serde::Serialize;
use tokio::task::AbortHandle;

use fipe_data::{Brand, Model, ModelCode, PriceResult, VehicleType, YearOption};

use super::events::{CascadeError, Level};

/// Request bookkeeping for one cascade level.
#[derive(Debug, Default)]
pub(crate) struct LevelSlot {
    seq: u64,
    key: Option<String>,
    task: Option<AbortHandle>,
}

impl LevelSlot {
    /// Starts a request for `key`. Returns `None` when the same key is
    /// already in flight; otherwise supersedes whatever was running.
    pub(crate) fn begin(&mut self, key: String) -> Option<u64> {
        let in_flight = self.task.as_ref().is_some_and(|t| !t.is_finished());
        if in_flight && self.key.as_deref() == Some(key.as_str()) {
            return None;
        }
        self.cancel();
        self.key = Some(key);
        Some(self.seq)
    }

    pub(crate) fn attach(&mut self, task: AbortHandle) {
        self.task = Some(task);
    }

    /// Aborts the running request and invalidates its sequence number.
    pub(crate) fn cancel(&mut self) {
        self.seq += 1;
        self.key = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub(crate) fn is_current(&self, seq: u64) -> bool {
        self.seq == seq
    }

    /// Marks the current request as applied.
    pub(crate) fn finish(&mut self) {
        self.key = None;
        self.task = None;
    }
}

/// Mutable selection state, owned by the cascade.
#[derive(Debug, Default)]
pub(crate) struct CascadeState {
    pub vehicle_type: VehicleType,
    pub brands: Vec<Brand>,
    pub models: Vec<Model>,
    pub candidate_years: Vec<YearOption>,
    pub model_years: Vec<YearOption>,
    pub result: Option<PriceResult>,
    pub selected_brand: Option<String>,
    pub selected_model: Option<ModelCode>,
    pub selected_year: Option<String>,
    pub pending_year: Option<String>,
    pub error: Option<CascadeError>,
    slots: [LevelSlot; 4],
}

impl CascadeState {
    pub(crate) fn slot_mut(&mut self, level: Level) -> &mut LevelSlot {
        &mut self.slots[level.index()]
    }

    pub(crate) fn slot(&self, level: Level) -> &LevelSlot {
        &self.slots[level.index()]
    }

    pub(crate) fn cancel_levels(&mut self, levels: &[Level]) {
        for level in levels {
            self.slot_mut(*level).cancel();
        }
    }

    pub(crate) fn reset_year(&mut self) {
        self.selected_year = None;
        self.result = None;
    }

    pub(crate) fn reset_model(&mut self) {
        self.selected_model = None;
        self.model_years.clear();
        self.reset_year();
    }

    pub(crate) fn reset_brand(&mut self) {
        self.selected_brand = None;
        self.models.clear();
        self.candidate_years.clear();
        self.pending_year = None;
        self.reset_model();
    }

    pub(crate) fn reset_all(&mut self, vehicle_type: VehicleType) {
        self.vehicle_type = vehicle_type;
        self.brands.clear();
        self.error = None;
        self.reset_brand();
    }

    pub(crate) fn snapshot(&self, loading: bool) -> CascadeSnapshot {
        let available_years = if self.selected_model.is_some() && !self.model_years.is_empty() {
            self.model_years.clone()
        } else {
            self.candidate_years.clone()
        };

        CascadeSnapshot {
            vehicle_type: self.vehicle_type,
            brands: self.brands.clone(),
            models: self.models.clone(),
            years: available_years,
            result: self.result.clone(),
            selected_brand: self.selected_brand.clone(),
            selected_model: self.selected_model,
            selected_year: self.selected_year.clone(),
            pending_year: self.pending_year.clone(),
            loading,
            error: self.error.clone(),
        }
    }
}

/// Point-in-time view of the cascade for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSnapshot {
    pub vehicle_type: VehicleType,
    pub brands: Vec<Brand>,
    pub models: Vec<Model>,
    /// Model years once a model's list is loaded, otherwise the candidate
    /// range offered after a brand is chosen.
    pub years: Vec<YearOption>,
    pub result: Option<PriceResult>,
    pub selected_brand: Option<String>,
    pub selected_model: Option<ModelCode>,
    pub selected_year: Option<String>,
    pub pending_year: Option<String>,
    pub loading: bool,
    pub error: Option<CascadeError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_bumps_sequence() {
        let mut slot = LevelSlot::default();
        let first = slot.begin("a".into()).unwrap();
        let second = slot.begin("b".into()).unwrap();
        assert_ne!(first, second);
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
    }

    #[test]
    fn test_brand_reset_clears_downstream() {
        let mut state = CascadeState {
            selected_brand: Some("59".into()),
            selected_model: Some(5940),
            selected_year: Some("2023-1".into()),
            pending_year: Some("2023".into()),
            model_years: vec![YearOption::new("2023-1", "2023")],
            ..Default::default()
        };
        state.reset_brand();

        let snapshot = state.snapshot(false);
        assert!(snapshot.selected_brand.is_none());
        assert!(snapshot.selected_model.is_none());
        assert!(snapshot.selected_year.is_none());
        assert!(snapshot.pending_year.is_none());
        assert!(snapshot.years.is_empty());
    }
}
