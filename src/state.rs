use std::sync::Arc;

use crate::color::ColorMap;
use crate::dashboard::{recompute, Dashboard, DashboardOptions};
use crate::data::filter::{CitySelection, FilterParams};
use crate::data::model::{CombinedDataset, SnapshotYear};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Both snapshots, loaded once at start-up.
    pub dataset: Arc<CombinedDataset>,

    /// Current sidebar selections. Widgets edit this directly; call
    /// [`refresh`](Self::refresh) afterwards.
    pub params: FilterParams,

    /// Output of the last recompute.
    pub dashboard: Dashboard,

    pub options: DashboardOptions,

    /// Room type colours shared by every chart.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<CombinedDataset>, options: DashboardOptions) -> Self {
        let params = FilterParams::defaults_for(&dataset);
        let dashboard = recompute(&dataset, &params, options);
        let color_map = ColorMap::new(&dataset.room_types);
        Self {
            dataset,
            params,
            dashboard,
            options,
            color_map,
            status_message: None,
        }
    }

    /// Recompute the dashboard if the selections changed since the last
    /// pass. Returns whether a recompute happened.
    pub fn refresh(&mut self) -> bool {
        if self.params.price_min > self.params.price_max {
            self.params.price_min = self.params.price_max;
        }
        if self.params == self.dashboard.params {
            return false;
        }
        self.dashboard = recompute(&self.dataset, &self.params, self.options);
        true
    }

    pub fn set_year(&mut self, year: SnapshotYear) {
        self.params.year = year;
        self.refresh();
    }

    pub fn set_city(&mut self, city: CitySelection) {
        self.params.city = city;
        self.refresh();
    }

    /// Toggle a single room type in the selection.
    pub fn toggle_room_type(&mut self, room_type: &str) {
        if !self.params.room_types.remove(room_type) {
            self.params.room_types.insert(room_type.to_string());
        }
        self.refresh();
    }

    pub fn select_all_room_types(&mut self) {
        self.params.room_types = self.dataset.room_types.iter().cloned().collect();
        self.refresh();
    }

    pub fn select_no_room_types(&mut self) {
        self.params.room_types.clear();
        self.refresh();
    }

    /// Back to the initial selections.
    pub fn reset_filters(&mut self) {
        self.params = FilterParams::defaults_for(&self.dataset);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::listing;

    fn state() -> AppState {
        let ds = CombinedDataset::from_snapshots(
            vec![
                listing(SnapshotYear::Y2020, "Austin", "Private room", Some(50.0)),
                listing(SnapshotYear::Y2020, "Boston", "Entire home/apt", Some(50.0)),
            ],
            vec![listing(SnapshotYear::Y2023, "Austin", "Private room", Some(50.0))],
        );
        AppState::new(Arc::new(ds), DashboardOptions::default())
    }

    #[test]
    fn starts_with_default_selection() {
        let s = state();
        assert_eq!(s.params.year, SnapshotYear::Y2020);
        assert_eq!(s.dashboard.params, s.params);
        assert_eq!(s.dashboard.summary.count, 2);
    }

    #[test]
    fn refresh_only_recomputes_on_change() {
        let mut s = state();
        assert!(!s.refresh());

        s.set_year(SnapshotYear::Y2023);
        assert_eq!(s.dashboard.rows, [2]);
        assert!(!s.refresh());
    }

    #[test]
    fn room_type_toggles_and_bulk_selection() {
        let mut s = state();
        s.toggle_room_type("Private room");
        assert_eq!(s.dashboard.rows, [1]);

        s.select_no_room_types();
        assert!(s.dashboard.rows.is_empty());
        assert_eq!(s.dashboard.summary.mean_price, None);

        s.select_all_room_types();
        assert_eq!(s.dashboard.rows, [0, 1]);
    }

    #[test]
    fn city_selection_and_reset() {
        let mut s = state();
        s.set_city(CitySelection::City("Boston".into()));
        assert_eq!(s.dashboard.rows, [1]);

        s.reset_filters();
        assert_eq!(s.params.city, CitySelection::All);
        assert_eq!(s.dashboard.rows, [0, 1]);
    }

    #[test]
    fn inverted_price_range_is_clamped() {
        let mut s = state();
        s.params.price_min = s.params.price_max + 10.0;
        s.refresh();
        assert_eq!(s.params.price_min, s.params.price_max);
    }
}
