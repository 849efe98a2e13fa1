use serde::Serialize;

use crate::data::aggregate::{
    self, CategoryCount, CityPrice, MapPoint, PriceHistogram, Summary, DEFAULT_HISTOGRAM_BINS,
    DEFAULT_TOP_CITIES,
};
use crate::data::filter::{self, FilterParams, FilteredView};
use crate::data::model::CombinedDataset;

/// Sizes of the ranked/binned tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub top_cities: usize,
    pub histogram_bins: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_cities: DEFAULT_TOP_CITIES,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// Everything the UI draws for one set of filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub params: FilterParams,
    /// Dataset indices of the filtered rows.
    #[serde(skip)]
    pub rows: Vec<usize>,
    pub summary: Summary,
    pub room_types: Vec<CategoryCount>,
    pub top_cities: Vec<CityPrice>,
    pub histogram: PriceHistogram,
    #[serde(skip)]
    pub map: Vec<MapPoint>,
}

impl Dashboard {
    pub fn view<'a>(&self, dataset: &'a CombinedDataset) -> FilteredView<'a> {
        FilteredView::new(dataset, self.rows.clone())
    }
}

/// Filter then aggregate, from scratch.
pub fn recompute(dataset: &CombinedDataset, params: &FilterParams, options: DashboardOptions) -> Dashboard {
    let view = filter::filter(dataset, params);
    log::debug!(
        "recompute: year={} city={} room_types={:?} price={}..={} -> {} rows",
        params.year,
        params.city,
        params.room_types,
        params.price_min,
        params.price_max,
        view.len()
    );

    Dashboard {
        params: params.clone(),
        summary: aggregate::summarize(&view),
        room_types: aggregate::room_type_breakdown(&view),
        top_cities: aggregate::top_cities_by_mean_price(&view, options.top_cities),
        histogram: aggregate::price_histogram(&view, options.histogram_bins),
        map: aggregate::map_points(&view),
        rows: view.into_indices(),
    }
}
