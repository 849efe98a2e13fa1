use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::filter::FilteredView;

/// Number of cities in the price ranking.
pub const DEFAULT_TOP_CITIES: usize = 15;
/// Number of bins in the price histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

// ---------------------------------------------------------------------------
// KPI summary
// ---------------------------------------------------------------------------

/// The four headline readouts. `None` means "no data" (empty view, or no
/// non-null values to average).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub mean_reviews_per_month: Option<f64>,
}

pub fn summarize(view: &FilteredView<'_>) -> Summary {
    let mut prices: Vec<f64> = view.iter().filter_map(|l| l.price).collect();
    prices.sort_by(f64::total_cmp);
    let reviews: Vec<f64> = view.iter().filter_map(|l| l.reviews_per_month).collect();

    Summary {
        count: view.len(),
        mean_price: mean(&prices).map(round2),
        median_price: median_sorted(&prices).map(round2),
        mean_reviews_per_month: mean(&reviews).map(round2),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub room_type: String,
    pub count: usize,
}

/// Listing counts per room type, most common first. Equal counts keep the
/// order in which the room types first appear in the view.
pub fn room_type_breakdown(view: &FilteredView<'_>) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for listing in view.iter() {
        let i = *slot.entry(listing.room_type.as_str()).or_insert_with(|| {
            counts.push(CategoryCount {
                room_type: listing.room_type.clone(),
                count: 0,
            });
            counts.len() - 1
        });
        counts[i].count += 1;
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityPrice {
    pub city: String,
    pub mean_price: f64,
    pub listings: usize,
}

/// Cities ranked by mean price, highest first, truncated to `limit`.
/// Groups are formed in city-name order, so equal means come out
/// alphabetically. Rows without a city or price are skipped.
pub fn top_cities_by_mean_price(view: &FilteredView<'_>, limit: usize) -> Vec<CityPrice> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for listing in view.iter() {
        let Some(price) = listing.price else {
            continue;
        };
        if listing.city.is_empty() {
            continue;
        }
        let group = groups.entry(listing.city.as_str()).or_insert((0.0, 0));
        group.0 += price;
        group.1 += 1;
    }

    let mut ranked: Vec<CityPrice> = groups
        .into_iter()
        .map(|(city, (sum, n))| CityPrice {
            city: city.to_string(),
            mean_price: sum / n as f64,
            listings: n,
        })
        .collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.mean_price.total_cmp(&a.mean_price));
    ranked.truncate(limit);
    ranked
}

// ---------------------------------------------------------------------------
// Chart feeds
// ---------------------------------------------------------------------------

/// Equal-width price bins with per-room-type counts, for a stacked
/// histogram. `counts[room_type][bin]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistogram {
    pub start: f64,
    pub bin_width: f64,
    pub bins: usize,
    pub counts: BTreeMap<String, Vec<usize>>,
}

impl PriceHistogram {
    pub fn is_empty(&self) -> bool {
        self.bins == 0
    }

    /// Centre of bin `i`.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + self.bin_width * (i as f64 + 0.5)
    }

    pub fn total(&self) -> usize {
        self.counts.values().flatten().sum()
    }
}

/// Bin the view's prices into `bins` equal-width buckets spanning
/// `min..=max`. The maximum lands in the last bucket. A single distinct
/// price gives one bucket of width 1; an empty view gives no buckets.
pub fn price_histogram(view: &FilteredView<'_>, bins: usize) -> PriceHistogram {
    let priced: Vec<(&str, f64)> = view
        .iter()
        .filter_map(|l| l.price.map(|p| (l.room_type.as_str(), p)))
        .filter(|(_, p)| p.is_finite())
        .collect();

    let (min, max) = priced
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, p)| (lo.min(p), hi.max(p)));

    if priced.is_empty() || bins == 0 {
        return PriceHistogram {
            start: 0.0,
            bin_width: 0.0,
            bins: 0,
            counts: BTreeMap::new(),
        };
    }

    let (bins, bin_width) = if max > min {
        (bins, (max - min) / bins as f64)
    } else {
        (1, 1.0)
    };

    let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (room_type, price) in priced {
        let bin = (((price - min) / bin_width) as usize).min(bins - 1);
        counts
            .entry(room_type.to_string())
            .or_insert_with(|| vec![0; bins])[bin] += 1;
    }

    PriceHistogram {
        start: min,
        bin_width,
        bins,
        counts,
    }
}

/// One marker on the geographic scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub price: Option<f64>,
    pub room_type: String,
    pub name: String,
    pub city: String,
}

/// Map markers for every row with finite coordinates, in view order.
pub fn map_points(view: &FilteredView<'_>) -> Vec<MapPoint> {
    view.iter()
        .filter(|l| l.latitude.is_finite() && l.longitude.is_finite())
        .map(|l| MapPoint {
            longitude: l.longitude,
            latitude: l.latitude,
            price: l.price,
            room_type: l.room_type.clone(),
            name: l.name.clone(),
            city: l.city.clone(),
        })
        .collect()
}
