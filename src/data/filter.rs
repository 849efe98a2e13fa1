use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::model::{CombinedDataset, Listing, SnapshotYear};

// ---------------------------------------------------------------------------
// Filter parameters (one set per UI state)
// ---------------------------------------------------------------------------

/// Label of the "no city filter" choice.
pub const ALL_CITIES: &str = "All";

/// City selector value: either every city or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum CitySelection {
    #[default]
    All,
    City(String),
}

impl FromStr for CitySelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ALL_CITIES {
            CitySelection::All
        } else {
            CitySelection::City(s.to_string())
        })
    }
}

impl fmt::Display for CitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitySelection::All => f.write_str(ALL_CITIES),
            CitySelection::City(c) => f.write_str(c),
        }
    }
}

/// The full set of sidebar selections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterParams {
    pub year: SnapshotYear,
    pub room_types: BTreeSet<String>,
    pub price_min: f64,
    pub price_max: f64,
    pub city: CitySelection,
}

impl FilterParams {
    /// Initial dashboard state: first year, every room type, the full price
    /// range and all cities.
    pub fn defaults_for(dataset: &CombinedDataset) -> Self {
        FilterParams {
            year: SnapshotYear::ALL[0],
            room_types: dataset.room_types.iter().cloned().collect(),
            price_min: dataset.price_bounds.min,
            price_max: dataset.price_bounds.max,
            city: CitySelection::All,
        }
    }

    /// The active predicates in application order.
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut predicates = vec![
            Predicate::Year(self.year),
            Predicate::RoomType(&self.room_types),
            Predicate::PriceRange {
                min: self.price_min,
                max: self.price_max,
            },
        ];
        if let CitySelection::City(city) = &self.city {
            predicates.push(Predicate::City(city));
        }
        predicates
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// One independent row condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate<'a> {
    Year(SnapshotYear),
    /// Set membership; an empty set matches nothing.
    RoomType(&'a BTreeSet<String>),
    /// Inclusive on both ends; rows without a price never match.
    PriceRange { min: f64, max: f64 },
    City(&'a str),
}

impl Predicate<'_> {
    pub fn matches(&self, listing: &Listing) -> bool {
        match *self {
            Predicate::Year(year) => listing.year == year,
            Predicate::RoomType(set) => set.contains(&listing.room_type),
            Predicate::PriceRange { min, max } => listing
                .price
                .is_some_and(|p| min <= p && p <= max),
            Predicate::City(city) => listing.city == city,
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// Rows of a dataset that passed a filter, by ascending index.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a CombinedDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a CombinedDataset, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    pub fn dataset(&self) -> &'a CombinedDataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Listings in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Listing> + '_ {
        let listings = &self.dataset.listings;
        self.indices.iter().map(move |&i| &listings[i])
    }
}

/// Return the listings that pass every predicate in `params`, applied in
/// the fixed order year → room type → price → city.
pub fn filter<'a>(dataset: &'a CombinedDataset, params: &FilterParams) -> FilteredView<'a> {
    filter_with(dataset, &params.predicates())
}

/// Apply an arbitrary predicate sequence. Every step narrows the previous
/// selection without reordering it.
pub fn filter_with<'a>(dataset: &'a CombinedDataset, predicates: &[Predicate<'_>]) -> FilteredView<'a> {
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    for predicate in predicates {
        indices.retain(|&i| predicate.matches(&dataset.listings[i]));
    }
    FilteredView::new(dataset, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::listing;

    fn scenario() -> CombinedDataset {
        CombinedDataset::from_snapshots(
            vec![
                listing(SnapshotYear::Y2020, "Austin", "Private room", Some(50.0)),
                listing(SnapshotYear::Y2020, "Boston", "Entire home/apt", Some(200.0)),
            ],
            vec![listing(SnapshotYear::Y2023, "Austin", "Private room", Some(80.0))],
        )
    }

    fn params(room_types: &[&str], min: f64, max: f64) -> FilterParams {
        FilterParams {
            year: SnapshotYear::Y2020,
            room_types: room_types.iter().map(|s| s.to_string()).collect(),
            price_min: min,
            price_max: max,
            city: CitySelection::All,
        }
    }

    #[test]
    fn year_and_room_types_select_matching_rows() {
        let ds = scenario();
        let view = filter(&ds, &params(&["Private room", "Entire home/apt"], 0.0, 300.0));
        assert_eq!(view.indices(), [0, 1]);

        let view = filter(&ds, &params(&["Private room"], 0.0, 300.0));
        assert_eq!(view.indices(), [0]);
    }

    #[test]
    fn price_range_is_inclusive() {
        let ds = scenario();
        let both = ["Private room", "Entire home/apt"];
        assert_eq!(filter(&ds, &params(&both, 100.0, 300.0)).indices(), [1]);
        assert_eq!(filter(&ds, &params(&both, 50.0, 200.0)).indices(), [0, 1]);
        assert!(filter(&ds, &params(&both, 51.0, 199.0)).is_empty());
    }

    #[test]
    fn missing_price_never_passes() {
        let ds = CombinedDataset::from_listings(vec![
            listing(SnapshotYear::Y2020, "Austin", "Private room", None),
            listing(SnapshotYear::Y2020, "Austin", "Private room", Some(f64::NAN)),
        ]);
        assert!(filter(&ds, &params(&["Private room"], f64::MIN, f64::MAX)).is_empty());
    }

    #[test]
    fn empty_room_type_selection_yields_empty_view() {
        let ds = scenario();
        assert!(filter(&ds, &params(&[], 0.0, 1000.0)).is_empty());
    }

    #[test]
    fn city_filter_is_exact_and_all_is_a_no_op() {
        let ds = scenario();
        let mut p = params(&["Private room", "Entire home/apt"], 0.0, 300.0);
        p.city = "Boston".parse().unwrap();
        assert_eq!(filter(&ds, &p).indices(), [1]);

        p.city = "boston".parse().unwrap();
        assert!(filter(&ds, &p).is_empty());

        p.city = ALL_CITIES.parse().unwrap();
        assert_eq!(p.city, CitySelection::All);
        assert_eq!(p.predicates().len(), 3);
        assert_eq!(filter(&ds, &p).indices(), [0, 1]);
    }

    #[test]
    fn filtering_is_idempotent_and_order_independent() {
        let ds = CombinedDataset::from_listings(
            (0..40)
                .map(|i| {
                    let year = if i % 3 == 0 { SnapshotYear::Y2023 } else { SnapshotYear::Y2020 };
                    let city = ["Austin", "Boston", "Denver"][i % 3];
                    let room = ["Private room", "Shared room", "Hotel room", "Entire home/apt"][i % 4];
                    let price = (i % 7 != 0).then_some(i as f64 * 12.5);
                    listing(year, city, room, price)
                })
                .collect(),
        );
        let mut p = params(&["Private room", "Hotel room"], 25.0, 400.0);
        p.city = CitySelection::City("Boston".into());

        let once = filter(&ds, &p).into_indices();
        assert!(!once.is_empty());
        assert!(once.windows(2).all(|w| w[0] < w[1]));

        let mut predicates = p.predicates();
        predicates.extend(p.predicates());
        assert_eq!(filter_with(&ds, &predicates).indices(), once);

        let mut reversed = p.predicates();
        reversed.reverse();
        assert_eq!(filter_with(&ds, &reversed).indices(), once);
    }

    #[test]
    fn defaults_select_everything_for_first_year() {
        let ds = scenario();
        let p = FilterParams::defaults_for(&ds);
        assert_eq!(p.year, SnapshotYear::Y2020);
        assert_eq!(p.room_types.len(), 2);
        assert_eq!(p.price_min, 50.0);
        // The upper bound is the 95th percentile, which sits below 200.
        assert_eq!(filter(&ds, &p).indices(), [0]);
    }

    #[test]
    fn view_iterates_in_dataset_order() {
        let ds = scenario();
        let view = FilteredView::new(&ds, vec![0, 2]);
        let prices: Vec<_> = view.iter().map(|l| l.price).collect();
        assert_eq!(prices, [Some(50.0), Some(80.0)]);
    }
}
