use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// SnapshotYear – which source table a row came from
// ---------------------------------------------------------------------------

/// The two supported snapshot years. Rendered as the literal strings
/// `"2020"` / `"2023"` everywhere (UI, exports, `year` column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SnapshotYear {
    #[default]
    #[serde(rename = "2020")]
    Y2020,
    #[serde(rename = "2023")]
    Y2023,
}

impl SnapshotYear {
    pub const ALL: [SnapshotYear; 2] = [SnapshotYear::Y2020, SnapshotYear::Y2023];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotYear::Y2020 => "2020",
            SnapshotYear::Y2023 => "2023",
        }
    }
}

impl fmt::Display for SnapshotYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2020" => Ok(SnapshotYear::Y2020),
            "2023" => Ok(SnapshotYear::Y2023),
            other => Err(format!("unsupported snapshot year '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of a snapshot
// ---------------------------------------------------------------------------

/// A single rental listing. Field names match the snapshot CSV headers so
/// rows deserialize by header name; columns not listed here are ignored.
///
/// `year` is never read from the source: the loader tags every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub host_id: i64,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub neighbourhood: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub room_type: String,
    /// Empty, unparseable or non-finite cells become `None`.
    #[serde(default, deserialize_with = "finite_option")]
    pub price: Option<f64>,
    pub minimum_nights: u32,
    pub number_of_reviews: u32,
    #[serde(default)]
    pub last_review: Option<String>,
    #[serde(default, deserialize_with = "finite_option")]
    pub reviews_per_month: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub availability_365: Option<u32>,
    pub city: String,
    #[serde(skip_deserializing)]
    pub year: SnapshotYear,
}

/// Like `csv::invalid_option`, but `NaN` and infinities read as missing too.
fn finite_option<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(csv::invalid_option::<D, f64>(de)?.filter(|v| v.is_finite()))
}

// ---------------------------------------------------------------------------
// PriceBounds – slider range, derived once from the unfiltered data
// ---------------------------------------------------------------------------

/// Quantile used for the upper end of the selectable price range.
pub const PRICE_UPPER_QUANTILE: f64 = 0.95;

/// Selectable price range in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// `min` is the dataset minimum, `max` the 95th percentile; both are
    /// truncated to integers. Rows without a price are ignored, and a
    /// dataset with no prices at all yields `(0, 0)`.
    pub fn from_listings(listings: &[Listing]) -> Self {
        let mut prices: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.price)
            .filter(|p| !p.is_nan())
            .collect();
        prices.sort_by(f64::total_cmp);

        match (prices.first(), quantile_sorted(&prices, PRICE_UPPER_QUANTILE)) {
            (Some(&min), Some(upper)) => PriceBounds {
                min: min.trunc(),
                max: upper.trunc(),
            },
            _ => PriceBounds { min: 0.0, max: 0.0 },
        }
    }
}

/// Linear-interpolation quantile over an ascending slice
/// (`pos = q * (n - 1)`, interpolating between the neighbouring ranks).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

// ---------------------------------------------------------------------------
// CombinedDataset – both snapshots, concatenated
// ---------------------------------------------------------------------------

/// Both snapshots in one table with pre-computed selector options.
#[derive(Debug, Clone)]
pub struct CombinedDataset {
    /// All 2020 rows followed by all 2023 rows, in source order.
    pub listings: Vec<Listing>,
    /// Sorted unique non-empty city names.
    pub cities: Vec<String>,
    /// Sorted unique non-empty room types.
    pub room_types: Vec<String>,
    /// Price slider bounds over the unfiltered rows.
    pub price_bounds: PriceBounds,
}

impl CombinedDataset {
    /// Concatenate two snapshots (`first` rows come first) and build the
    /// selector indices.
    pub fn from_snapshots(first: Vec<Listing>, second: Vec<Listing>) -> Self {
        let mut listings = first;
        listings.extend(second);
        Self::from_listings(listings)
    }

    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let cities: BTreeSet<&str> = listings
            .iter()
            .map(|l| l.city.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        let room_types: BTreeSet<&str> = listings
            .iter()
            .map(|l| l.room_type.as_str())
            .filter(|r| !r.is_empty())
            .collect();

        let cities = cities.into_iter().map(str::to_string).collect();
        let room_types = room_types.into_iter().map(str::to_string).collect();
        let price_bounds = PriceBounds::from_listings(&listings);

        CombinedDataset {
            listings,
            cities,
            room_types,
            price_bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn listing(year: SnapshotYear, city: &str, room_type: &str, price: Option<f64>) -> Listing {
    Listing {
        id: 1,
        name: format!("{room_type} in {city}"),
        host_id: 100,
        host_name: None,
        neighbourhood: None,
        latitude: 40.0,
        longitude: -74.0,
        room_type: room_type.to_string(),
        price,
        minimum_nights: 1,
        number_of_reviews: 0,
        last_review: None,
        reviews_per_month: None,
        availability_365: None,
        city: city.to_string(),
        year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_parses_only_known_literals() {
        assert_eq!("2020".parse::<SnapshotYear>(), Ok(SnapshotYear::Y2020));
        assert_eq!("2023".parse::<SnapshotYear>(), Ok(SnapshotYear::Y2023));
        assert!("2021".parse::<SnapshotYear>().is_err());
        assert_eq!(SnapshotYear::Y2023.to_string(), "2023");
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&v, 0.5), Some(3.0));
        let p95 = quantile_sorted(&v, 0.95).unwrap();
        assert!((p95 - 4.8).abs() < 1e-9, "{p95}");
        assert_eq!(quantile_sorted(&v, 1.0), Some(5.0));
        assert_eq!(quantile_sorted(&[7.0], 0.95), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.95), None);
    }

    #[test]
    fn concatenation_keeps_first_snapshot_first() {
        let a = vec![
            listing(SnapshotYear::Y2020, "Boston", "Private room", Some(50.0)),
            listing(SnapshotYear::Y2020, "Austin", "Private room", Some(60.0)),
        ];
        let b = vec![listing(SnapshotYear::Y2023, "Austin", "Hotel room", Some(70.0))];
        let ds = CombinedDataset::from_snapshots(a, b);

        let years: Vec<_> = ds.listings.iter().map(|l| l.year).collect();
        assert_eq!(years, [SnapshotYear::Y2020, SnapshotYear::Y2020, SnapshotYear::Y2023]);
        assert_eq!(ds.listings[0].city, "Boston");
        assert_eq!(ds.cities, ["Austin", "Boston"]);
        assert_eq!(ds.room_types, ["Hotel room", "Private room"]);
    }

    #[test]
    fn price_bounds_use_min_and_truncated_upper_quantile() {
        let rows: Vec<Listing> = (1..=20)
            .map(|i| listing(SnapshotYear::Y2020, "X", "Private room", Some(i as f64 * 10.0)))
            .chain(std::iter::once(listing(SnapshotYear::Y2023, "X", "Private room", None)))
            .collect();
        let bounds = PriceBounds::from_listings(&rows);
        assert_eq!(bounds.min, 10.0);
        // pos = 0.95 * 19 = 18.05 -> 190 + 0.05 * 10 = 190.5
        assert_eq!(bounds.max, 190.0);
    }

    #[test]
    fn price_bounds_without_prices_collapse_to_zero() {
        let rows = vec![listing(SnapshotYear::Y2020, "X", "Private room", None)];
        assert_eq!(PriceBounds::from_listings(&rows), PriceBounds { min: 0.0, max: 0.0 });
    }
}
