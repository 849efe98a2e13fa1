use std::collections::BTreeSet;
use std::path::Path;

use listing_lens::dashboard::{recompute, DashboardOptions};
use listing_lens::data::aggregate::{room_type_breakdown, summarize, top_cities_by_mean_price};
use listing_lens::data::cache::DatasetCache;
use listing_lens::data::error::DataSourceError;
use listing_lens::data::filter::{filter, CitySelection, FilterParams};
use listing_lens::data::loader::SnapshotSources;
use listing_lens::data::model::SnapshotYear;

const HEADER: &str =
    "id,name,host_id,host_name,neighbourhood_group,neighbourhood,latitude,longitude,room_type,price,minimum_nights,number_of_reviews,last_review,reviews_per_month,calculated_host_listings_count,availability_365,city";

fn write(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let mut body = format!("{HEADER}\n");
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn three_row_cache(dir: &Path) -> DatasetCache {
    DatasetCache::new(SnapshotSources {
        snapshot_2020: write(
            dir,
            "AB_US_2020.csv",
            &[
                "1,Garden room,10,Ann,,Mueller,30.29,-97.70,Private room,50,1,12,2020-01-05,1.0,1,100,Austin",
                "2,Whole bungalow,11,Ben,,Zilker,30.26,-97.77,Entire home/apt,200,2,40,2020-02-10,3.0,1,200,Austin",
            ],
        ),
        snapshot_2023: write(
            dir,
            "AB_US_2023.csv",
            &["3,Back Bay room,12,Cy,,Back Bay,42.35,-71.08,Private room,80,1,3,,,1,300,Boston"],
        ),
    })
}

fn params(year: SnapshotYear, room_types: &[&str], min: f64, max: f64) -> FilterParams {
    FilterParams {
        year,
        room_types: room_types.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        price_min: min,
        price_max: max,
        city: CitySelection::All,
    }
}

#[test]
fn two_2020_rows_average_to_125() {
    let dir = tempfile::tempdir().unwrap();
    let ds = three_row_cache(dir.path()).get_or_load().unwrap();
    assert_eq!(ds.len(), 3);

    let view = filter(
        &ds,
        &params(SnapshotYear::Y2020, &["Private room", "Entire home/apt"], 0.0, 300.0),
    );
    assert_eq!(view.indices(), [0, 1]);

    let summary = summarize(&view);
    assert_eq!(summary.count, 2);
    assert_eq!(summary.mean_price, Some(125.0));
    assert_eq!(summary.median_price, Some(125.0));
    assert_eq!(summary.mean_reviews_per_month, Some(2.0));
}

#[test]
fn single_private_room_has_equal_mean_and_median() {
    let dir = tempfile::tempdir().unwrap();
    let ds = three_row_cache(dir.path()).get_or_load().unwrap();

    let view = filter(&ds, &params(SnapshotYear::Y2020, &["Private room"], 0.0, 300.0));
    let summary = summarize(&view);
    assert_eq!(summary.count, 1);
    assert_eq!(summary.mean_price, Some(50.0));
    assert_eq!(summary.median_price, Some(50.0));
}

#[test]
fn price_floor_of_100_keeps_only_the_entire_home() {
    let dir = tempfile::tempdir().unwrap();
    let ds = three_row_cache(dir.path()).get_or_load().unwrap();

    let view = filter(
        &ds,
        &params(SnapshotYear::Y2020, &["Private room", "Entire home/apt"], 100.0, 300.0),
    );
    let rows: Vec<_> = view.iter().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].room_type, "Entire home/apt");
    assert_eq!(rows[0].price, Some(200.0));
}

#[test]
fn year_2023_with_no_reviews_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let ds = three_row_cache(dir.path()).get_or_load().unwrap();

    let mut p = params(SnapshotYear::Y2023, &["Private room"], 0.0, 300.0);
    p.city = CitySelection::City("Boston".into());
    let dash = recompute(&ds, &p, DashboardOptions::default());
    assert_eq!(dash.summary.count, 1);
    assert_eq!(dash.summary.mean_reviews_per_month, None);
    assert_eq!(dash.top_cities.len(), 1);
    assert_eq!(dash.top_cities[0].city, "Boston");
}

#[test]
fn nan_reviews_per_month_is_left_out_of_the_mean() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DatasetCache::new(SnapshotSources {
        snapshot_2020: write(
            dir.path(),
            "a.csv",
            &[
                "1,a,1,h,,x,40.0,-74.0,Private room,10,1,5,,NaN,1,0,X",
                "2,b,2,h,,x,40.0,-74.0,Private room,20,1,5,,1.0,1,0,X",
            ],
        ),
        snapshot_2023: write(dir.path(), "b.csv", &["3,c,3,h,,x,40.0,-74.0,Private room,30,1,0,,,1,0,X"]),
    });
    let ds = cache.get_or_load().unwrap();

    let view = filter(&ds, &params(SnapshotYear::Y2020, &["Private room"], 0.0, 100.0));
    let summary = summarize(&view);
    assert_eq!(summary.count, 2);
    assert_eq!(summary.mean_reviews_per_month, Some(1.0));
}

#[test]
fn breakdown_sums_to_view_and_ranking_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<String> = (0..60)
        .map(|i| {
            let room = ["Private room", "Entire home/apt", "Shared room"][i % 3];
            format!("{i},n{i},{i},h,,x,40.0,-74.0,{room},{},1,0,,,1,0,City{}", 20 + i * 3, i % 20)
        })
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let cache = DatasetCache::new(SnapshotSources {
        snapshot_2020: write(dir.path(), "a.csv", &refs),
        snapshot_2023: write(dir.path(), "b.csv", &refs[..1]),
    });
    let ds = cache.get_or_load().unwrap();

    let p = FilterParams::defaults_for(&ds);
    let view = filter(&ds, &p);
    assert!(!view.is_empty());

    let breakdown = room_type_breakdown(&view);
    assert_eq!(breakdown.iter().map(|c| c.count).sum::<usize>(), view.len());

    let ranked = top_cities_by_mean_price(&view, 15);
    assert!(ranked.len() <= 15);
    assert!(ranked.windows(2).all(|w| w[0].mean_price >= w[1].mean_price));
}

#[test]
fn missing_2023_snapshot_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DatasetCache::new(SnapshotSources {
        snapshot_2020: write(dir.path(), "a.csv", &["1,a,1,h,,x,40.0,-74.0,Private room,10,1,0,,,1,0,X"]),
        snapshot_2023: dir.path().join("AB_US_2023.csv"),
    });
    let err = cache.get_or_load().unwrap_err();
    assert!(matches!(err, DataSourceError::Missing { .. }));
    assert_eq!(err.year(), SnapshotYear::Y2023);
    assert!(err.to_string().contains("AB_US_2023.csv"));
}
