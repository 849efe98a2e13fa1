use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataSourceError;
use super::model::{Listing, SnapshotYear};

/// Columns every snapshot must carry, in either format.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "host_id",
    "city",
    "room_type",
    "price",
    "minimum_nights",
    "number_of_reviews",
    "reviews_per_month",
    "latitude",
    "longitude",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Locations of the two snapshot tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSources {
    pub snapshot_2020: PathBuf,
    pub snapshot_2023: PathBuf,
}

impl SnapshotSources {
    pub fn path_for(&self, year: SnapshotYear) -> &Path {
        match year {
            SnapshotYear::Y2020 => &self.snapshot_2020,
            SnapshotYear::Y2023 => &self.snapshot_2023,
        }
    }
}

/// Read both snapshots, tagging each row with its year.
pub fn load(sources: &SnapshotSources) -> Result<(Vec<Listing>, Vec<Listing>), DataSourceError> {
    let first = load_snapshot(sources.path_for(SnapshotYear::Y2020), SnapshotYear::Y2020)?;
    let second = load_snapshot(sources.path_for(SnapshotYear::Y2023), SnapshotYear::Y2023)?;
    Ok((first, second))
}

/// Load one snapshot table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least [`REQUIRED_COLUMNS`]
/// * `.parquet` – same columns; ints, floats and strings are coerced
pub fn load_snapshot(path: &Path, year: SnapshotYear) -> Result<Vec<Listing>, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let listings = match ext.as_str() {
        "csv" => load_csv(path, year)?,
        "parquet" | "pq" => load_parquet(path, year)?,
        other => {
            return Err(malformed(
                year,
                path,
                format!("unsupported file extension '.{other}'"),
            ))
        }
    };

    if listings.is_empty() {
        return Err(DataSourceError::Empty {
            year,
            path: path.to_path_buf(),
        });
    }

    log::info!(
        "Loaded {} {year} listings from {}",
        listings.len(),
        path.display()
    );
    Ok(listings)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, year: SnapshotYear) -> Result<Vec<Listing>, DataSourceError> {
    let file = open(path, year)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(year, path, "reading header", e))?
        .clone();
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|&&col| !headers.iter().any(|h| h == col))
    {
        return Err(malformed(year, path, format!("missing '{column}' column")));
    }

    let mut listings = Vec::new();
    for (row_no, result) in reader.deserialize::<Listing>().enumerate() {
        let mut listing =
            result.map_err(|e| csv_error(year, path, &format!("row {}", row_no + 1), e))?;
        listing.year = year;
        listings.push(listing);
    }
    Ok(listings)
}

fn csv_error(year: SnapshotYear, path: &Path, what: &str, err: csv::Error) -> DataSourceError {
    if err.is_io_error() {
        DataSourceError::Unreadable {
            year,
            path: path.to_path_buf(),
            source: io::Error::from(err),
        }
    } else {
        malformed(year, path, format!("{what}: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); integer columns that pandas widened
/// to float because of nulls are accepted.
fn load_parquet(path: &Path, year: SnapshotYear) -> Result<Vec<Listing>, DataSourceError> {
    let file = open(path, year)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| malformed(year, path, format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| malformed(year, path, format!("building parquet reader: {e}")))?;

    let mut listings = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| malformed(year, path, format!("reading parquet record batch: {e}")))?;
        let columns = ListingColumns::locate(&batch).map_err(|reason| malformed(year, path, reason))?;

        let offset = listings.len();
        for row in 0..batch.num_rows() {
            let listing = columns
                .listing(row, year)
                .map_err(|reason| malformed(year, path, format!("row {}: {reason}", offset + row + 1)))?;
            listings.push(listing);
        }
    }
    Ok(listings)
}

/// Column handles for one record batch.
struct ListingColumns<'a> {
    id: &'a ArrayRef,
    name: &'a ArrayRef,
    host_id: &'a ArrayRef,
    host_name: Option<&'a ArrayRef>,
    neighbourhood: Option<&'a ArrayRef>,
    latitude: &'a ArrayRef,
    longitude: &'a ArrayRef,
    room_type: &'a ArrayRef,
    price: &'a ArrayRef,
    minimum_nights: &'a ArrayRef,
    number_of_reviews: &'a ArrayRef,
    last_review: Option<&'a ArrayRef>,
    reviews_per_month: &'a ArrayRef,
    availability_365: Option<&'a ArrayRef>,
    city: &'a ArrayRef,
}

impl<'a> ListingColumns<'a> {
    fn locate(batch: &'a RecordBatch) -> Result<Self, String> {
        let required = |name: &str| required_column(batch, name);
        Ok(ListingColumns {
            id: required("id")?,
            name: required("name")?,
            host_id: required("host_id")?,
            host_name: batch.column_by_name("host_name"),
            neighbourhood: batch.column_by_name("neighbourhood"),
            latitude: required("latitude")?,
            longitude: required("longitude")?,
            room_type: required("room_type")?,
            price: required("price")?,
            minimum_nights: required("minimum_nights")?,
            number_of_reviews: required("number_of_reviews")?,
            last_review: batch.column_by_name("last_review"),
            reviews_per_month: required("reviews_per_month")?,
            availability_365: batch.column_by_name("availability_365"),
            city: required("city")?,
        })
    }

    fn listing(&self, row: usize, year: SnapshotYear) -> Result<Listing, String> {
        Ok(Listing {
            id: present(cell_i64(self.id, row), "id")?,
            name: cell_string(self.name, row).unwrap_or_default(),
            host_id: present(cell_i64(self.host_id, row), "host_id")?,
            host_name: self.host_name.and_then(|c| cell_string(c, row)),
            neighbourhood: self.neighbourhood.and_then(|c| cell_string(c, row)),
            latitude: present(cell_f64(self.latitude, row), "latitude")?,
            longitude: present(cell_f64(self.longitude, row), "longitude")?,
            room_type: present(cell_string(self.room_type, row), "room_type")?,
            price: cell_f64(self.price, row),
            minimum_nights: present(cell_u32(self.minimum_nights, row), "minimum_nights")?,
            number_of_reviews: present(cell_u32(self.number_of_reviews, row), "number_of_reviews")?,
            last_review: self.last_review.and_then(|c| cell_string(c, row)),
            reviews_per_month: cell_f64(self.reviews_per_month, row),
            availability_365: self.availability_365.and_then(|c| cell_u32(c, row)),
            city: present(cell_string(self.city, row), "city")?,
            year,
        })
    }
}

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, String> {
    batch
        .column_by_name(name)
        .ok_or_else(|| format!("missing '{name}' column"))
}

// -- Arrow cell helpers --

fn present<T>(value: Option<T>, column: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("missing or invalid '{column}'"))
}

fn cell_string(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        DataType::Int64 | DataType::Int32 => cell_i64(col, row).map(|v| v.to_string()),
        _ => None,
    }
}

fn cell_f64(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        DataType::Utf8 | DataType::LargeUtf8 => cell_string(col, row)?.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn cell_i64(col: &ArrayRef, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row)),
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Float64 | DataType::Float32 => {
            let v = cell_f64(col, row)?;
            (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
        }
        DataType::Utf8 | DataType::LargeUtf8 => cell_string(col, row)?.trim().parse().ok(),
        _ => None,
    }
}

fn cell_u32(col: &ArrayRef, row: usize) -> Option<u32> {
    cell_i64(col, row).and_then(|v| u32::try_from(v).ok())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn open(path: &Path, year: SnapshotYear) -> Result<File, DataSourceError> {
    File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DataSourceError::Missing {
                year,
                path: path.to_path_buf(),
            }
        } else {
            DataSourceError::Unreadable {
                year,
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn malformed(year: SnapshotYear, path: &Path, reason: String) -> DataSourceError {
    DataSourceError::Malformed {
        year,
        path: path.to_path_buf(),
        reason,
    }
}
