//! Writes deterministic synthetic `AB_US_2020.csv` / `AB_US_2023.csv`
//! snapshots so the dashboard can be tried without the real data.
//!
//! Usage: `generate_sample [OUTPUT_DIR] [ROWS_PER_YEAR]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use listing_lens::data::model::{Listing, SnapshotYear};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// (city, latitude, longitude, typical nightly price)
const CITIES: [(&str, f64, f64, f64); 8] = [
    ("Asheville", 35.59, -82.55, 130.0),
    ("Austin", 30.27, -97.74, 180.0),
    ("Boston", 42.36, -71.06, 190.0),
    ("Chicago", 41.88, -87.63, 140.0),
    ("Hawaii", 20.80, -156.33, 260.0),
    ("Los Angeles", 34.05, -118.24, 210.0),
    ("New York City", 40.71, -74.01, 200.0),
    ("Seattle", 47.61, -122.33, 160.0),
];

/// (room type, price multiplier, cumulative weight in percent)
const ROOM_TYPES: [(&str, f64, usize); 4] = [
    ("Entire home/apt", 1.4, 62),
    ("Private room", 0.6, 92),
    ("Hotel room", 1.1, 96),
    ("Shared room", 0.35, 100),
];

fn generate(year: SnapshotYear, rows: usize, rng: &mut SimpleRng) -> Vec<Listing> {
    let inflation = match year {
        SnapshotYear::Y2020 => 1.0,
        SnapshotYear::Y2023 => 1.25,
    };
    let id_base: i64 = match year {
        SnapshotYear::Y2020 => 1_000_000,
        SnapshotYear::Y2023 => 50_000_000,
    };

    (0..rows)
        .map(|i| {
            let (city, lat, lon, base) = CITIES[rng.below(CITIES.len())];
            let roll = rng.below(100);
            let (room_type, factor, _) = ROOM_TYPES
                .iter()
                .copied()
                .find(|&(_, _, cumulative)| roll < cumulative)
                .unwrap_or(ROOM_TYPES[0]);

            // Log-normal-ish prices; a few rows without a price.
            let price = (rng.next_f64() > 0.01).then(|| {
                (base * factor * inflation * rng.gauss(0.0, 0.45).exp())
                    .round()
                    .max(10.0)
            });
            let reviews = (rng.next_f64() * 120.0) as u32;
            let reviews_per_month = (reviews > 0).then(|| (rng.next_f64() * 400.0).round() / 100.0);

            Listing {
                id: id_base + i as i64,
                name: format!("{room_type} in {city} #{i}"),
                host_id: 10_000 + rng.below(rows.max(1) / 2 + 1) as i64,
                host_name: Some(format!("Host{}", rng.below(500))),
                neighbourhood: None,
                latitude: rng.gauss(lat, 0.05),
                longitude: rng.gauss(lon, 0.05),
                room_type: room_type.to_string(),
                price,
                minimum_nights: 1 + rng.below(7) as u32,
                number_of_reviews: reviews,
                last_review: None,
                reviews_per_month,
                availability_365: Some(rng.below(366) as u32),
                city: city.to_string(),
                year,
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 5000,
    };

    let mut rng = SimpleRng::new(42);
    for year in SnapshotYear::ALL {
        let path = out_dir.join(format!("AB_US_{year}.csv"));
        let mut writer =
            csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
        for listing in generate(year, rows, &mut rng) {
            writer.serialize(&listing).context("writing listing")?;
        }
        writer.flush().context("flushing CSV")?;
        println!("Wrote {rows} {year} listings to {}", path.display());
    }
    Ok(())
}
