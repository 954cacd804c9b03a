use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const LISTINGS: usize = 600;

/// (country, market, latitude, longitude, price level)
const MARKETS: [(&str, &str, f64, f64, f64); 8] = [
    ("United States", "New York", 40.71, -74.01, 180.0),
    ("United States", "Oahu", 21.31, -157.86, 240.0),
    ("Spain", "Barcelona", 41.39, 2.17, 110.0),
    ("Portugal", "Porto", 41.15, -8.61, 75.0),
    ("Brazil", "Rio De Janeiro", -22.91, -43.17, 260.0),
    ("Canada", "Montreal", 45.50, -73.57, 95.0),
    ("Australia", "Sydney", -33.87, 151.21, 190.0),
    ("Hong Kong", "Hong Kong", 22.32, 114.17, 600.0),
];

/// (property type, price factor)
const PROPERTY_TYPES: [(&str, f64); 6] = [
    ("Apartment", 1.0),
    ("House", 1.4),
    ("Condominium", 1.2),
    ("Loft", 1.3),
    ("Guesthouse", 0.8),
    ("Serviced apartment", 1.6),
];

const ROOM_TYPES: [(&str, f64); 3] = [
    ("Entire home/apt", 1.0),
    ("Private room", 0.55),
    ("Shared room", 0.3),
];

const ADJECTIVES: [&str; 6] = ["Cozy", "Sunny", "Modern", "Charming", "Quiet", "Spacious"];

#[derive(Debug, Serialize)]
struct SampleListing {
    name: String,
    price: f64,
    review_scores: Option<f64>,
    country: String,
    market: String,
    property_type: String,
    room_type: String,
    bedrooms: i64,
    bathrooms: f64,
    latitude: f64,
    longitude: f64,
    availability_365: i64,
    availability_30: i64,
    accommodates: i64,
}

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<SampleListing> {
    (0..LISTINGS)
        .map(|i| {
            let (country, market, lat, lon, level) = MARKETS[rng.below(MARKETS.len())];
            let (property_type, type_factor) = PROPERTY_TYPES[rng.below(PROPERTY_TYPES.len())];
            let (room_type, room_factor) = ROOM_TYPES[rng.below(ROOM_TYPES.len())];
            let bedrooms = 1 + rng.below(4) as i64;
            let accommodates = bedrooms * 2 - rng.below(2) as i64;

            let price = (level * type_factor * room_factor * (0.6 + 0.3 * bedrooms as f64)
                + rng.gauss(0.0, level * 0.15))
            .max(10.0)
            .round();
            // About one listing in ten has no reviews yet.
            let review_scores = (rng.next_f64() > 0.1)
                .then(|| rng.gauss(88.0, 8.0).clamp(20.0, 100.0).round());

            let availability_365 = rng.below(366) as i64;
            let availability_30 = (availability_365 * 30 / 365 + rng.below(5) as i64).min(30);

            SampleListing {
                name: format!(
                    "{} {} in {market} #{i}",
                    ADJECTIVES[rng.below(ADJECTIVES.len())],
                    property_type.to_lowercase()
                ),
                price,
                review_scores,
                country: country.to_string(),
                market: market.to_string(),
                property_type: property_type.to_string(),
                room_type: room_type.to_string(),
                bedrooms,
                bathrooms: 1.0 + 0.5 * rng.below(3) as f64,
                latitude: lat + rng.gauss(0.0, 0.05),
                longitude: lon + rng.gauss(0.0, 0.05),
                availability_365,
                availability_30,
                accommodates,
            }
        })
        .collect()
}

fn write_csv(listings: &[SampleListing], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for listing in listings {
        writer.serialize(listing).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(listings: &[SampleListing], path: &str) -> Result<()> {
    let text = |f: fn(&SampleListing) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(listings.iter().map(f).collect::<Vec<_>>()))
    };
    let float = |f: fn(&SampleListing) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(listings.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&SampleListing) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(listings.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
        Field::new("review_scores", DataType::Float64, true),
        Field::new("country", DataType::Utf8, false),
        Field::new("market", DataType::Utf8, false),
        Field::new("property_type", DataType::Utf8, false),
        Field::new("room_type", DataType::Utf8, false),
        Field::new("bedrooms", DataType::Int64, false),
        Field::new("bathrooms", DataType::Float64, false),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("availability_365", DataType::Int64, false),
        Field::new("availability_30", DataType::Int64, false),
        Field::new("accommodates", DataType::Int64, false),
    ]));

    let review_scores: ArrayRef = Arc::new(Float64Array::from(
        listings.iter().map(|l| l.review_scores).collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|l| &l.name),
            float(|l| l.price),
            review_scores,
            text(|l| &l.country),
            text(|l| &l.market),
            text(|l| &l.property_type),
            text(|l| &l.room_type),
            int(|l| l.bedrooms),
            float(|l| l.bathrooms),
            float(|l| l.latitude),
            float(|l| l.longitude),
            int(|l| l.availability_365),
            int(|l| l.availability_30),
            int(|l| l.accommodates),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let listings = generate(&mut rng);

    write_csv(&listings, "sample_listings.csv")?;
    write_parquet(&listings, "sample_listings.parquet")?;

    println!(
        "Wrote {} listings across {} markets to sample_listings.csv and sample_listings.parquet",
        listings.len(),
        MARKETS.len()
    );
    Ok(())
}
