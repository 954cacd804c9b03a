use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Dataset, ListingRecord};

/// Columns every tabular source must provide. `market` is optional.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "name",
    "price",
    "review_scores",
    "country",
    "property_type",
    "room_type",
    "bedrooms",
    "bathrooms",
    "latitude",
    "longitude",
    "availability_365",
    "availability_30",
    "accommodates",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the [`REQUIRED_COLUMNS`] (recommended)
/// * `.json`    – `[{ "name": "...", "price": 80.0, ... }, ...]`
/// * `.parquet` – one column per listing attribute
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let listings = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    Ok(Dataset::from_listings(listings))
}

// ---------------------------------------------------------------------------
// Row decoding shared by all formats
// ---------------------------------------------------------------------------

/// One row as it appears in the source. Integer columns are read as floats
/// because pandas exports them as `2.0` once a column contains a null.
#[derive(Debug, Default, Deserialize)]
struct RawListing {
    name: Option<String>,
    price: Option<f64>,
    review_scores: Option<f64>,
    country: Option<String>,
    market: Option<String>,
    property_type: Option<String>,
    room_type: Option<String>,
    bedrooms: Option<f64>,
    bathrooms: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    availability_365: Option<f64>,
    availability_30: Option<f64>,
    accommodates: Option<f64>,
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn count(v: Option<f64>) -> Option<u32> {
    finite(v)
        .filter(|x| *x >= 0.0 && *x <= f64::from(u32::MAX))
        .map(|x| x.round() as u32)
}

fn text(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl From<RawListing> for ListingRecord {
    fn from(raw: RawListing) -> Self {
        ListingRecord {
            name: text(raw.name).unwrap_or_default(),
            price: finite(raw.price),
            review_scores: finite(raw.review_scores),
            country: text(raw.country),
            market: text(raw.market),
            property_type: text(raw.property_type),
            room_type: text(raw.room_type),
            bedrooms: count(raw.bedrooms),
            bathrooms: finite(raw.bathrooms),
            latitude: finite(raw.latitude),
            longitude: finite(raw.longitude),
            availability_365: count(raw.availability_365),
            availability_30: count(raw.availability_30),
            accommodates: count(raw.accommodates),
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one listing per row.
/// Empty cells are missing values; unknown columns are ignored. Headers and
/// cells are trimmed before they are matched or decoded.
fn load_csv(path: &Path) -> Result<Vec<ListingRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    reader
        .deserialize::<RawListing>()
        .enumerate()
        .map(|(row_no, result)| {
            result
                .map(ListingRecord::from)
                .with_context(|| format!("CSV row {row_no}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "name": "Ribeira Charming Duplex", "price": 80.0, "review_scores": 89, ... },
///   ...
/// ]
/// ```
///
/// Absent keys and `null` are missing values.
fn load_json(path: &Path) -> Result<Vec<ListingRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<RawListing> =
        serde_json::from_str(&text).context("Expected a JSON array of listing objects")?;
    Ok(records.into_iter().map(ListingRecord::from).collect())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per listing attribute.
///
/// Numeric columns may be any of Int32/Int64/Float32/Float64 (pandas and
/// Polars pick different widths); text columns Utf8 or LargeUtf8.
fn load_parquet(path: &Path) -> Result<Vec<ListingRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    for column in REQUIRED_COLUMNS {
        if schema.index_of(column).is_err() {
            bail!("Parquet file missing '{column}' column");
        }
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut listings = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let column = |name: &str| batch.column_by_name(name);

        for row in 0..batch.num_rows() {
            let num = |name: &str| column(name).and_then(|col| extract_f64(col, row));
            let txt = |name: &str| column(name).and_then(|col| extract_string(col, row));

            let raw = RawListing {
                name: txt("name"),
                price: num("price"),
                review_scores: num("review_scores"),
                country: txt("country"),
                market: txt("market"),
                property_type: txt("property_type"),
                room_type: txt("room_type"),
                bedrooms: num("bedrooms"),
                bathrooms: num("bathrooms"),
                latitude: num("latitude"),
                longitude: num("longitude"),
                availability_365: num("availability_365"),
                availability_30: num("availability_30"),
                accommodates: num("accommodates"),
            };
            listings.push(ListingRecord::from(raw));
        }
    }

    Ok(listings)
}

// -- Parquet / Arrow helpers --

/// Read a numeric cell; nulls and non-numeric columns yield `None`.
fn extract_f64(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(row)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| f64::from(a.value(row))),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| f64::from(a.value(row))),
        DataType::Utf8 | DataType::LargeUtf8 => {
            extract_string(col, row).and_then(|s| s.parse().ok())
        }
        _ => None,
    }
}

/// Read a text cell; numbers are rendered to text so integer-coded
/// categories survive.
fn extract_string(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| a.value(row).to_string()),
        DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64 => {
            extract_f64(col, row).map(|v| v.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "name,price,review_scores,country,market,property_type,room_type,\
bedrooms,bathrooms,latitude,longitude,availability_365,availability_30,accommodates";

    fn write(dir: &tempfile::TempDir, file: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(file);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn csv_rows_become_listings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = format!(
            "{HEADER}\n\
             Ribeira Duplex,80,89,Portugal,Porto,House,Entire home/apt,3.0,1.0,41.14,-8.61,239,28,8\n\
             Quiet Room,,,,,Apartment,Private room,,,,,,,\n"
        );
        let path = write(&dir, "listings.csv", &csv);

        let ds = load_file(&path).expect("load csv");
        assert_eq!(ds.len(), 2);

        let first = &ds.listings()[0];
        assert_eq!(first.name, "Ribeira Duplex");
        assert_eq!(first.price, Some(80.0));
        assert_eq!(first.country.as_deref(), Some("Portugal"));
        assert_eq!(first.market.as_deref(), Some("Porto"));
        assert_eq!(first.bedrooms, Some(3));
        assert_eq!(first.coordinates(), Some((41.14, -8.61)));
        assert_eq!(first.availability_30, Some(28));

        let second = &ds.listings()[1];
        assert_eq!(second.price, None);
        assert_eq!(second.country, None);
        assert_eq!(second.room_type.as_deref(), Some("Private room"));
        assert_eq!(ds.countries(), ["Portugal"]);
    }

    #[test]
    fn csv_without_market_column_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let header = HEADER.replace(",market", "");
        let csv = format!("{header}\nLoft,120,95,Spain,Loft,Entire home/apt,1,1,41.3,2.1,10,3,2\n");
        let path = write(&dir, "listings.csv", &csv);

        let ds = load_file(&path).expect("load csv");
        assert_eq!(ds.listings()[0].market, None);
        assert_eq!(ds.listings()[0].property_type.as_deref(), Some("Loft"));
    }

    #[test]
    fn padded_headers_still_decode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let header = HEADER.replace(",price,", ", price ,").replace("country", "country ");
        let csv = format!("{header}
Loft, 120 ,95,Spain,,Loft,Entire home/apt,1,1,41.3,2.1,10,3,2
");
        let path = write(&dir, "listings.csv", &csv);

        let ds = load_file(&path).expect("load csv");
        assert_eq!(ds.listings()[0].price, Some(120.0));
        assert_eq!(ds.listings()[0].country.as_deref(), Some("Spain"));
    }

    #[test]
    fn nan_cells_are_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = format!("{HEADER}\nLoft,NaN,95,Spain,,Loft,Entire home/apt,NaN,1,41.3,2.1,10,3,2\n");
        let path = write(&dir, "listings.csv", &csv);

        let ds = load_file(&path).expect("load csv");
        assert_eq!(ds.listings()[0].price, None);
        assert_eq!(ds.listings()[0].bedrooms, None);
    }

    #[test]
    fn csv_missing_required_column_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "listings.csv", "name,price\nLoft,100\n");

        let err = load_file(&path).expect_err("expected missing column error");
        assert!(
            format!("{err:#}").contains("CSV missing 'review_scores' column"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn malformed_number_fails_with_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv = format!("{HEADER}\nLoft,cheap,95,Spain,,Loft,Entire home/apt,1,1,41.3,2.1,10,3,2\n");
        let path = write(&dir, "listings.csv", &csv);

        let err = load_file(&path).expect_err("expected parse error");
        assert!(format!("{err:#}").contains("CSV row 0"), "unexpected error: {err:#}");
    }

    #[test]
    fn missing_file_and_unknown_extension_fail() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_file(&dir.path().join("absent.csv")).is_err());

        let path = write(&dir, "listings.xlsx", "");
        let err = load_file(&path).expect_err("expected unsupported extension");
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }

    #[test]
    fn json_records_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = r#"[
            {"name": "Loft", "price": 120, "review_scores": 95, "country": "Spain",
             "bedrooms": 2, "latitude": 41.3, "longitude": 2.1, "extra": [1, 2]},
            {"name": "Cabin", "price": null, "country": "Canada"}
        ]"#;
        let path = write(&dir, "listings.json", json);

        let ds = load_file(&path).expect("load json");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.listings()[0].bedrooms, Some(2));
        assert_eq!(ds.listings()[1].price, None);
        assert_eq!(ds.countries(), ["Spain", "Canada"]);
    }

    #[test]
    fn json_that_is_not_an_array_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "listings.json", r#"{"name": "Loft"}"#);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_columns_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("listings.parquet");

        let mut fields = Vec::new();
        let mut columns: Vec<ArrayRef> = Vec::new();
        for column in REQUIRED_COLUMNS {
            match column {
                "name" | "country" | "property_type" | "room_type" => {
                    fields.push(Field::new(column, DataType::Utf8, true));
                    let value = match column {
                        "name" => "Loft",
                        "country" => "Spain",
                        "property_type" => "Loft",
                        _ => "Entire home/apt",
                    };
                    columns.push(Arc::new(StringArray::from(vec![Some(value), None])));
                }
                "bedrooms" | "availability_365" | "availability_30" | "accommodates" => {
                    fields.push(Field::new(column, DataType::Int64, true));
                    columns.push(Arc::new(Int64Array::from(vec![Some(2), None])));
                }
                _ => {
                    fields.push(Field::new(column, DataType::Float64, true));
                    columns.push(Arc::new(Float64Array::from(vec![Some(99.5), None])));
                }
            }
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).expect("record batch");

        let file = std::fs::File::create(&path).expect("create parquet");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");

        let ds = load_file(&path).expect("load parquet");
        assert_eq!(ds.len(), 2);
        let first = &ds.listings()[0];
        assert_eq!(first.name, "Loft");
        assert_eq!(first.price, Some(99.5));
        assert_eq!(first.bedrooms, Some(2));
        assert_eq!(first.market, None);
        assert_eq!(ds.listings()[1], ListingRecord::default());
    }
}
