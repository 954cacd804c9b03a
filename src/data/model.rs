use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::QueryError;

// ---------------------------------------------------------------------------
// ListingRecord – one row of the listings table
// ---------------------------------------------------------------------------

/// A single Airbnb listing.
///
/// Every attribute except `name` may be missing in the source file. Missing
/// and non-finite numeric cells are stored as `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingRecord {
    pub name: String,
    pub price: Option<f64>,
    /// Review score on a 0–100 scale.
    pub review_scores: Option<f64>,
    pub country: Option<String>,
    /// City market the listing belongs to (e.g. "Barcelona").
    pub market: Option<String>,
    pub property_type: Option<String>,
    pub room_type: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub availability_365: Option<u32>,
    pub availability_30: Option<u32>,
    pub accommodates: Option<u32>,
}

impl ListingRecord {
    /// Both coordinates, if the listing has them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// ListingRow – the fixed projection shown in the listings table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    pub name: String,
    pub price: Option<f64>,
    pub review_scores: Option<f64>,
    pub property_type: Option<String>,
    pub room_type: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
}

impl ListingRow {
    /// Column headers in display order.
    pub const COLUMNS: [&'static str; 7] = [
        "name",
        "price",
        "review_scores",
        "property_type",
        "room_type",
        "bedrooms",
        "bathrooms",
    ];
}

impl From<&ListingRecord> for ListingRow {
    fn from(rec: &ListingRecord) -> Self {
        ListingRow {
            name: rec.name.clone(),
            price: rec.price,
            review_scores: rec.review_scores,
            property_type: rec.property_type.clone(),
            room_type: rec.room_type.clone(),
            bedrooms: rec.bedrooms,
            bathrooms: rec.bathrooms,
        }
    }
}

// ---------------------------------------------------------------------------
// Field selectors
// ---------------------------------------------------------------------------

/// A numeric column of [`ListingRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Price,
    ReviewScores,
    Bedrooms,
    Bathrooms,
    Latitude,
    Longitude,
    Availability365,
    Availability30,
    Accommodates,
}

impl NumericField {
    pub const ALL: [NumericField; 9] = [
        NumericField::Price,
        NumericField::ReviewScores,
        NumericField::Bedrooms,
        NumericField::Bathrooms,
        NumericField::Latitude,
        NumericField::Longitude,
        NumericField::Availability365,
        NumericField::Availability30,
        NumericField::Accommodates,
    ];

    /// Column name as it appears in the source file.
    pub fn name(self) -> &'static str {
        match self {
            NumericField::Price => "price",
            NumericField::ReviewScores => "review_scores",
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::Latitude => "latitude",
            NumericField::Longitude => "longitude",
            NumericField::Availability365 => "availability_365",
            NumericField::Availability30 => "availability_30",
            NumericField::Accommodates => "accommodates",
        }
    }

    pub fn value(self, rec: &ListingRecord) -> Option<f64> {
        match self {
            NumericField::Price => rec.price,
            NumericField::ReviewScores => rec.review_scores,
            NumericField::Bedrooms => rec.bedrooms.map(f64::from),
            NumericField::Bathrooms => rec.bathrooms,
            NumericField::Latitude => rec.latitude,
            NumericField::Longitude => rec.longitude,
            NumericField::Availability365 => rec.availability_365.map(f64::from),
            NumericField::Availability30 => rec.availability_30.map(f64::from),
            NumericField::Accommodates => rec.accommodates.map(f64::from),
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumericField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| QueryError::UnknownNumericField(s.to_string()))
    }
}

/// A column of [`ListingRecord`] that can partition the dataset into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Name,
    Country,
    Market,
    PropertyType,
    RoomType,
    Bedrooms,
    Availability30,
    Accommodates,
}

impl CategoryField {
    pub const ALL: [CategoryField; 8] = [
        CategoryField::Name,
        CategoryField::Country,
        CategoryField::Market,
        CategoryField::PropertyType,
        CategoryField::RoomType,
        CategoryField::Bedrooms,
        CategoryField::Availability30,
        CategoryField::Accommodates,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoryField::Name => "name",
            CategoryField::Country => "country",
            CategoryField::Market => "market",
            CategoryField::PropertyType => "property_type",
            CategoryField::RoomType => "room_type",
            CategoryField::Bedrooms => "bedrooms",
            CategoryField::Availability30 => "availability_30",
            CategoryField::Accommodates => "accommodates",
        }
    }

    pub fn value(self, rec: &ListingRecord) -> Option<CategoryValue> {
        let text = |s: &Option<String>| s.clone().map(CategoryValue::Text);
        let int = |v: Option<u32>| v.map(|v| CategoryValue::Integer(i64::from(v)));
        match self {
            CategoryField::Name => Some(CategoryValue::Text(rec.name.clone())),
            CategoryField::Country => text(&rec.country),
            CategoryField::Market => text(&rec.market),
            CategoryField::PropertyType => text(&rec.property_type),
            CategoryField::RoomType => text(&rec.room_type),
            CategoryField::Bedrooms => int(rec.bedrooms),
            CategoryField::Availability30 => int(rec.availability_30),
            CategoryField::Accommodates => int(rec.accommodates),
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CategoryField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| QueryError::UnknownCategoryField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CategoryValue – a single group key
// ---------------------------------------------------------------------------

/// A group key. Integer-valued categories (e.g. `availability_30`) order
/// numerically, text categories lexicographically; integers sort first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Integer(i) => write!(f, "{i}"),
            CategoryValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for CategoryValue {
    fn from(s: &str) -> Self {
        CategoryValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded listings. Read-only once constructed; every view derives a copy.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    listings: Vec<ListingRecord>,
    /// Distinct countries in first-appearance order.
    countries: Vec<String>,
}

impl Dataset {
    /// Build the country index from the loaded listings.
    pub fn from_listings(listings: Vec<ListingRecord>) -> Self {
        let mut seen = BTreeSet::new();
        let countries = listings
            .iter()
            .filter_map(|rec| rec.country.as_ref())
            .filter(|country| seen.insert(country.as_str()))
            .cloned()
            .collect();
        Dataset {
            listings,
            countries,
        }
    }

    pub fn listings(&self) -> &[ListingRecord] {
        &self.listings
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Smallest and largest known price, or `None` if no listing has one.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.listings
            .iter()
            .filter_map(|rec| rec.price)
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, price: Option<f64>, country: Option<&str>) -> ListingRecord {
        ListingRecord {
            name: name.to_string(),
            price,
            country: country.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn countries_keep_first_appearance_order() {
        let ds = Dataset::from_listings(vec![
            listing("a", Some(10.0), Some("Spain")),
            listing("b", Some(20.0), None),
            listing("c", Some(30.0), Some("Brazil")),
            listing("d", Some(40.0), Some("Spain")),
        ]);
        assert_eq!(ds.countries(), ["Spain", "Brazil"]);
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn price_bounds_skip_missing_prices() {
        let ds = Dataset::from_listings(vec![
            listing("a", Some(80.0), None),
            listing("b", None, None),
            listing("c", Some(15.0), None),
        ]);
        assert_eq!(ds.price_bounds(), Some((15.0, 80.0)));
        assert_eq!(Dataset::default().price_bounds(), None);
    }

    #[test]
    fn field_names_parse_back() {
        for field in NumericField::ALL {
            assert_eq!(field.name().parse::<NumericField>(), Ok(field));
        }
        for field in CategoryField::ALL {
            assert_eq!(field.name().parse::<CategoryField>(), Ok(field));
        }
        assert_eq!(
            "cost".parse::<NumericField>(),
            Err(QueryError::UnknownNumericField("cost".into()))
        );
    }

    #[test]
    fn integer_categories_order_numerically() {
        let mut values = vec![
            CategoryValue::Integer(10),
            CategoryValue::Text("b".into()),
            CategoryValue::Integer(2),
            CategoryValue::Text("a".into()),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CategoryValue::Integer(2),
                CategoryValue::Integer(10),
                CategoryValue::Text("a".into()),
                CategoryValue::Text("b".into()),
            ]
        );
    }
}
