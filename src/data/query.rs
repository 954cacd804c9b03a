use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::error::QueryError;
use super::model::{ListingRecord, ListingRow};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Label of the "match every country" choice in the country selector.
pub const ALL_COUNTRIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryFilter {
    #[default]
    All,
    Only(String),
}

impl CountryFilter {
    /// Map a selector label to a filter; [`ALL_COUNTRIES`] matches everything.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_COUNTRIES {
            CountryFilter::All
        } else {
            CountryFilter::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CountryFilter::All => ALL_COUNTRIES,
            CountryFilter::Only(country) => country,
        }
    }

    fn matches(&self, country: Option<&str>) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::Only(wanted) => country == Some(wanted.as_str()),
        }
    }
}

/// User-chosen constraints deciding which listings are visible.
///
/// Ranges are inclusive on both ends. An inverted range (`min > max`) is
/// empty and therefore matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub price_range: RangeInclusive<f64>,
    pub rating_range: RangeInclusive<f64>,
    pub country: CountryFilter,
}

impl FilterCriteria {
    /// Whether a single listing passes all three predicates.
    ///
    /// A listing without a price or review score never matches.
    pub fn matches(&self, rec: &ListingRecord) -> bool {
        let in_range = |range: &RangeInclusive<f64>, value: Option<f64>| {
            value.is_some_and(|v| range.contains(&v))
        };
        in_range(&self.price_range, rec.price)
            && in_range(&self.rating_range, rec.review_scores)
            && self.country.matches(rec.country.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return the listings that satisfy `criteria`, in input order.
pub fn filter<'a, I>(listings: I, criteria: &FilterCriteria) -> Vec<&'a ListingRecord>
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    listings
        .into_iter()
        .filter(|rec| criteria.matches(rec))
        .collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortSpec {
    #[default]
    PriceAsc,
    PriceDesc,
    RatingAsc,
    RatingDesc,
}

impl SortSpec {
    pub const ALL: [SortSpec; 4] = [
        SortSpec::PriceAsc,
        SortSpec::PriceDesc,
        SortSpec::RatingAsc,
        SortSpec::RatingDesc,
    ];

    /// Label shown in the "Sort By" selector.
    pub fn label(self) -> &'static str {
        match self {
            SortSpec::PriceAsc => "Price (Low to High)",
            SortSpec::PriceDesc => "Price (High to Low)",
            SortSpec::RatingAsc => "Ratings (Low to High)",
            SortSpec::RatingDesc => "Ratings (High to Low)",
        }
    }

    fn key(self, row: &ListingRow) -> Option<f64> {
        match self {
            SortSpec::PriceAsc | SortSpec::PriceDesc => row.price,
            SortSpec::RatingAsc | SortSpec::RatingDesc => row.review_scores,
        }
    }

    fn descending(self) -> bool {
        matches!(self, SortSpec::PriceDesc | SortSpec::RatingDesc)
    }

    /// Missing keys go last in both directions.
    fn compare(self, a: &ListingRow, b: &ListingRow) -> Ordering {
        match (self.key(a), self.key(b)) {
            (Some(x), Some(y)) if self.descending() => y.total_cmp(&x),
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortSpec {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortSpec::ALL
            .into_iter()
            .find(|spec| spec.label() == s)
            .ok_or_else(|| QueryError::UnknownSortMode(s.to_string()))
    }
}

/// Project `listings` to table rows and order them per `spec`.
///
/// The sort is stable: rows with equal keys keep their input order.
pub fn sort<'a, I>(listings: I, spec: SortSpec) -> Vec<ListingRow>
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let mut rows: Vec<ListingRow> = listings.into_iter().map(ListingRow::from).collect();
    rows.sort_by(|a, b| spec.compare(a, b));
    rows
}
