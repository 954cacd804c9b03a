use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{CategoryField, CategoryValue, ListingRecord, NumericField};

// ---------------------------------------------------------------------------
// Grouped statistics
// ---------------------------------------------------------------------------

/// One partition of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub category: CategoryValue,
    /// Mean (for [`group_mean`]) or sum (for [`group_sum`]) of the value
    /// field. `None` when no record of the group has a value to average.
    pub value: Option<f64>,
    /// Records in the partition, including those missing the value field.
    pub size: usize,
}

/// Result of a grouped aggregation, ordered by `value` descending with
/// valueless groups last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub group_field: CategoryField,
    pub value_field: NumericField,
    pub groups: Vec<GroupStat>,
}

impl AggregationResult {
    /// Categories in display order (largest value first, groups without a
    /// value last).
    pub fn category_order(&self) -> Vec<CategoryValue> {
        self.groups.iter().map(|g| g.category.clone()).collect()
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    counted: usize,
    size: usize,
}

fn accumulate<'a, I>(
    listings: I,
    group_field: CategoryField,
    value_field: NumericField,
) -> BTreeMap<CategoryValue, Accumulator>
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let mut groups: BTreeMap<CategoryValue, Accumulator> = BTreeMap::new();
    for rec in listings {
        let Some(category) = group_field.value(rec) else {
            continue;
        };
        let acc = groups.entry(category).or_default();
        acc.size += 1;
        if let Some(v) = value_field.value(rec) {
            acc.sum += v;
            acc.counted += 1;
        }
    }
    groups
}

fn ordered(
    group_field: CategoryField,
    value_field: NumericField,
    mut groups: Vec<GroupStat>,
) -> AggregationResult {
    // Stable sort: equal values keep the natural category order of the BTreeMap.
    groups.sort_by(|a, b| match (a.value, b.value) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    AggregationResult {
        group_field,
        value_field,
        groups,
    }
}

/// Mean of `value_field` per distinct `group_field`, largest mean first.
///
/// Listings without a group value are skipped. Listings without a value are
/// counted in the group size but not in the mean; a group with no values at
/// all is kept with its size and no mean, after every group that has one.
pub fn group_mean<'a, I>(
    listings: I,
    group_field: CategoryField,
    value_field: NumericField,
) -> AggregationResult
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let groups = accumulate(listings, group_field, value_field)
        .into_iter()
        .map(|(category, acc)| GroupStat {
            category,
            value: (acc.counted > 0).then(|| acc.sum / acc.counted as f64),
            size: acc.size,
        })
        .collect();
    ordered(group_field, value_field, groups)
}

/// Sum of `value_field` per distinct `group_field`, largest sum first. A
/// group with no values sums to zero.
pub fn group_sum<'a, I>(
    listings: I,
    group_field: CategoryField,
    value_field: NumericField,
) -> AggregationResult
where
    I: IntoIterator<Item = &'a ListingRecord>,
{
    let groups = accumulate(listings, group_field, value_field)
        .into_iter()
        .map(|(category, acc)| GroupStat {
            category,
            value: Some(acc.sum),
            size: acc.size,
        })
        .collect();
    ordered(group_field, value_field, groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(result: &AggregationResult, category: &str) -> Option<f64> {
        let category = CategoryValue::from(category);
        result
            .groups
            .iter()
            .find(|g| g.category == category)
            .and_then(|g| g.value)
    }

    fn listing(price: Option<f64>, country: Option<&str>, kind: &str) -> ListingRecord {
        ListingRecord {
            name: format!("{kind} in {country:?}"),
            price,
            country: country.map(str::to_string),
            property_type: Some(kind.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn mean_price_per_country() {
        let data = vec![
            listing(Some(100.0), Some("US"), "Loft"),
            listing(Some(50.0), Some("US"), "Cabin"),
            listing(Some(200.0), Some("FR"), "Villa"),
        ];
        let result = group_mean(&data, CategoryField::Country, NumericField::Price);
        assert_eq!(
            result.category_order(),
            vec![CategoryValue::from("FR"), CategoryValue::from("US")]
        );
        assert_eq!(value_of(&result, "FR"), Some(200.0));
        assert_eq!(value_of(&result, "US"), Some(75.0));
    }

    #[test]
    fn missing_values_skip_the_mean_and_missing_groups_are_excluded() {
        let data = vec![
            listing(Some(100.0), Some("US"), "Loft"),
            listing(None, Some("US"), "Loft"),
            listing(Some(10.0), None, "Loft"),
        ];
        let result = group_mean(&data, CategoryField::Country, NumericField::Price);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].value, Some(100.0));
        assert_eq!(result.groups[0].size, 2);
    }

    #[test]
    fn group_without_values_is_kept_last_with_its_size() {
        let data = vec![
            listing(None, Some("AR"), "Loft"),
            listing(Some(100.0), Some("US"), "Loft"),
            listing(None, Some("BR"), "Loft"),
            listing(None, Some("BR"), "Villa"),
            listing(Some(300.0), Some("FR"), "Loft"),
        ];
        let result = group_mean(&data, CategoryField::Country, NumericField::Price);
        assert_eq!(
            result.category_order(),
            vec![
                CategoryValue::from("FR"),
                CategoryValue::from("US"),
                CategoryValue::from("AR"),
                CategoryValue::from("BR"),
            ]
        );
        let brazil = &result.groups[3];
        assert_eq!(brazil.value, None);
        assert_eq!(brazil.size, 2);
        let total: usize = result.groups.iter().map(|g| g.size).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn group_sizes_add_up_to_grouped_records() {
        let data = vec![
            listing(Some(1.0), Some("US"), "Loft"),
            listing(Some(2.0), Some("FR"), "Loft"),
            listing(Some(3.0), Some("US"), "Villa"),
            listing(Some(4.0), None, "Villa"),
        ];
        let result = group_mean(&data, CategoryField::Country, NumericField::Price);
        let total: usize = result.groups.iter().map(|g| g.size).sum();
        assert_eq!(total, 3);
        assert!(result.groups.windows(2).all(|w| w[0].value >= w[1].value));
        assert!(result.groups.iter().all(|g| g.value.is_some()));
    }

    #[test]
    fn ties_fall_back_to_category_order() {
        let data = vec![
            listing(Some(80.0), Some("Spain"), "Loft"),
            listing(Some(80.0), Some("Brazil"), "Loft"),
            listing(Some(90.0), Some("Turkey"), "Loft"),
        ];
        let result = group_mean(&data, CategoryField::Country, NumericField::Price);
        assert_eq!(
            result.category_order(),
            vec![
                CategoryValue::from("Turkey"),
                CategoryValue::from("Brazil"),
                CategoryValue::from("Spain"),
            ]
        );
    }

    #[test]
    fn sum_per_property_type() {
        let mut data = vec![
            listing(None, None, "Loft"),
            listing(None, None, "Loft"),
            listing(None, None, "Villa"),
        ];
        data[0].availability_365 = Some(100);
        data[1].availability_365 = Some(50);
        data[2].availability_365 = Some(365);
        let result = group_sum(
            &data,
            CategoryField::PropertyType,
            NumericField::Availability365,
        );
        assert_eq!(value_of(&result, "Villa"), Some(365.0));
        assert_eq!(value_of(&result, "Loft"), Some(150.0));
        assert_eq!(result.groups[0].category, CategoryValue::from("Villa"));
    }
}
