use serde::Serialize;

use super::{
    bar_chart, pie_chart, scatter_map, BarChartConfig, BarChartSpec, Palette, PieChartSpec,
    ScatterMapConfig, ScatterMapSpec,
};
use crate::data::aggregate::group_mean;
use crate::data::model::{CategoryField, Dataset, NumericField};

/// The precomputed charts of the "Data Insights" page.
///
/// Built from the full dataset, independent of the sidebar filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub country_prices: BarChartSpec,
    pub availability_by_property_type: PieChartSpec,
    pub property_type_prices: BarChartSpec,
    pub availability_demand: BarChartSpec,
    pub occupancy_map: ScatterMapSpec,
}

impl Insights {
    pub fn build(dataset: &Dataset) -> Self {
        let listings = dataset.listings();
        log::debug!("Building insight charts for {} listings", listings.len());

        let mut country_prices = BarChartConfig::new(CategoryField::Country, NumericField::Price);
        country_prices.color = Some(CategoryField::Market);
        country_prices.title = Some("Country-wise Prices".into());
        country_prices
            .labels
            .insert("price".into(), "Average Price".into());
        country_prices.category_order = Some(
            group_mean(listings, CategoryField::Country, NumericField::Price).category_order(),
        );
        country_prices.palette = Palette::Set1;
        country_prices.xaxis_title = Some("Country".into());
        country_prices.yaxis_title = Some("Average Price".into());

        let mut property_type_prices =
            BarChartConfig::new(CategoryField::PropertyType, NumericField::Price);
        property_type_prices.title = Some("Property Type Vs Price".into());
        property_type_prices
            .labels
            .insert("price".into(), "Average Price".into());
        property_type_prices.category_order = Some(
            group_mean(listings, CategoryField::PropertyType, NumericField::Price)
                .category_order(),
        );
        property_type_prices.palette = Palette::Set2;
        property_type_prices.xaxis_title = Some("Property Type".into());
        property_type_prices.yaxis_title = Some("Average Price".into());

        let mut availability_demand =
            BarChartConfig::new(CategoryField::Availability30, NumericField::Accommodates);
        availability_demand.title = Some("Availability Patterns and Demand Fluctuations".into());
        availability_demand.labels.insert(
            "availability_30".into(),
            "Availability in the Last 30 Days".into(),
        );
        availability_demand
            .labels
            .insert("accommodates".into(), "Accommodates".into());
        availability_demand.palette = Palette::Set2;
        availability_demand.xaxis_title = Some("Availability in the Last 30 Days".into());
        availability_demand.yaxis_title = Some("Accommodates".into());
        availability_demand.legend_title = Some("Accommodates".into());

        let occupancy_map = ScatterMapConfig {
            color: Some(NumericField::Availability365),
            size: Some(NumericField::Availability365),
            hover_name: Some(CategoryField::Name),
            title: Some("Occupancy Rates on the Map".into()),
            ..Default::default()
        };

        Insights {
            country_prices: bar_chart(listings, &country_prices),
            availability_by_property_type: pie_chart(
                listings,
                NumericField::Availability365,
                CategoryField::PropertyType,
                "Availability Distribution by Property Type",
            ),
            property_type_prices: bar_chart(listings, &property_type_prices),
            availability_demand: bar_chart(listings, &availability_demand),
            occupancy_map: scatter_map(listings, &occupancy_map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CategoryValue, ListingRecord};

    fn dataset() -> Dataset {
        let rec = |country: &str, kind: &str, price: f64, avail30: u32| ListingRecord {
            name: format!("{kind} in {country}"),
            price: Some(price),
            review_scores: Some(90.0),
            country: Some(country.into()),
            property_type: Some(kind.into()),
            availability_365: Some(avail30 * 10),
            availability_30: Some(avail30),
            accommodates: Some(2),
            latitude: Some(1.0),
            longitude: Some(1.0),
            ..Default::default()
        };
        Dataset::from_listings(vec![
            rec("US", "Loft", 100.0, 3),
            rec("US", "House", 50.0, 30),
            rec("FR", "House", 200.0, 3),
        ])
    }

    #[test]
    fn country_axis_follows_mean_price() {
        let insights = Insights::build(&dataset());
        assert_eq!(
            insights.country_prices.categories,
            vec![CategoryValue::from("FR"), CategoryValue::from("US")]
        );
        assert_eq!(insights.country_prices.y_title, "Average Price");
        assert_eq!(
            insights.property_type_prices.categories,
            vec![CategoryValue::from("House"), CategoryValue::from("Loft")]
        );
    }

    #[test]
    fn availability_axis_is_numeric() {
        let insights = Insights::build(&dataset());
        assert_eq!(
            insights.availability_demand.categories,
            vec![CategoryValue::Integer(3), CategoryValue::Integer(30)]
        );
        assert_eq!(insights.occupancy_map.points.len(), 3);
        assert_eq!(insights.occupancy_map.color_range, Some((30.0, 300.0)));
        assert_eq!(insights.availability_by_property_type.slices.len(), 2);
    }
}
