//! Synthetic sales dataset generation.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data::table::SalesTable;
use crate::domain::{AnalysisConfig, Product, Region, SalesRow};
use crate::error::AppError;

/// Number of monthly points generated per run.
pub const MONTHS: u32 = 12;

/// Generate one row per (month, region, product), in that nesting order.
///
/// Filters on the config are not applied here; the full dataset is always
/// 12 × 4 × 3 rows.
pub fn generate_sample(config: &AnalysisConfig) -> Result<SalesTable, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let mut rows = Vec::with_capacity((MONTHS as usize) * Region::ALL.len() * Product::ALL.len());

    for month in 1..=MONTHS {
        let date = NaiveDate::from_ymd_opt(config.year, month, 1)
            .ok_or_else(|| AppError::config(format!("Invalid year {}.", config.year)))?;
        let season = seasonal_factor(month, config.seasonality);

        for region in Region::ALL {
            for product in Product::ALL {
                let level = rng.gen_range(config.sales_min..config.sales_max);
                let sales = round_cents(level * season);
                let ratio = rng.gen_range(config.cost_ratio_min..config.cost_ratio_max);
                let cost = round_cents(sales * ratio);
                rows.push(SalesRow::new(date, region, product, sales, cost));
            }
        }
    }

    log::debug!(
        "generated {} rows (seed={}, year={}, seasonality={:.2})",
        rows.len(),
        config.seed,
        config.year,
        config.seasonality
    );

    Ok(SalesTable::new(rows))
}

fn validate(config: &AnalysisConfig) -> Result<(), AppError> {
    if !(config.sales_min.is_finite()
        && config.sales_max.is_finite()
        && config.sales_min >= 0.0
        && config.sales_max > config.sales_min)
    {
        return Err(AppError::config("Invalid sales range: need 0 <= min < max."));
    }
    if !(config.cost_ratio_min.is_finite()
        && config.cost_ratio_max.is_finite()
        && config.cost_ratio_min >= 0.0
        && config.cost_ratio_max <= 1.0
        && config.cost_ratio_max > config.cost_ratio_min)
    {
        return Err(AppError::config(
            "Invalid cost ratio range: need 0 <= min < max <= 1.",
        ));
    }
    if !(config.seasonality.is_finite() && (0.0..1.0).contains(&config.seasonality)) {
        return Err(AppError::config("Seasonality must be in [0, 1)."));
    }
    Ok(())
}

/// Yearly sine multiplier; always positive because amplitude < 1.
fn seasonal_factor(month: u32, amplitude: f64) -> f64 {
    let phase = 2.0 * PI * (month - 1) as f64 / MONTHS as f64;
    1.0 + amplitude * phase.sin()
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn sample_seed(config: &AnalysisConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.year.hash(&mut hasher);
    config.sales_min.to_bits().hash(&mut hasher);
    config.sales_max.to_bits().hash(&mut hasher);
    config.cost_ratio_min.to_bits().hash(&mut hasher);
    config.cost_ratio_max.to_bits().hash(&mut hasher);
    config.seasonality.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measure;

    #[test]
    fn generates_full_cross_product() {
        let table = generate_sample(&AnalysisConfig::default()).unwrap();
        assert_eq!(table.len(), 144);
        assert_eq!(table.months().len(), 12);

        // Nesting order: month, then region, then product.
        let first = &table.rows()[0];
        assert_eq!(first.region(), Region::North);
        assert_eq!(first.product(), Product::ProductA);
        assert_eq!(first.month(), 1);
        let fourth = &table.rows()[3];
        assert_eq!(fourth.region(), Region::South);
        assert_eq!(table.rows()[12].month(), 2);

        for region in Region::ALL {
            assert_eq!(table.for_region(region).len(), 36);
        }
        for product in Product::ALL {
            assert_eq!(table.for_product(product).len(), 48);
        }
    }

    #[test]
    fn rows_respect_ranges_and_profit_identity() {
        let config = AnalysisConfig::default();
        let table = generate_sample(&config).unwrap();
        for row in table.rows() {
            assert!(row.sales() >= config.sales_min && row.sales() <= config.sales_max);
            assert!(row.cost() <= row.sales());
            assert!(row.cost() >= row.sales() * config.cost_ratio_min - 0.01);
            assert_eq!(row.profit(), row.sales() - row.cost());
            assert!(row.value(Measure::Margin) > 0.0);
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let config = AnalysisConfig::default();
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a, b);

        let other = AnalysisConfig {
            seed: 7,
            ..AnalysisConfig::default()
        };
        let c = generate_sample(&other).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn seasonality_shapes_the_year() {
        assert!((seasonal_factor(1, 0.5) - 1.0).abs() < 1e-12);
        assert!((seasonal_factor(4, 0.5) - 1.5).abs() < 1e-12);
        assert!((seasonal_factor(10, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_ranges() {
        let bad_sales = AnalysisConfig {
            sales_min: 500.0,
            sales_max: 500.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(generate_sample(&bad_sales).unwrap_err().exit_code(), 2);

        let bad_ratio = AnalysisConfig {
            cost_ratio_max: 1.5,
            ..AnalysisConfig::default()
        };
        assert_eq!(generate_sample(&bad_ratio).unwrap_err().exit_code(), 2);

        let bad_season = AnalysisConfig {
            seasonality: 1.0,
            ..AnalysisConfig::default()
        };
        assert!(generate_sample(&bad_season).is_err());
    }
}
