//! Region x product pivot table with margins.

use serde::Serialize;

use crate::data::table::{SalesTable, aggregate};
use crate::domain::{Agg, Measure, Product, Region};

/// Cross-tabulation of one measure: rows are regions, columns are products.
///
/// All four regions and three products are always present; empty cells hold
/// the aggregate of an empty set (0 for sum/count, NaN otherwise).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub measure: Measure,
    pub agg: Agg,
    pub regions: Vec<Region>,
    pub products: Vec<Product>,
    /// `cells[region_index][product_index]`.
    pub cells: Vec<Vec<f64>>,
    /// Aggregate over each region (all products).
    pub row_totals: Vec<f64>,
    /// Aggregate over each product (all regions).
    pub col_totals: Vec<f64>,
    pub grand_total: f64,
}

impl PivotTable {
    pub fn cell(&self, region: Region, product: Product) -> f64 {
        self.cells[region.index()][product.index()]
    }

    /// Largest and smallest finite cell values, if any.
    pub fn cell_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.cells.iter().flatten().copied().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if lo.is_finite() && hi.is_finite() { Some((lo, hi)) } else { None }
    }
}

/// Build the pivot. Margins aggregate the underlying rows, so a `Mean` margin
/// is the mean of rows, not the mean of cell means.
pub fn pivot(table: &SalesTable, measure: Measure, agg: Agg) -> PivotTable {
    let rows = table.rows();

    let cells = Region::ALL
        .iter()
        .map(|&region| {
            Product::ALL
                .iter()
                .map(|&product| {
                    aggregate(
                        rows.iter()
                            .filter(|r| r.region() == region && r.product() == product),
                        measure,
                        agg,
                    )
                })
                .collect()
        })
        .collect();

    let row_totals = Region::ALL
        .iter()
        .map(|&region| aggregate(rows.iter().filter(|r| r.region() == region), measure, agg))
        .collect();

    let col_totals = Product::ALL
        .iter()
        .map(|&product| aggregate(rows.iter().filter(|r| r.product() == product), measure, agg))
        .collect();

    PivotTable {
        measure,
        agg,
        regions: Region::ALL.to_vec(),
        products: Product::ALL.to_vec(),
        cells,
        row_totals,
        col_totals,
        grand_total: aggregate(rows.iter(), measure, agg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalesRow;
    use chrono::NaiveDate;

    fn table() -> SalesTable {
        let d1 = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        SalesTable::new(vec![
            SalesRow::new(d1, Region::North, Product::ProductA, 100.0, 40.0),
            SalesRow::new(d2, Region::North, Product::ProductA, 300.0, 100.0),
            SalesRow::new(d1, Region::East, Product::ProductC, 50.0, 25.0),
        ])
    }

    #[test]
    fn sum_pivot_with_margins() {
        let p = pivot(&table(), Measure::Sales, Agg::Sum);
        assert_eq!(p.cells.len(), 4);
        assert_eq!(p.cells[0].len(), 3);
        assert_eq!(p.cell(Region::North, Product::ProductA), 400.0);
        assert_eq!(p.cell(Region::East, Product::ProductC), 50.0);
        assert_eq!(p.cell(Region::West, Product::ProductB), 0.0);
        assert_eq!(p.row_totals, vec![400.0, 0.0, 50.0, 0.0]);
        assert_eq!(p.col_totals, vec![400.0, 0.0, 50.0]);
        assert_eq!(p.grand_total, 450.0);
        assert_eq!(p.cell_range(), Some((0.0, 400.0)));
    }

    #[test]
    fn mean_pivot_margins_use_rows() {
        let p = pivot(&table(), Measure::Sales, Agg::Mean);
        assert_eq!(p.cell(Region::North, Product::ProductA), 200.0);
        assert!(p.cell(Region::South, Product::ProductA).is_nan());
        assert_eq!(p.grand_total, 150.0);
        assert_eq!(p.cell_range(), Some((50.0, 200.0)));
    }

    #[test]
    fn pivot_totals_match_table_total() {
        let t = table();
        let p = pivot(&t, Measure::Profit, Agg::Sum);
        let row_sum: f64 = p.row_totals.iter().sum();
        assert!((row_sum - t.total(Measure::Profit)).abs() < 1e-9);
        assert!((p.grand_total - t.total(Measure::Profit)).abs() < 1e-9);
    }
}
