//! Group-by aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::table::{SalesTable, aggregate};
use crate::domain::{Agg, GroupKey, Measure, Product, Region, SalesRow, month_label};

/// Identity of one group. Ordering follows the enum declaration orders and dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GroupId {
    Region(Region),
    Product(Product),
    Month(NaiveDate),
    RegionProduct(Region, Product),
}

impl GroupId {
    fn of(row: &SalesRow, key: GroupKey) -> Self {
        match key {
            GroupKey::Region => GroupId::Region(row.region()),
            GroupKey::Product => GroupId::Product(row.product()),
            GroupKey::Month => GroupId::Month(row.date()),
            GroupKey::RegionProduct => GroupId::RegionProduct(row.region(), row.product()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            GroupId::Region(r) => r.display_name().to_string(),
            GroupId::Product(p) => p.display_name().to_string(),
            GroupId::Month(d) => month_label(*d),
            GroupId::RegionProduct(r, p) => format!("{} / {}", r.display_name(), p.display_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    pub id: GroupId,
    pub value: f64,
}

/// Result of a group-by: one entry per non-empty group, ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped {
    pub key: GroupKey,
    pub measure: Measure,
    pub agg: Agg,
    pub entries: Vec<GroupEntry>,
}

impl Grouped {
    pub fn get(&self, id: GroupId) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.value)
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.value).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.label()).collect()
    }

    /// The entry with the largest value (first one wins on ties).
    pub fn best(&self) -> Option<&GroupEntry> {
        self.entries.iter().fold(None, |best: Option<&GroupEntry>, e| match best {
            Some(b) if b.value >= e.value || e.value.is_nan() => Some(b),
            _ => Some(e),
        })
    }
}

/// Label of the group with the largest value.
pub fn best_group(grouped: &Grouped) -> Option<String> {
    grouped.best().map(|e| e.id.label())
}

/// Partition `table` by `key` and aggregate `measure` within each group.
pub fn group_by(table: &SalesTable, key: GroupKey, measure: Measure, agg: Agg) -> Grouped {
    let mut groups: BTreeMap<GroupId, Vec<&SalesRow>> = BTreeMap::new();
    for row in table.rows() {
        groups.entry(GroupId::of(row, key)).or_default().push(row);
    }

    let entries = groups
        .into_iter()
        .map(|(id, rows)| GroupEntry {
            id,
            value: aggregate(rows, measure, agg),
        })
        .collect();

    Grouped {
        key,
        measure,
        agg,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, 1).unwrap()
    }

    fn table() -> SalesTable {
        SalesTable::new(vec![
            SalesRow::new(d(2), Region::West, Product::ProductA, 100.0, 50.0),
            SalesRow::new(d(1), Region::North, Product::ProductB, 300.0, 200.0),
            SalesRow::new(d(1), Region::West, Product::ProductA, 200.0, 150.0),
            SalesRow::new(d(2), Region::North, Product::ProductA, 400.0, 100.0),
        ])
    }

    #[test]
    fn group_by_region_sum_is_ordered() {
        let g = group_by(&table(), GroupKey::Region, Measure::Sales, Agg::Sum);
        assert_eq!(g.labels(), vec!["North".to_string(), "West".to_string()]);
        assert_eq!(g.values(), vec![700.0, 300.0]);
        assert_eq!(g.get(GroupId::Region(Region::South)), None);
    }

    #[test]
    fn group_by_month_mean_and_count() {
        let t = table();
        let mean = group_by(&t, GroupKey::Month, Measure::Profit, Agg::Mean);
        assert_eq!(mean.labels(), vec!["Jan".to_string(), "Feb".to_string()]);
        assert_eq!(mean.values(), vec![75.0, 175.0]);

        let count = group_by(&t, GroupKey::Product, Measure::Sales, Agg::Count);
        assert_eq!(count.get(GroupId::Product(Product::ProductA)), Some(3.0));
        assert_eq!(count.get(GroupId::Product(Product::ProductB)), Some(1.0));
    }

    #[test]
    fn margin_groups_are_ratio_of_sums() {
        let g = group_by(&table(), GroupKey::Region, Measure::Margin, Agg::Mean);
        // West: profit 100 over sales 300.
        let west = g.get(GroupId::Region(Region::West)).unwrap();
        assert!((west - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn region_product_keys_and_best() {
        let g = group_by(&table(), GroupKey::RegionProduct, Measure::Sales, Agg::Max);
        assert_eq!(g.entries.len(), 3);
        assert_eq!(g.entries[0].id, GroupId::RegionProduct(Region::North, Product::ProductA));
        assert_eq!(g.entries[0].id.label(), "North / Product A");

        let best = g.best().unwrap();
        assert_eq!(best.id, GroupId::RegionProduct(Region::North, Product::ProductA));
        assert_eq!(best.value, 400.0);
    }

    #[test]
    fn empty_table_has_no_groups() {
        let g = group_by(&SalesTable::default(), GroupKey::Region, Measure::Sales, Agg::Sum);
        assert!(g.entries.is_empty());
        assert!(g.best().is_none());
        assert_eq!(best_group(&g), None);
    }

    #[test]
    fn best_group_names_the_leader() {
        let g = group_by(&table(), GroupKey::Region, Measure::Sales, Agg::Sum);
        assert_eq!(best_group(&g).as_deref(), Some("North"));
    }
}
