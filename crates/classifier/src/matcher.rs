//! Price lookup against the lists in force on a registration date.
//!
//! Lists are visited newest first. A list that takes effect after the
//! registration date is skipped. Once one list has been visited, older
//! lists are only considered when they take effect in the same calendar
//! month as the registration, which picks up mid-month revisions and
//! discount lists published alongside the regular list.

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::catalog::{PriceCatalog, PriceListEntry, PriceTable};
use crate::model::Segment;

/// A catalog entry matched for a target price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMatch<'a> {
    pub entry: &'a PriceListEntry,
    pub effective: NaiveDate,
    /// `target - list price`; zero for exact matches.
    pub delta: i64,
}

impl PriceMatch<'_> {
    pub fn is_exact(&self) -> bool {
        self.delta == 0
    }

    /// Entry label, with the price difference appended for nearest matches.
    pub fn label(&self) -> String {
        let mut label = self.entry.label.clone();
        if self.delta > 0 {
            label.push_str(&format!(" (€{} more than price list)", self.delta));
        } else if self.delta < 0 {
            label.push_str(&format!(" (€{} cheaper than price list)", -self.delta));
        }
        label
    }
}

fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// The tables consulted for `segment` on `date`, in visiting order.
pub fn eligible_tables(
    catalog: &PriceCatalog,
    segment: Segment,
    date: NaiveDate,
) -> Vec<(NaiveDate, &PriceTable)> {
    let mut tables = Vec::new();
    for effective in catalog.effective_dates(segment) {
        let future = date < effective;
        let superseded = !tables.is_empty() && year_month(effective) < year_month(date);
        if future || superseded {
            debug!("skipping {segment} price list {effective} for {date}");
            continue;
        }
        if let Some(table) = catalog.table(effective, segment) {
            tables.push((effective, table));
        }
    }
    tables
}

/// First eligible table holding exactly `price`.
pub fn find_exact(
    catalog: &PriceCatalog,
    segment: Segment,
    date: NaiveDate,
    price: i64,
) -> Option<PriceMatch<'_>> {
    eligible_tables(catalog, segment, date)
        .into_iter()
        .find_map(|(effective, table)| {
            debug!("checking {segment} price list {effective} for {price}");
            table.get(price).map(|entry| PriceMatch { entry, effective, delta: 0 })
        })
}

/// Closest entry of the first non-empty eligible table.
///
/// Ties on the absolute difference go to the lower list price.
pub fn find_nearest(
    catalog: &PriceCatalog,
    segment: Segment,
    date: NaiveDate,
    price: i64,
) -> Option<PriceMatch<'_>> {
    eligible_tables(catalog, segment, date)
        .into_iter()
        .find_map(|(effective, table)| {
            debug!("checking nearest {segment} price list {effective} for {price}");
            nearest_in(table, price).map(|entry| PriceMatch {
                entry,
                effective,
                delta: price - entry.price,
            })
        })
}

fn nearest_in(table: &PriceTable, price: i64) -> Option<&PriceListEntry> {
    let mut best: Option<&PriceListEntry> = None;
    for entry in table.entries() {
        let closer = match best {
            Some(b) => (price - entry.price).abs() < (price - b.price).abs(),
            None => true,
        };
        if closer {
            best = Some(entry);
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Generation, Trim};
    use crate::history::build_catalog;
    use crate::model::{BatteryClass, Drivetrain};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog_with(dates: &[NaiveDate]) -> PriceCatalog {
        let mut catalog = PriceCatalog::new();
        for (i, d) in dates.iter().enumerate() {
            catalog.add_generation(&Generation {
                effective: *d,
                battery: BatteryClass::Large,
                drivetrain: Drivetrain::Rwd,
                kwh: 73,
                revision: None,
                price_list: format!("list {i}"),
                without_fca: false,
                base_prices: vec![(Trim::ConnectPlus, 50000 + i as i64 * 100)],
                discounts: vec![],
            });
        }
        catalog
    }

    #[test]
    fn future_tables_are_skipped() {
        let catalog = catalog_with(&[date(2022, 1, 1), date(2022, 5, 1)]);
        let tables = eligible_tables(&catalog, Segment::LARGE, date(2022, 4, 30));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, date(2022, 1, 1));
    }

    #[test]
    fn older_tables_only_within_same_month() {
        let catalog =
            catalog_with(&[date(2022, 1, 1), date(2022, 5, 1), date(2022, 5, 15)]);
        let dates: Vec<_> = eligible_tables(&catalog, Segment::LARGE, date(2022, 5, 20))
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        assert_eq!(dates, vec![date(2022, 5, 15), date(2022, 5, 1)]);

        let dates: Vec<_> = eligible_tables(&catalog, Segment::LARGE, date(2022, 6, 2))
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        assert_eq!(dates, vec![date(2022, 5, 15)]);
    }

    #[test]
    fn no_table_before_oldest() {
        let catalog = catalog_with(&[date(2022, 1, 1)]);
        assert!(eligible_tables(&catalog, Segment::LARGE, date(2021, 12, 31)).is_empty());
        assert!(find_nearest(&catalog, Segment::LARGE, date(2021, 12, 31), 50000).is_none());
    }

    #[test]
    fn exact_falls_through_to_same_month_table() {
        // list 0 on May 1 holds 50000, list 1 on May 15 holds 50100
        let catalog = catalog_with(&[date(2022, 5, 1), date(2022, 5, 15)]);
        let m = find_exact(&catalog, Segment::LARGE, date(2022, 5, 20), 50000).unwrap();
        assert_eq!(m.effective, date(2022, 5, 1));
        assert!(m.is_exact());
        assert_eq!(m.label(), "73 kWh Connect+ (price list list 0)");
    }

    #[test]
    fn nearest_uses_first_table_and_signs_delta() {
        let catalog = build_catalog();
        let m = find_nearest(&catalog, Segment::LARGE, date(2022, 6, 10), 54705).unwrap();
        assert_eq!(m.entry.price, 55005);
        assert_eq!(m.delta, -300);
        assert_eq!(
            m.label(),
            "73 kWh Connect+ (price list May 2022) (€300 cheaper than price list)"
        );

        let m = find_nearest(&catalog, Segment::LARGE, date(2022, 6, 10), 54505).unwrap();
        assert_eq!(m.delta, 250);
        assert!(m.label().ends_with("(€250 more than price list)"));
    }

    #[test]
    fn nearest_tie_prefers_lower_price() {
        // 50000 and 50200 in one table, target halfway
        let mut catalog = catalog_with(&[date(2022, 1, 1)]);
        catalog.add_generation(&Generation {
            effective: date(2022, 1, 1),
            battery: BatteryClass::Large,
            drivetrain: Drivetrain::Rwd,
            kwh: 73,
            revision: None,
            price_list: "list 0".into(),
            without_fca: false,
            base_prices: vec![(Trim::Lounge, 50200)],
            discounts: vec![],
        });
        let m = find_nearest(&catalog, Segment::LARGE, date(2022, 2, 1), 50100).unwrap();
        assert_eq!(m.entry.price, 50000);
        assert_eq!(m.delta, 100);
    }
}
