//! The historical manufacturer price lists, as published.

use chrono::NaiveDate;

use crate::catalog::{Generation, PriceCatalog, Trim};
use crate::model::{BatteryClass, Drivetrain, Revision};

use Trim::{Connect, ConnectPlus, Lounge, NLine, NLineEdition, Style};

/// Discounts offered on the 2022 lists.
const DISCOUNTS_SMALL: [(Trim, i64); 4] =
    [(Style, 300), (Connect, 400), (ConnectPlus, 400), (Lounge, 600)];
const DISCOUNTS_LARGE: [(Trim, i64); 4] =
    [(Style, 900), (Connect, 1000), (ConnectPlus, 1000), (Lounge, 1200)];
const DISCOUNTS_AWD: [(Trim, i64); 3] = [(Connect, 1000), (ConnectPlus, 1000), (Lounge, 1200)];
/// From January 2023 the AWD Connect+ discount matched Lounge.
const DISCOUNTS_AWD_2023: [(Trim, i64); 3] =
    [(Connect, 1000), (ConnectPlus, 1200), (Lounge, 1200)];

/// One published list: name, effective date and the options it offered.
struct Release {
    name: &'static str,
    effective: NaiveDate,
    without_fca: bool,
    revision: Option<Revision>,
}

impl Release {
    fn new(name: &'static str, y: i32, m: u32) -> Self {
        Self {
            name,
            effective: NaiveDate::from_ymd_opt(y, m, 1).unwrap_or_default(),
            without_fca: true,
            revision: None,
        }
    }

    fn without_fca_deletion(mut self) -> Self {
        self.without_fca = false;
        self
    }

    fn model_2023(mut self) -> Self {
        self.revision = Some(Revision::ModelYear2023);
        self
    }

    #[allow(clippy::too_many_arguments)]
    fn add(
        &self,
        catalog: &mut PriceCatalog,
        battery: BatteryClass,
        drivetrain: Drivetrain,
        kwh: u16,
        base_prices: &[(Trim, i64)],
        discounts: &[(Trim, i64)],
    ) {
        catalog.add_generation(&Generation {
            effective: self.effective,
            battery,
            drivetrain,
            kwh,
            revision: self.revision,
            price_list: self.name.to_string(),
            without_fca: self.without_fca,
            base_prices: base_prices.to_vec(),
            discounts: discounts.to_vec(),
        });
    }

    /// Small, large and large AWD lists in one go, with the standard
    /// four-trim line-up.
    fn add_lineup(
        &self,
        catalog: &mut PriceCatalog,
        (small_kwh, large_kwh): (u16, u16),
        small: [i64; 4],
        large: [i64; 4],
        awd: [i64; 3],
        discounts: Option<&[(Trim, i64); 3]>,
    ) {
        let four = |p: [i64; 4]| {
            vec![(Style, p[0]), (Connect, p[1]), (ConnectPlus, p[2]), (Lounge, p[3])]
        };
        let three = vec![(Connect, awd[0]), (ConnectPlus, awd[1]), (Lounge, awd[2])];

        let none: &[(Trim, i64)] = &[];
        let (d_small, d_large, d_awd) = match discounts {
            Some(awd_discounts) => {
                (&DISCOUNTS_SMALL[..], &DISCOUNTS_LARGE[..], &awd_discounts[..])
            }
            None => (none, none, none),
        };

        use BatteryClass::{Large, Small};
        use Drivetrain::{Awd, Rwd};
        self.add(catalog, Small, Rwd, small_kwh, &four(small), d_small);
        self.add(catalog, Large, Rwd, large_kwh, &four(large), d_large);
        self.add(catalog, Large, Awd, large_kwh, &three, d_awd);
    }
}

/// Build the catalog of every known price list.
pub fn build_catalog() -> PriceCatalog {
    let mut catalog = PriceCatalog::new();

    // Model 2022
    Release::new("May 2021", 2021, 5).without_fca_deletion().add_lineup(
        &mut catalog,
        (58, 73),
        [42505, 46505, 49505, 51705],
        [45505, 49505, 52505, 54705],
        [53505, 56505, 58705],
        None,
    );
    Release::new("March 2022", 2022, 3).add_lineup(
        &mut catalog,
        (58, 73),
        [42805, 46905, 49905, 52305],
        [46405, 50505, 53505, 55905],
        [54505, 57505, 59905],
        Some(&DISCOUNTS_AWD),
    );
    Release::new("May 2022", 2022, 5).add_lineup(
        &mut catalog,
        (58, 73),
        [44305, 48405, 51405, 53805],
        [47905, 52005, 55005, 57405],
        [56005, 59005, 61405],
        Some(&DISCOUNTS_AWD),
    );
    Release::new("Sept 2022", 2022, 9).add_lineup(
        &mut catalog,
        (58, 73),
        [45800, 49900, 52900, 55300],
        [49400, 53500, 56500, 58900],
        [57500, 60500, 62900],
        Some(&DISCOUNTS_AWD),
    );
    Release::new("Jan 2023", 2023, 1).add_lineup(
        &mut catalog,
        (58, 73),
        [47200, 51300, 54300, 56700],
        [50800, 54900, 57900, 60300],
        [58900, 61900, 64300],
        Some(&DISCOUNTS_AWD_2023),
    );
    Release::new("May 2023", 2023, 5).add_lineup(
        &mut catalog,
        (58, 73),
        [48200, 52300, 55300, 57700],
        [51800, 55900, 58900, 61300],
        [59900, 62900, 65300],
        Some(&DISCOUNTS_AWD_2023),
    );

    // Model 2023 revision: 77 kWh packs and digital exterior mirrors.
    // The March 2022 revision list already carried the May 2022 prices.
    for (name, y, m, small, large, awd) in [
        (
            "March 2022",
            2022,
            3,
            [44305, 48405, 51405, 53805],
            [47905, 52005, 55005, 57405],
            [56005, 59005, 61405],
        ),
        (
            "May 2022",
            2022,
            5,
            [44305, 48405, 51405, 53805],
            [47905, 52005, 55005, 57405],
            [56005, 59005, 61405],
        ),
        (
            "Sept 2022",
            2022,
            9,
            [45800, 49900, 52900, 55300],
            [49400, 53500, 56500, 58900],
            [57500, 60500, 62900],
        ),
        (
            "Jan 2023",
            2023,
            1,
            [47200, 51300, 54300, 56700],
            [50800, 54900, 57900, 60300],
            [58900, 61900, 64300],
        ),
        (
            "May 2023",
            2023,
            5,
            [48200, 52300, 55300, 57700],
            [51800, 55900, 58900, 61300],
            [59900, 62900, 65300],
        ),
        (
            "Oct 2023",
            2023,
            10,
            [48200, 52300, 55300, 57700],
            [51800, 55900, 58900, 61300],
            [59900, 62900, 65300],
        ),
    ] {
        Release::new(name, y, m)
            .model_2023()
            .add_lineup(&mut catalog, (58, 77), small, large, awd, None);
    }

    // Facelift: 63/84 kWh, N Line trims.
    for (name, y, m) in [("July 2024", 2024, 7), ("Jan 2025", 2025, 1)] {
        let release = Release::new(name, y, m);
        use BatteryClass::{Large, Small};
        use Drivetrain::{Awd, Rwd};
        release.add(
            &mut catalog,
            Small,
            Rwd,
            63,
            &[(Style, 41900), (Connect, 46900), (ConnectPlus, 49900), (Lounge, 52300)],
            &[],
        );
        release.add(
            &mut catalog,
            Large,
            Rwd,
            84,
            &[
                (Style, 45900),
                (Connect, 50900),
                (ConnectPlus, 53900),
                (NLineEdition, 53900),
                (Lounge, 56300),
                (NLine, 56300),
            ],
            &[],
        );
        release.add(&mut catalog, Large, Awd, 84, &[(Lounge, 60300), (NLine, 60300)], &[]);
    }

    catalog
}
