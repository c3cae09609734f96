//! Property-based tests for zone eligibility, fleet sums and transition markers.

mod common;

use common::ScriptedOracle;
use fleet_tco::domain::{EXAMPLE_PLATE, Fleet, FuelType, VehicleCategory};
use fleet_tco::presets::demo_vehicle;
use fleet_tco::sim::orchestrator::{SUM_KEY, TcoModel};
use fleet_tco::sim::strategy::StrategyKind;
use fleet_tco::sim::zone::is_allowed_in_zone;
use proptest::prelude::*;

fn category() -> impl Strategy<Value = VehicleCategory> {
    (0usize..7).prop_map(|i| VehicleCategory::from_index(i).unwrap_or(VehicleCategory::SmallVan))
}

proptest! {
    /// Zone restrictions start in 2025 and admit no fossil vehicle after 2029.
    #[test]
    fn zone_window_bounds(
        category in category(),
        euronorm in 0u8..7,
        age in 0i32..40,
        year in 2000i32..2060,
    ) {
        let mut vehicle = demo_vehicle("ZE-01", category, 2015);
        vehicle.euronorm = euronorm;
        let allowed = is_allowed_in_zone(&vehicle, age, year);
        if year < 2025 {
            prop_assert!(allowed);
        }
        if year > 2029 {
            prop_assert!(!allowed);
        }
    }

    /// The fleet sum equals the element-wise sum of the real vehicles.
    #[test]
    fn fleet_sum_is_additive(
        ages in prop::collection::vec(0i32..12, 1..6),
        parity in any::<bool>(),
    ) {
        let mut fleet: Fleet = ages
            .iter()
            .enumerate()
            .map(|(i, age)| {
                let v = common::diesel_van(&format!("AA-{i:02}-BB"), *age);
                (v.number_plate.clone(), v)
            })
            .collect();
        let example = common::diesel_van(EXAMPLE_PLATE, 3);
        fleet.insert(example.number_plate.clone(), example);

        let oracle = if parity { ScriptedOracle::at_parity() } else { ScriptedOracle::default() };
        let mut model = TcoModel::new(fleet, common::scenarios(), common::constants(), oracle);
        let tco = model.compare_strategies("midden", &[]).unwrap();

        for kind in StrategyKind::ALL {
            let sum = &tco.results[SUM_KEY]["midden"][&kind];
            for (year, total) in sum {
                let expected: i64 = tco
                    .results
                    .iter()
                    .filter(|(plate, _)| plate.as_str() != SUM_KEY && plate.as_str() != EXAMPLE_PLATE)
                    .map(|(_, s)| s["midden"][&kind][year].tco)
                    .sum();
                prop_assert_eq!(total.tco, expected);
            }
        }
    }

    /// Once a vehicle is electric its marker never returns to zero.
    #[test]
    fn transition_marker_is_sticky(
        age in 0i32..12,
        fuel_electric in any::<bool>(),
        mix_valid in any::<bool>(),
    ) {
        let mut van = common::diesel_van("AA-01-BB", age);
        if fuel_electric {
            van.fuel_type = FuelType::Electric;
        }
        let mut oracle = ScriptedOracle::at_parity();
        oracle.optimal_mix_valid = mix_valid;
        let fleet: Fleet = [(van.number_plate.clone(), van)].into_iter().collect();
        let mut model = TcoModel::new(fleet, common::scenarios(), common::constants(), oracle);
        let tco = model.compare_strategies("midden", &[]).unwrap();

        for kind in StrategyKind::ALL {
            let series = &tco.results["AA-01-BB"]["midden"][&kind];
            let mut seen = false;
            for record in series.values() {
                if seen {
                    prop_assert!(record.has_transitioned(), "{kind}");
                }
                seen |= record.has_transitioned();
            }
        }
    }
}
