//! Zero-emission zone eligibility of fossil vehicles.

use crate::domain::{Vehicle, VehicleCategory};

/// First year in which zone restrictions apply.
pub const ZONE_START_YEAR: i32 = 2025;
/// Last year of the grandfathering window; later years admit no fossil vehicle.
pub const ZONE_END_YEAR: i32 = 2029;

const LIGHT: [VehicleCategory; 4] = [
    VehicleCategory::SmallVan,
    VehicleCategory::MediumVan,
    VehicleCategory::MediumLuxuryVan,
    VehicleCategory::LargeVan,
];
const MEDIUM: [VehicleCategory; 2] = [VehicleCategory::SmallRigidTruck, VehicleCategory::LargeRigidTruck];
const HEAVY: [VehicleCategory; 1] = [VehicleCategory::TractorTrailer];

/// Maximum `age_in_2025` of a grandfathered medium truck.
const MEDIUM_MAX_AGE: i32 = 5;
/// Maximum `age_in_2025` of a grandfathered tractor.
const HEAVY_MAX_AGE: i32 = 8;

/// Whether `vehicle`, at `current_age` in `year`, may still enter a zero-emission zone.
///
/// Always allowed before 2025 and never after 2029. In between, vans depend on
/// their Euro norm and trucks on their age in 2025. A category outside the
/// three groups keeps the default and stays allowed.
///
/// # Examples
///
/// ```
/// use fleet_tco::sim::zone::is_allowed_in_zone;
/// # let vehicle = fleet_tco::presets::demo_vehicle("TR-01-AB", fleet_tco::domain::VehicleCategory::TractorTrailer, 2019);
/// assert!(is_allowed_in_zone(&vehicle, 20, 2024));
/// assert!(!is_allowed_in_zone(&vehicle, 0, 2030));
/// ```
pub fn is_allowed_in_zone(vehicle: &Vehicle, current_age: i32, year: i32) -> bool {
    if year < ZONE_START_YEAR {
        return true;
    }
    if year > ZONE_END_YEAR {
        return false;
    }

    let age_in_2025 = current_age - (year - ZONE_START_YEAR);
    if age_in_2025 < 1 {
        return false;
    }

    let category = vehicle.category;
    let mut allowed = true;
    if LIGHT.contains(&category) {
        let euronorm = i32::from(vehicle.euronorm);
        allowed = (year <= 2026 && euronorm > 4) || (year <= 2027 && euronorm > 5);
    } else if MEDIUM.contains(&category) {
        allowed = age_in_2025 <= MEDIUM_MAX_AGE;
    } else if HEAVY.contains(&category) {
        allowed = age_in_2025 <= HEAVY_MAX_AGE;
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::demo_vehicle;

    fn vehicle(category: VehicleCategory, euronorm: u8) -> Vehicle {
        let mut v = demo_vehicle("ZE-01", category, 2020);
        v.euronorm = euronorm;
        v
    }

    #[test]
    fn boundary_years() {
        let v = vehicle(VehicleCategory::LargeRigidTruck, 6);
        assert!(is_allowed_in_zone(&v, 30, 2024));
        assert!(!is_allowed_in_zone(&v, 1, 2030));
    }

    #[test]
    fn vehicles_bought_after_2025_are_not_grandfathered() {
        let v = vehicle(VehicleCategory::TractorTrailer, 6);
        // Age 1 in 2027 means age -1 in 2025.
        assert!(!is_allowed_in_zone(&v, 1, 2027));
        assert!(!is_allowed_in_zone(&v, 0, 2025));
    }

    #[test]
    fn light_vans_depend_on_euronorm_and_year() {
        let euro5 = vehicle(VehicleCategory::SmallVan, 5);
        let euro6 = vehicle(VehicleCategory::LargeVan, 6);
        assert!(is_allowed_in_zone(&euro5, 5, 2026));
        assert!(!is_allowed_in_zone(&euro5, 6, 2027));
        assert!(is_allowed_in_zone(&euro6, 6, 2027));
        assert!(!is_allowed_in_zone(&euro6, 7, 2028));

        let euro4 = vehicle(VehicleCategory::MediumVan, 4);
        assert!(!is_allowed_in_zone(&euro4, 5, 2025));
    }

    #[test]
    fn medium_trucks_grandfathered_up_to_five_years() {
        let v = vehicle(VehicleCategory::SmallRigidTruck, 6);
        assert!(is_allowed_in_zone(&v, 5, 2025));
        assert!(is_allowed_in_zone(&v, 9, 2029));
        assert!(!is_allowed_in_zone(&v, 6, 2025));
        assert!(!is_allowed_in_zone(&v, 10, 2029));
    }

    #[test]
    fn tractors_grandfathered_up_to_eight_years() {
        let v = vehicle(VehicleCategory::TractorTrailer, 6);
        assert!(is_allowed_in_zone(&v, 8, 2025));
        assert!(!is_allowed_in_zone(&v, 9, 2025));
        assert!(is_allowed_in_zone(&v, 12, 2029));
    }
}
