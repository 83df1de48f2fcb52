//! Demo league for a fresh install.

use crate::errors::StoreError;
use crate::league::{assign_series, load_drivers, save_drivers, save_race_state};
use crate::models::{CarStats, DriverRecord, RaceState};
use crate::storage::RecordStore;
use tracing::info;

const REGULAR_SEASON_RACES: u32 = 18;

// name, number, points, wins, championship wins, best lap
const DEMO_ROSTER: &[(&str, &str, u32, u32, u32, &str)] = &[
    ("Time Track", "914", 85, 15, 2, "1:23.45"),
    ("Delorean", "88", 72, 12, 1, "1:24.12"),
    ("Stinger GT", "42", 68, 10, 0, "1:24.56"),
    ("Drift Queen", "3", 55, 11, 1, "1:25.23"),
    ("Rusty Rod", "52", 48, 8, 0, "1:25.89"),
    ("Night Owl", "", 42, 6, 0, "1:26.78"),
    ("Count Nitro", "", 40, 5, 0, "1:27.12"),
    ("Glory Chaser", "32", 38, 4, 0, "1:27.45"),
    ("Silver Arrow", "", 35, 3, 0, "1:28.12"),
    ("Boss 302", "", 32, 2, 0, "1:28.56"),
    ("Focus RS", "4", 30, 1, 0, "DNF"),
    ("High Voltage", "2", 68, 13, 1, "1:24.34"),
    ("Thunder Bolt", "7", 62, 9, 0, "1:25.12"),
    ("Speed Demon", "99", 45, 7, 0, "1:26.45"),
    ("Monster Truck", "", 40, 5, 0, "1:27.23"),
    ("Stingray", "", 38, 4, 0, "1:27.78"),
    ("Formula Eight", "8", 35, 3, 0, "1:28.45"),
    ("Drag Camaro", "", 32, 2, 0, "1:29.12"),
    ("Blue Mustang", "", 30, 1, 0, "--"),
    ("Firebird", "70", 25, 0, 0, "1:31.12"),
    ("Rip Rod", "", 22, 0, 0, "1:31.78"),
    ("Old Corvette", "", 20, 0, 0, "1:32.45"),
];

pub fn demo_roster() -> Vec<DriverRecord> {
    DEMO_ROSTER
        .iter()
        .map(|&(name, number, points, wins, ch_wins, best_time)| DriverRecord {
            number: number.to_string(),
            points,
            wins,
            ch_wins,
            best_time: best_time.to_string(),
            ..DriverRecord::new(name)
        })
        .collect()
}

/// Counters matching a roster: every driver in its series with its wins
/// and the rest of the regular season as losses.
pub fn demo_race_state(drivers: &[DriverRecord]) -> RaceState {
    let mut race_state = RaceState::default();
    for (record, series) in drivers.iter().zip(assign_series(drivers)) {
        race_state
            .series_mut(series)
            .car_stats
            .entry(record.name.clone())
            .or_insert(CarStats {
                wins: record.wins,
                losses: REGULAR_SEASON_RACES.saturating_sub(record.wins),
            });
    }
    race_state
}

/// Writes the demo league when the roster is empty. Returns whether
/// anything was written.
pub fn seed_demo_data(store: &mut impl RecordStore) -> Result<bool, StoreError> {
    if !load_drivers(store).is_empty() {
        return Ok(false);
    }

    let drivers = demo_roster();
    save_drivers(store, &drivers)?;
    save_race_state(store, &demo_race_state(&drivers))?;
    info!(drivers = drivers.len(), "seeded demo league");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::load_race_state;
    use crate::models::Series;
    use crate::storage::MemoryStore;

    #[test]
    fn seeding_fills_an_empty_store_once() {
        let mut store = MemoryStore::new();
        assert!(seed_demo_data(&mut store).unwrap());
        assert!(!seed_demo_data(&mut store).unwrap());

        let drivers = load_drivers(&store);
        assert_eq!(drivers.len(), DEMO_ROSTER.len());

        let race_state = load_race_state(&store);
        assert_eq!(
            race_state.stats(Series::A, "Time Track"),
            CarStats { wins: 15, losses: 3 }
        );
        assert_eq!(race_state.stats(Series::B, "Old Corvette").losses, 18);
    }

    #[test]
    fn existing_roster_is_left_alone() {
        let mut store = MemoryStore::new();
        save_drivers(&mut store, &[DriverRecord::new("Mine")]).unwrap();
        assert!(!seed_demo_data(&mut store).unwrap());
        assert_eq!(load_drivers(&store).len(), 1);
    }
}
