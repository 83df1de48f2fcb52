use crate::history::championship_history;
use crate::league::{load_drivers, load_race_state};
use crate::models::{ChampionshipRecord, DriverRecord, RaceState, Series, parse_lap_time};
use crate::storage::RecordStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordHolder {
    pub holder: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LapRecord {
    pub holder: String,
    pub seconds: f64,
    pub time: String,
}

/// All-time records over the current roster. `None` reads as "N/A".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallOfFameRecords {
    pub most_wins: Option<RecordHolder>,
    pub most_championships: Option<RecordHolder>,
    pub best_time: Option<LapRecord>,
    pub highest_points: Option<RecordHolder>,
    pub most_total_points: Option<RecordHolder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallOfFame {
    pub history: Vec<ChampionshipRecord>,
    pub records: HallOfFameRecords,
}

impl HallOfFame {
    pub fn load(store: &impl RecordStore) -> Self {
        Self {
            history: championship_history(store),
            records: calculate_records(&load_drivers(store), &load_race_state(store)),
        }
    }
}

/// Replaces the holder only when `value` is strictly greater, starting
/// from zero.
fn challenge(slot: &mut Option<RecordHolder>, name: &str, value: u64) {
    let current = slot.as_ref().map_or(0, |held| held.value);
    if value > current {
        *slot = Some(RecordHolder {
            holder: name.to_string(),
            value,
        });
    }
}

pub fn calculate_records(drivers: &[DriverRecord], race_state: &RaceState) -> HallOfFameRecords {
    let mut records = HallOfFameRecords::default();

    for record in drivers {
        challenge(&mut records.most_wins, &record.name, u64::from(record.wins));
        challenge(
            &mut records.most_championships,
            &record.name,
            u64::from(record.ch_wins),
        );
        challenge(
            &mut records.highest_points,
            &record.name,
            u64::from(record.points),
        );
        challenge(&mut records.most_total_points, &record.name, record.total());

        if let Some(seconds) = parse_lap_time(&record.best_time) {
            let faster = records
                .best_time
                .as_ref()
                .is_none_or(|best| seconds < best.seconds);
            if faster {
                records.best_time = Some(LapRecord {
                    holder: record.name.clone(),
                    seconds,
                    time: record.best_time.clone(),
                });
            }
        }
    }

    for series in Series::ALL {
        for (name, stats) in &race_state.series(series).car_stats {
            challenge(&mut records.most_wins, name, u64::from(stats.wins));
        }
    }

    records
}
