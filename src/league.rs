//! Typed access to the league documents held in a [`RecordStore`].
//!
//! Every read degrades to the document's empty default when the stored
//! value is absent or malformed, so one broken key never takes down an
//! unrelated view.

use crate::coerce;
use crate::errors::StoreError;
use crate::models::{
    AwardRecord, ChampionshipRecord, DriverRecord, PlayoffData, PlayoffState, RaceState, Series,
};
use crate::storage::{RecordStore, keys};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

fn read_document<T>(store: &impl RecordStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, "falling back to default document: {err}");
            T::default()
        }
    }
}

/// Reads a JSON array, keeping the elements that decode as `T`.
fn read_list<T>(store: &impl RecordStore, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    match read_document::<Value>(store, key) {
        Value::Array(items) => {
            let total = items.len();
            let decoded: Vec<T> = items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect();
            if decoded.len() != total {
                warn!(key, skipped = total - decoded.len(), "dropped malformed list entries");
            }
            decoded
        }
        Value::Null => Vec::new(),
        _ => {
            warn!(key, "expected a list, falling back to empty");
            Vec::new()
        }
    }
}

fn write_document<T>(store: &mut impl RecordStore, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    store.set(key, payload);
    Ok(())
}

pub fn load_drivers(store: &impl RecordStore) -> Vec<DriverRecord> {
    read_list(store, keys::DRIVERS)
}

pub fn save_drivers(
    store: &mut impl RecordStore,
    drivers: &[DriverRecord],
) -> Result<(), StoreError> {
    write_document(store, keys::DRIVERS, drivers)
}

pub fn load_race_state(store: &impl RecordStore) -> RaceState {
    read_document(store, keys::RACE_STATE)
}

pub fn save_race_state(store: &mut impl RecordStore, state: &RaceState) -> Result<(), StoreError> {
    write_document(store, keys::RACE_STATE, state)
}

pub fn load_playoff_state(store: &impl RecordStore) -> PlayoffState {
    read_document(store, keys::PLAYOFF_STATE)
}

pub fn save_playoff_state(
    store: &mut impl RecordStore,
    state: &PlayoffState,
) -> Result<(), StoreError> {
    write_document(store, keys::PLAYOFF_STATE, state)
}

pub fn load_playoff_data(store: &impl RecordStore) -> PlayoffData {
    read_document(store, keys::PLAYOFF_DATA)
}

pub fn save_playoff_data(
    store: &mut impl RecordStore,
    data: &PlayoffData,
) -> Result<(), StoreError> {
    write_document(store, keys::PLAYOFF_DATA, data)
}

pub fn load_championship_history(store: &impl RecordStore) -> Vec<ChampionshipRecord> {
    read_list(store, keys::CHAMPIONSHIP_HISTORY)
}

pub fn save_championship_history(
    store: &mut impl RecordStore,
    history: &[ChampionshipRecord],
) -> Result<(), StoreError> {
    write_document(store, keys::CHAMPIONSHIP_HISTORY, history)
}

pub fn load_award_history(store: &impl RecordStore, award_id: &str) -> Vec<AwardRecord> {
    read_list(store, &keys::award_history(award_id))
}

pub fn save_award_history(
    store: &mut impl RecordStore,
    award_id: &str,
    history: &[AwardRecord],
) -> Result<(), StoreError> {
    write_document(store, &keys::award_history(award_id), history)
}

/// Series membership for the driver at `index` of a roster of `len`.
///
/// An explicit `serie` on the record wins; otherwise the first half of the
/// roster is Series A.
pub fn series_of(record: &DriverRecord, index: usize, len: usize) -> Series {
    record.serie.unwrap_or(if index * 2 < len { Series::A } else { Series::B })
}

pub fn assign_series(drivers: &[DriverRecord]) -> Vec<Series> {
    drivers
        .iter()
        .enumerate()
        .map(|(index, record)| series_of(record, index, drivers.len()))
        .collect()
}

/// The records of one series, in roster order.
pub fn series_members(drivers: &[DriverRecord], series: Series) -> Vec<&DriverRecord> {
    drivers
        .iter()
        .zip(assign_series(drivers))
        .filter(|(_, assigned)| *assigned == series)
        .map(|(record, _)| record)
        .collect()
}

/// Everything the engines read, captured in one pass over the store.
#[derive(Debug, Clone, Default)]
pub struct LeagueSnapshot {
    pub drivers: Vec<DriverRecord>,
    pub race_state: RaceState,
    pub playoff_state: PlayoffState,
    pub playoff_data: PlayoffData,
}

impl LeagueSnapshot {
    pub fn load(store: &impl RecordStore) -> Self {
        Self {
            drivers: load_drivers(store),
            race_state: load_race_state(store),
            playoff_state: load_playoff_state(store),
            playoff_data: load_playoff_data(store),
        }
    }
}

/// Parses a season/year typed into a form, defaulting like stored values do.
pub fn parse_year(raw: &str) -> Option<i32> {
    coerce::parse_int_prefix(raw)
        .and_then(|year| i32::try_from(year).ok())
        .filter(|year| *year != 0)
}
