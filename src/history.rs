//! Append-only season history: award winners per award and the
//! championship roll.
//!
//! Each append reads the whole list, adds one entry, re-sorts newest
//! season first and writes the list back. Nothing is de-duplicated;
//! recording a season twice keeps both entries.

use crate::errors::StoreError;
use crate::league::{
    load_award_history, load_championship_history, save_award_history, save_championship_history,
};
use crate::models::{AwardRecord, ChampionshipRecord};
use crate::storage::RecordStore;
use chrono::{DateTime, Datelike, Local, SecondsFormat, Utc};
use tracing::info;

pub fn current_season() -> i32 {
    Local::now().year()
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn newest_season_first(history: &mut [AwardRecord]) {
    history.sort_by(|a, b| b.season.cmp(&a.season));
}

fn newest_year_first(history: &mut [ChampionshipRecord]) {
    history.sort_by(|a, b| b.year.cmp(&a.year));
}

pub fn record_award(
    store: &mut impl RecordStore,
    award_id: &str,
    record: AwardRecord,
) -> Result<Vec<AwardRecord>, StoreError> {
    record_award_at(store, award_id, record, Utc::now())
}

pub fn record_award_at(
    store: &mut impl RecordStore,
    award_id: &str,
    mut record: AwardRecord,
    now: DateTime<Utc>,
) -> Result<Vec<AwardRecord>, StoreError> {
    let mut history = load_award_history(store, award_id);
    record.date = timestamp(now);
    info!(award_id, winner = %record.winner, season = record.season, "recording award winner");
    history.push(record);
    newest_season_first(&mut history);
    save_award_history(store, award_id, &history)?;
    Ok(history)
}

pub fn award_history(store: &impl RecordStore, award_id: &str) -> Vec<AwardRecord> {
    let mut history = load_award_history(store, award_id);
    newest_season_first(&mut history);
    history
}

pub fn record_champion(
    store: &mut impl RecordStore,
    record: ChampionshipRecord,
) -> Result<Vec<ChampionshipRecord>, StoreError> {
    record_champion_at(store, record, Utc::now())
}

pub fn record_champion_at(
    store: &mut impl RecordStore,
    mut record: ChampionshipRecord,
    now: DateTime<Utc>,
) -> Result<Vec<ChampionshipRecord>, StoreError> {
    let mut history = load_championship_history(store);
    record.date = timestamp(now);
    info!(name = %record.name, year = record.year, "recording champion");
    history.push(record);
    newest_year_first(&mut history);
    save_championship_history(store, &history)?;
    Ok(history)
}

pub fn championship_history(store: &impl RecordStore) -> Vec<ChampionshipRecord> {
    let mut history = load_championship_history(store);
    newest_year_first(&mut history);
    history
}
