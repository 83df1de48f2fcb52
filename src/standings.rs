use crate::league::series_members;
use crate::models::{DriverRecord, RaceState, Series};
use serde::Serialize;
use std::cmp::Ordering;

/// Standings positions per series that advance to the playoffs.
pub const QUALIFICATION_CUTOFF: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntry {
    pub name: String,
    pub total: u64,
    pub ch_wins: u32,
    pub wins: u32,
    pub points: u32,
    pub best_time: String,
    /// Races run across both series' counters.
    pub races: u32,
    pub win_percentage: f64,
}

impl StandingEntry {
    pub fn from_record(record: &DriverRecord, race_state: &RaceState) -> Self {
        let counters = race_state.combined(&record.name);
        Self {
            name: record.name.clone(),
            total: record.total(),
            ch_wins: record.ch_wins,
            wins: record.wins,
            points: record.points,
            best_time: record.best_time.clone(),
            races: counters.races(),
            win_percentage: counters.win_percentage(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStandings {
    pub series: Series,
    pub entries: Vec<StandingEntry>,
    /// Positions 14 and 15 are level; a tiebreaker race decides the last playoff spot.
    pub boundary_tie: bool,
}

/// Ranking order: any championship win beats none, more championship wins
/// beat fewer, and otherwise the higher total goes first.
pub fn compare_standings(a: &StandingEntry, b: &StandingEntry) -> Ordering {
    match (a.ch_wins > 0, b.ch_wins > 0) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) if a.ch_wins != b.ch_wins => b.ch_wins.cmp(&a.ch_wins),
        _ => b.total.cmp(&a.total),
    }
}

/// Sorts in place. Entries level on every key keep their input order.
pub fn rank(entries: &mut [StandingEntry]) {
    entries.sort_by(compare_standings);
}

pub fn build_standings<'a>(
    drivers: impl IntoIterator<Item = &'a DriverRecord>,
    race_state: &RaceState,
) -> Vec<StandingEntry> {
    let mut entries: Vec<StandingEntry> = drivers
        .into_iter()
        .map(|record| StandingEntry::from_record(record, race_state))
        .collect();
    rank(&mut entries);
    entries
}

pub fn series_standings(
    drivers: &[DriverRecord],
    race_state: &RaceState,
    series: Series,
) -> SeriesStandings {
    let entries = build_standings(series_members(drivers, series), race_state);
    SeriesStandings {
        series,
        boundary_tie: has_boundary_tie(&entries),
        entries,
    }
}

pub fn build_all_standings(
    drivers: &[DriverRecord],
    race_state: &RaceState,
) -> Vec<SeriesStandings> {
    Series::ALL
        .iter()
        .map(|series| series_standings(drivers, race_state, *series))
        .collect()
}

pub fn has_boundary_tie(entries: &[StandingEntry]) -> bool {
    match (
        entries.get(QUALIFICATION_CUTOFF - 1),
        entries.get(QUALIFICATION_CUTOFF),
    ) {
        (Some(last_in), Some(first_out)) => {
            last_in.ch_wins == first_out.ch_wins && last_in.total == first_out.total
        }
        _ => false,
    }
}
