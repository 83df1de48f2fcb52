use crate::league::LeagueSnapshot;
use crate::models::{DriverRecord, PlayoffData, PlayoffState, RaceState, Series};
use crate::standings::{QUALIFICATION_CUTOFF, StandingEntry, series_standings};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffRound {
    pub name: &'static str,
    pub races: u32,
    /// Drivers per series still standing once the round is over.
    pub target_count: usize,
}

pub const PLAYOFF_STRUCTURE: [PlayoffRound; 4] = [
    PlayoffRound {
        name: "ROUND 1",
        races: 3,
        target_count: 10,
    },
    PlayoffRound {
        name: "ROUND 2",
        races: 3,
        target_count: 6,
    },
    PlayoffRound {
        name: "ROUND 3",
        races: 2,
        target_count: 2,
    },
    PlayoffRound {
        name: "DIVISION FINAL",
        races: 5,
        target_count: 1,
    },
];

const TO_BE_DECIDED: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundStatus {
    Completed,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundProgress {
    pub round: PlayoffRound,
    pub status: RoundStatus,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedDriver {
    pub rank: usize,
    pub name: String,
    pub total: u64,
    pub wins: u32,
    pub ch_wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub position: usize,
    pub qualified: bool,
    pub entry: StandingEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsPreview {
    pub series: Series,
    pub rows: Vec<PreviewRow>,
    pub boundary_tie: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finalists {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub current_round: Option<PlayoffRound>,
    /// One-based race number within the current round.
    pub race_number: u32,
    pub is_final: bool,
    pub finalists: Option<Finalists>,
    pub qualified: Vec<QualifiedDriver>,
    pub qualification_slots: usize,
    pub rounds: Vec<RoundProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SeriesPlayoffView {
    /// The roster is empty; there is nothing to rank.
    NoData { series: Series },
    Preview { standings: StandingsPreview },
    Bracket {
        standings: StandingsPreview,
        bracket: Bracket,
    },
}

/// Progress of every round: finished rounds are full, the active one is
/// proportional to races run, later ones are empty.
pub fn round_progress(state: &PlayoffState) -> Vec<RoundProgress> {
    let current = state.current_round_index as usize;
    PLAYOFF_STRUCTURE
        .iter()
        .enumerate()
        .map(|(index, round)| {
            let (status, percent) = if index < current {
                (RoundStatus::Completed, 100.0)
            } else if index == current {
                (
                    RoundStatus::Active,
                    f64::from(state.current_race_in_round) / f64::from(round.races) * 100.0,
                )
            } else {
                (RoundStatus::Upcoming, 0.0)
            };
            RoundProgress {
                round: *round,
                status,
                percent,
            }
        })
        .collect()
}

/// Qualified list in stored order with each driver's display figures.
///
/// Wins prefer the race counters (Series B over Series A) when they are
/// non-zero; totals always come from the roster. Names missing from the
/// roster show zeros.
pub fn qualified_drivers(
    names: &[String],
    drivers: &[DriverRecord],
    race_state: &RaceState,
) -> Vec<QualifiedDriver> {
    let by_name: HashMap<&str, &DriverRecord> = drivers
        .iter()
        .map(|record| (record.name.as_str(), record))
        .collect();

    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let record = by_name.get(name.as_str());
            let counter_wins = Series::ALL
                .iter()
                .rev()
                .map(|series| race_state.stats(*series, name).wins)
                .find(|wins| *wins > 0);
            QualifiedDriver {
                rank: index + 1,
                name: name.clone(),
                total: record.map(|r| r.total()).unwrap_or(0),
                wins: counter_wins.or(record.map(|r| r.wins)).unwrap_or(0),
                ch_wins: record.map(|r| r.ch_wins).unwrap_or(0),
            }
        })
        .collect()
}

pub fn standings_preview(snapshot: &LeagueSnapshot, series: Series) -> StandingsPreview {
    let standings = series_standings(&snapshot.drivers, &snapshot.race_state, series);
    StandingsPreview {
        series,
        boundary_tie: standings.boundary_tie,
        rows: standings
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| PreviewRow {
                position: index + 1,
                qualified: index < QUALIFICATION_CUTOFF,
                entry,
            })
            .collect(),
    }
}

fn leader(data: &PlayoffData, series: Series) -> String {
    data.qualified(series)
        .first()
        .cloned()
        .unwrap_or_else(|| TO_BE_DECIDED.to_string())
}

pub fn series_view(snapshot: &LeagueSnapshot, series: Series) -> SeriesPlayoffView {
    if snapshot.drivers.is_empty() {
        return SeriesPlayoffView::NoData { series };
    }

    let standings = standings_preview(snapshot, series);
    let state = &snapshot.playoff_state;
    if !state.active {
        return SeriesPlayoffView::Preview { standings };
    }

    let data = &snapshot.playoff_data;
    let bracket = Bracket {
        current_round: PLAYOFF_STRUCTURE
            .get(state.current_round_index as usize)
            .copied(),
        race_number: state.current_race_in_round.saturating_add(1),
        is_final: state.is_final,
        finalists: state.is_final.then(|| Finalists {
            a: leader(data, Series::A),
            b: leader(data, Series::B),
        }),
        qualified: qualified_drivers(
            data.qualified(series),
            &snapshot.drivers,
            &snapshot.race_state,
        ),
        qualification_slots: QUALIFICATION_CUTOFF,
        rounds: round_progress(state),
    };
    SeriesPlayoffView::Bracket { standings, bracket }
}

pub fn playoff_overview(snapshot: &LeagueSnapshot) -> Vec<SeriesPlayoffView> {
    Series::ALL
        .iter()
        .map(|series| series_view(snapshot, *series))
        .collect()
}

/// Opens the playoffs: cursors reset and each series qualifies its top
/// standings positions.
pub fn start_playoffs(snapshot: &LeagueSnapshot) -> (PlayoffState, PlayoffData) {
    let mut data = PlayoffData::default();
    for series in Series::ALL {
        let standings = series_standings(&snapshot.drivers, &snapshot.race_state, series);
        *data.qualified_mut(series) = standings
            .entries
            .into_iter()
            .take(QUALIFICATION_CUTOFF)
            .map(|entry| entry.name)
            .collect();
    }

    let state = PlayoffState {
        active: true,
        current_round_index: 0,
        current_race_in_round: 0,
        is_final: PLAYOFF_STRUCTURE.len() == 1,
    };
    (state, data)
}

/// Records one finished playoff race. Returns `false` when nothing moved
/// (playoffs inactive, or the last round already complete).
///
/// Closing a round cuts every series' qualified list down to the round's
/// target count, keeping the leading names.
pub fn advance_race(state: &mut PlayoffState, data: &mut PlayoffData) -> bool {
    if !state.active {
        return false;
    }
    let index = state.current_round_index as usize;
    let Some(round) = PLAYOFF_STRUCTURE.get(index) else {
        return false;
    };
    if state.current_race_in_round >= round.races {
        return false;
    }

    state.current_race_in_round += 1;
    if state.current_race_in_round == round.races {
        for series in Series::ALL {
            data.qualified_mut(series).truncate(round.target_count);
        }
        if index + 1 < PLAYOFF_STRUCTURE.len() {
            state.current_round_index += 1;
            state.current_race_in_round = 0;
        }
    }
    state.is_final = state.current_round_index as usize == PLAYOFF_STRUCTURE.len() - 1;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CarStats;

    fn roster(count: u32) -> Vec<DriverRecord> {
        (0..count)
            .map(|i| DriverRecord {
                points: 100 - i,
                ..DriverRecord::new(format!("d{i}"))
            })
            .collect()
    }

    fn snapshot(drivers: Vec<DriverRecord>) -> LeagueSnapshot {
        LeagueSnapshot {
            drivers,
            ..LeagueSnapshot::default()
        }
    }

    #[test]
    fn empty_roster_reports_no_data() {
        let views = playoff_overview(&LeagueSnapshot::default());
        assert_eq!(
            views,
            [
                SeriesPlayoffView::NoData { series: Series::A },
                SeriesPlayoffView::NoData { series: Series::B },
            ]
        );
    }

    #[test]
    fn inactive_playoffs_show_preview_with_cutoff() {
        let view = series_view(&snapshot(roster(32)), Series::A);
        let SeriesPlayoffView::Preview { standings } = view else {
            panic!("expected preview");
        };
        assert_eq!(standings.rows.len(), 16);
        assert!(standings.rows[13].qualified);
        assert!(!standings.rows[14].qualified);
        assert_eq!(standings.rows[0].position, 1);
        assert!(!standings.boundary_tie);
    }

    #[test]
    fn progress_tracks_the_active_round() {
        let state = PlayoffState {
            active: true,
            current_round_index: 1,
            current_race_in_round: 1,
            is_final: false,
        };
        let rounds = round_progress(&state);
        assert_eq!(rounds[0].status, RoundStatus::Completed);
        assert_eq!(rounds[0].percent, 100.0);
        assert_eq!(rounds[1].status, RoundStatus::Active);
        assert!((rounds[1].percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(rounds[2].status, RoundStatus::Upcoming);
        assert_eq!(rounds[3].percent, 0.0);
    }

    #[test]
    fn bracket_uses_stored_qualified_list() {
        let mut snap = snapshot(roster(4));
        snap.playoff_state.active = true;
        snap.playoff_data.a.qualified = vec!["d1".to_string(), "ghost".to_string()];
        snap.race_state
            .b
            .car_stats
            .insert("d1".to_string(), CarStats { wins: 4, losses: 0 });

        let SeriesPlayoffView::Bracket { bracket, .. } = series_view(&snap, Series::A) else {
            panic!("expected bracket");
        };
        assert_eq!(bracket.current_round.map(|r| r.name), Some("ROUND 1"));
        assert_eq!(bracket.race_number, 1);
        assert!(bracket.finalists.is_none());
        assert_eq!(
            bracket.qualified[0],
            QualifiedDriver {
                rank: 1,
                name: "d1".to_string(),
                total: 99,
                wins: 4,
                ch_wins: 0,
            }
        );
        assert_eq!(bracket.qualified[1].total, 0);
        assert_eq!(bracket.qualified[1].rank, 2);
    }

    #[test]
    fn final_names_series_leaders_or_tbd() {
        let mut snap = snapshot(roster(4));
        snap.playoff_state = PlayoffState {
            active: true,
            current_round_index: 3,
            current_race_in_round: 0,
            is_final: true,
        };
        snap.playoff_data.a.qualified = vec!["d0".to_string()];

        let SeriesPlayoffView::Bracket { bracket, .. } = series_view(&snap, Series::B) else {
            panic!("expected bracket");
        };
        assert_eq!(
            bracket.finalists,
            Some(Finalists {
                a: "d0".to_string(),
                b: "TBD".to_string(),
            })
        );
    }

    #[test]
    fn start_qualifies_top_fourteen_per_series() {
        let (state, data) = start_playoffs(&snapshot(roster(40)));
        assert!(state.active);
        assert_eq!(state.current_round_index, 0);
        assert_eq!(data.qualified(Series::A).len(), 14);
        assert_eq!(data.qualified(Series::A)[0], "d0");
        assert_eq!(data.qualified(Series::B)[0], "d20");
    }

    #[test]
    fn advancing_through_every_round_narrows_the_field() {
        let (mut state, mut data) = start_playoffs(&snapshot(roster(40)));

        for _ in 0..3 {
            assert!(advance_race(&mut state, &mut data));
        }
        assert_eq!(state.current_round_index, 1);
        assert_eq!(state.current_race_in_round, 0);
        assert_eq!(data.qualified(Series::A).len(), 10);

        for _ in 0..5 {
            advance_race(&mut state, &mut data);
        }
        assert_eq!(state.current_round_index, 3);
        assert!(state.is_final);
        assert_eq!(data.qualified(Series::B).len(), 2);

        for _ in 0..5 {
            assert!(advance_race(&mut state, &mut data));
        }
        assert_eq!(data.qualified(Series::A), ["d0"]);
        assert!(!advance_race(&mut state, &mut data));
        assert_eq!(round_progress(&state)[3].percent, 100.0);
    }

    #[test]
    fn advancing_inactive_playoffs_is_a_no_op() {
        let mut state = PlayoffState::default();
        let mut data = PlayoffData::default();
        assert!(!advance_race(&mut state, &mut data));
        assert_eq!(state, PlayoffState::default());
    }
}
