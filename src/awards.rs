use crate::league::series_members;
use crate::models::{DriverRecord, RaceState, Series, parse_lap_time};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AwardKind {
    FastestLap,
    MostWins,
    MostConsistent,
    SpeedConsistency,
    OverallBestRacer,
    ChWinner,
    SerieAWinner,
    SerieBWinner,
    OverallWinner,
    BestImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AwardCategory {
    Performance,
    Championship,
    Special,
}

impl AwardCategory {
    pub const ALL: [AwardCategory; 3] = [
        AwardCategory::Performance,
        AwardCategory::Championship,
        AwardCategory::Special,
    ];

    pub fn title(self) -> &'static str {
        match self {
            AwardCategory::Performance => "Performance Awards",
            AwardCategory::Championship => "Championship Awards",
            AwardCategory::Special => "Special Awards",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardDefinition {
    pub kind: AwardKind,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub category: AwardCategory,
    pub gold: bool,
}

impl AwardKind {
    pub const ALL: [AwardKind; 10] = [
        AwardKind::FastestLap,
        AwardKind::MostWins,
        AwardKind::MostConsistent,
        AwardKind::SpeedConsistency,
        AwardKind::OverallBestRacer,
        AwardKind::ChWinner,
        AwardKind::SerieAWinner,
        AwardKind::SerieBWinner,
        AwardKind::OverallWinner,
        AwardKind::BestImprovement,
    ];

    /// Identifier used in URLs and history keys.
    pub fn id(self) -> &'static str {
        match self {
            AwardKind::FastestLap => "fastestLap",
            AwardKind::MostWins => "mostWins",
            AwardKind::MostConsistent => "mostConsistent",
            AwardKind::SpeedConsistency => "speedConsistency",
            AwardKind::OverallBestRacer => "overallBestRacer",
            AwardKind::ChWinner => "chWinner",
            AwardKind::SerieAWinner => "serieAWinner",
            AwardKind::SerieBWinner => "serieBWinner",
            AwardKind::OverallWinner => "overallWinner",
            AwardKind::BestImprovement => "bestImprovement",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Awards decided outside this engine, typically at season end.
    pub fn is_external(self) -> bool {
        matches!(
            self,
            AwardKind::MostConsistent
                | AwardKind::SpeedConsistency
                | AwardKind::OverallBestRacer
                | AwardKind::ChWinner
                | AwardKind::BestImprovement
        )
    }

    pub fn definition(self) -> AwardDefinition {
        let (title, icon, description, category, gold) = match self {
            AwardKind::FastestLap => (
                "Fastest Lap",
                "⚡",
                "Best lap time recorded during qualifying or races.",
                AwardCategory::Performance,
                false,
            ),
            AwardKind::MostWins => (
                "Most Wins",
                "👑",
                "Most race victories across the roster and both series.",
                AwardCategory::Performance,
                true,
            ),
            AwardKind::MostConsistent => (
                "Most Consistent",
                "📊",
                "Best average result across all races.",
                AwardCategory::Performance,
                false,
            ),
            AwardKind::SpeedConsistency => (
                "Speed Consistency (Qualifying)",
                "🎯",
                "Smallest spread of qualifying times.",
                AwardCategory::Performance,
                false,
            ),
            AwardKind::OverallBestRacer => (
                "Overall Best Racer",
                "⭐",
                "Strongest driver across every metric.",
                AwardCategory::Performance,
                true,
            ),
            AwardKind::ChWinner => (
                "CH Winner",
                "🏁",
                "Winner of the championship final.",
                AwardCategory::Performance,
                true,
            ),
            AwardKind::SerieAWinner => (
                "Serie A Winner",
                "🏆",
                "Top of Serie A after the season and playoffs.",
                AwardCategory::Championship,
                true,
            ),
            AwardKind::SerieBWinner => (
                "Serie B Winner",
                "🏆",
                "Top of Serie B after the season and playoffs.",
                AwardCategory::Championship,
                true,
            ),
            AwardKind::OverallWinner => (
                "Overall Winner",
                "🌟",
                "Highest total across both series.",
                AwardCategory::Championship,
                true,
            ),
            AwardKind::BestImprovement => (
                "Best Improvement",
                "📈",
                "Biggest step forward from last season to this one.",
                AwardCategory::Special,
                false,
            ),
        };
        AwardDefinition {
            kind: self,
            title,
            icon,
            description,
            category,
            gold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AwardValue {
    LapTime { seconds: f64, time: String },
    Wins { count: u32 },
    Points { total: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AwardOutcome {
    Winner { winner: String, value: AwardValue },
    NoWinner,
    /// Computed elsewhere and only ever shown from history.
    NotYetAvailable,
}

impl AwardOutcome {
    pub fn winner(&self) -> Option<&str> {
        match self {
            AwardOutcome::Winner { winner, .. } => Some(winner),
            _ => None,
        }
    }
}

pub type Awards = BTreeMap<AwardKind, AwardOutcome>;

/// Scans in order and keeps a candidate only when it strictly beats the
/// current best, so the first driver reaching a value holds it.
fn first_best<T, I, F>(candidates: I, beats: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> bool,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if !beats(&candidate, &current) => Some(current),
        _ => Some(candidate),
    })
}

pub fn fastest_lap(drivers: &[DriverRecord]) -> AwardOutcome {
    let timed = drivers
        .iter()
        .filter_map(|record| parse_lap_time(&record.best_time).map(|seconds| (record, seconds)));
    match first_best(timed, |candidate, best| candidate.1 < best.1) {
        Some((record, seconds)) => AwardOutcome::Winner {
            winner: record.name.clone(),
            value: AwardValue::LapTime {
                seconds,
                time: record.best_time.clone(),
            },
        },
        None => AwardOutcome::NoWinner,
    }
}

/// Wins per driver are the largest of the roster figure and either
/// series' race counter. Counter entries for names off the roster still
/// compete after the roster: Series A before Series B, and by name within
/// a series, since counters are kept keyed by name.
pub fn most_wins(drivers: &[DriverRecord], race_state: &RaceState) -> AwardOutcome {
    let roster: HashSet<&str> = drivers.iter().map(|record| record.name.as_str()).collect();
    let rostered = drivers.iter().map(|record| {
        let wins = Series::ALL
            .into_iter()
            .map(|series| race_state.stats(series, &record.name).wins)
            .fold(record.wins, u32::max);
        (record.name.as_str(), wins)
    });
    let roster = &roster;
    let unrostered = Series::ALL.into_iter().flat_map(move |series| {
        race_state
            .series(series)
            .car_stats
            .iter()
            .filter(move |(name, _)| !roster.contains(name.as_str()))
            .map(|(name, stats)| (name.as_str(), stats.wins))
    });

    let candidates = rostered.chain(unrostered).filter(|(_, wins)| *wins > 0);
    match first_best(candidates, |candidate, best| candidate.1 > best.1) {
        Some((name, count)) => AwardOutcome::Winner {
            winner: name.to_string(),
            value: AwardValue::Wins { count },
        },
        None => AwardOutcome::NoWinner,
    }
}

pub fn top_total<'a>(drivers: impl IntoIterator<Item = &'a DriverRecord>) -> AwardOutcome {
    let totals = drivers.into_iter().map(|record| (record, record.total()));
    match first_best(totals, |candidate, best| candidate.1 > best.1) {
        Some((record, total)) => AwardOutcome::Winner {
            winner: record.name.clone(),
            value: AwardValue::Points { total },
        },
        None => AwardOutcome::NoWinner,
    }
}

/// Current holder of every award. Externally decided awards are always
/// present as [`AwardOutcome::NotYetAvailable`].
pub fn calculate_awards(drivers: &[DriverRecord], race_state: &RaceState) -> Awards {
    AwardKind::ALL
        .into_iter()
        .map(|kind| {
            let outcome = match kind {
                AwardKind::FastestLap => fastest_lap(drivers),
                AwardKind::MostWins => most_wins(drivers, race_state),
                AwardKind::SerieAWinner => top_total(series_members(drivers, Series::A)),
                AwardKind::SerieBWinner => top_total(series_members(drivers, Series::B)),
                AwardKind::OverallWinner => top_total(drivers),
                _ => AwardOutcome::NotYetAvailable,
            };
            (kind, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CarStats;

    fn driver(name: &str, wins: u32, points: u32, best_time: &str) -> DriverRecord {
        DriverRecord {
            wins,
            points,
            best_time: best_time.to_string(),
            ..DriverRecord::new(name)
        }
    }

    #[test]
    fn dnf_is_excluded_and_wins_compare_across_drivers() {
        let drivers = vec![driver("X", 5, 10, "1:20.00"), driver("Y", 9, 0, "DNF")];
        let awards = calculate_awards(&drivers, &RaceState::default());

        assert_eq!(
            awards[&AwardKind::MostWins],
            AwardOutcome::Winner {
                winner: "Y".to_string(),
                value: AwardValue::Wins { count: 9 },
            }
        );
        assert_eq!(awards[&AwardKind::FastestLap].winner(), Some("X"));
    }

    #[test]
    fn fastest_lap_skips_unparsable_times_and_keeps_first_on_ties() {
        let drivers = vec![
            driver("none", 0, 0, "--"),
            driver("junk", 0, 0, "quick"),
            driver("first", 0, 0, "1:24,50"),
            driver("second", 0, 0, "1:24.50"),
        ];
        let AwardOutcome::Winner { winner, value } = fastest_lap(&drivers) else {
            panic!("expected a winner");
        };
        assert_eq!(winner, "first");
        assert_eq!(
            value,
            AwardValue::LapTime {
                seconds: 84.5,
                time: "1:24,50".to_string(),
            }
        );
    }

    #[test]
    fn most_wins_takes_the_largest_source_not_the_sum() {
        let drivers = vec![driver("X", 3, 0, "--"), driver("Y", 4, 0, "--")];
        let mut race_state = RaceState::default();
        race_state
            .a
            .car_stats
            .insert("X".to_string(), CarStats { wins: 2, losses: 0 });
        race_state
            .b
            .car_stats
            .insert("X".to_string(), CarStats { wins: 3, losses: 0 });

        assert_eq!(most_wins(&drivers, &race_state).winner(), Some("Y"));

        race_state
            .b
            .car_stats
            .insert("X".to_string(), CarStats { wins: 6, losses: 0 });
        assert_eq!(
            most_wins(&drivers, &race_state),
            AwardOutcome::Winner {
                winner: "X".to_string(),
                value: AwardValue::Wins { count: 6 },
            }
        );
    }

    #[test]
    fn counters_for_unknown_names_still_compete() {
        let mut race_state = RaceState::default();
        race_state
            .b
            .car_stats
            .insert("guest".to_string(), CarStats { wins: 8, losses: 1 });
        let drivers = vec![driver("X", 8, 0, "--")];

        assert_eq!(most_wins(&drivers, &race_state).winner(), Some("X"));
        assert_eq!(most_wins(&[], &race_state).winner(), Some("guest"));
    }

    #[test]
    fn unrostered_counter_ties_go_to_series_a_then_name_order() {
        let mut race_state = RaceState::default();
        for (series, name) in [(Series::B, "aaron"), (Series::A, "zed"), (Series::A, "mia")] {
            race_state
                .series_mut(series)
                .car_stats
                .insert(name.to_string(), CarStats { wins: 5, losses: 0 });
        }
        assert_eq!(most_wins(&[], &race_state).winner(), Some("mia"));
    }

    #[test]
    fn series_winners_use_their_partition() {
        let drivers = vec![
            driver("a1", 1, 0, "--"),
            driver("a2", 2, 0, "--"),
            driver("b1", 9, 0, "--"),
            driver("b2", 0, 95, "--"),
        ];
        let awards = calculate_awards(&drivers, &RaceState::default());

        assert_eq!(awards[&AwardKind::SerieAWinner].winner(), Some("a2"));
        assert_eq!(awards[&AwardKind::SerieBWinner].winner(), Some("b2"));
        assert_eq!(
            awards[&AwardKind::OverallWinner],
            AwardOutcome::Winner {
                winner: "b2".to_string(),
                value: AwardValue::Points { total: 95 },
            }
        );
    }

    #[test]
    fn empty_roster_has_no_winners_but_keeps_placeholders() {
        let awards = calculate_awards(&[], &RaceState::default());

        assert_eq!(awards.len(), AwardKind::ALL.len());
        for kind in AwardKind::ALL {
            let expected = if kind.is_external() {
                AwardOutcome::NotYetAvailable
            } else {
                AwardOutcome::NoWinner
            };
            assert_eq!(awards[&kind], expected, "{}", kind.id());
        }
    }

    #[test]
    fn zero_wins_is_not_a_winner() {
        let drivers = vec![driver("X", 0, 10, "--")];
        assert_eq!(most_wins(&drivers, &RaceState::default()), AwardOutcome::NoWinner);
    }

    #[test]
    fn ids_round_trip() {
        for kind in AwardKind::ALL {
            assert_eq!(AwardKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(AwardKind::from_id("fastest"), None);
    }
}
