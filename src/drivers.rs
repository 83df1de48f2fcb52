use crate::league::{LeagueSnapshot, assign_series};
use crate::models::Series;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub name: String,
    pub number: String,
    pub points: u32,
    pub wins: u32,
    pub ch_wins: u32,
    pub best_time: String,
    pub total: u64,
    pub serie: Series,
    pub total_races: u32,
    pub win_percentage: f64,
    pub playoff_qualified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverFilter {
    #[default]
    All,
    Series(Series),
    Playoff,
}

impl DriverFilter {
    /// Unknown values fall back to showing everyone.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("serie-a") => DriverFilter::Series(Series::A),
            Some("serie-b") => DriverFilter::Series(Series::B),
            Some("playoff") => DriverFilter::Playoff,
            _ => DriverFilter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DriverFilter::All => "all",
            DriverFilter::Series(Series::A) => "serie-a",
            DriverFilter::Series(Series::B) => "serie-b",
            DriverFilter::Playoff => "playoff",
        }
    }

    fn matches(self, profile: &DriverProfile) -> bool {
        match self {
            DriverFilter::All => true,
            DriverFilter::Series(series) => profile.serie == series,
            DriverFilter::Playoff => profile.playoff_qualified,
        }
    }
}

pub fn build_profiles(snapshot: &LeagueSnapshot) -> Vec<DriverProfile> {
    snapshot
        .drivers
        .iter()
        .zip(assign_series(&snapshot.drivers))
        .map(|(record, serie)| {
            let counters = snapshot.race_state.combined(&record.name);
            DriverProfile {
                name: record.name.clone(),
                number: record.number.clone(),
                points: record.points,
                wins: record.wins,
                ch_wins: record.ch_wins,
                best_time: record.best_time.clone(),
                total: record.total(),
                serie,
                total_races: counters.races(),
                win_percentage: counters.win_percentage(),
                playoff_qualified: snapshot.playoff_data.is_qualified(&record.name),
            }
        })
        .collect()
}

/// Filtered, searched (case-insensitive substring) and sorted by total,
/// highest first. Equal totals keep roster order.
pub fn filter_profiles(
    mut profiles: Vec<DriverProfile>,
    filter: DriverFilter,
    search: &str,
) -> Vec<DriverProfile> {
    let needle = search.trim().to_lowercase();
    profiles.retain(|profile| {
        filter.matches(profile)
            && (needle.is_empty() || profile.name.to_lowercase().contains(&needle))
    });
    profiles.sort_by(|a, b| b.total.cmp(&a.total));
    profiles
}

/// First profile carrying this name.
pub fn find_profile(snapshot: &LeagueSnapshot, name: &str) -> Option<DriverProfile> {
    build_profiles(snapshot)
        .into_iter()
        .find(|profile| profile.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarStats, DriverRecord};

    fn snapshot() -> LeagueSnapshot {
        let drivers = ["Time Track", "Delorean", "Stinger GT", "Drifter"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| DriverRecord {
                points: 10 * i as u32,
                ..DriverRecord::new(name)
            })
            .collect();
        let mut snapshot = LeagueSnapshot {
            drivers,
            ..LeagueSnapshot::default()
        };
        snapshot.playoff_data.b.qualified = vec!["Drifter".to_string()];
        snapshot
            .race_state
            .a
            .car_stats
            .insert("Delorean".to_string(), CarStats { wins: 2, losses: 6 });
        snapshot
    }

    #[test]
    fn profiles_carry_series_and_counters() {
        let profiles = build_profiles(&snapshot());
        assert_eq!(profiles[1].serie, Series::A);
        assert_eq!(profiles[2].serie, Series::B);
        assert_eq!(profiles[1].total_races, 8);
        assert_eq!(profiles[1].win_percentage, 25.0);
        assert!(profiles[3].playoff_qualified);
        assert!(!profiles[0].playoff_qualified);
    }

    #[test]
    fn filters_and_search_combine() {
        let snap = snapshot();
        let series_a = filter_profiles(build_profiles(&snap), DriverFilter::Series(Series::A), "");
        let names: Vec<&str> = series_a.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Delorean", "Time Track"]);

        let searched = filter_profiles(build_profiles(&snap), DriverFilter::All, "  TRACK");
        assert_eq!(searched.len(), 1);

        let playoff = filter_profiles(build_profiles(&snap), DriverFilter::Playoff, "");
        assert_eq!(playoff[0].name, "Drifter");
    }

    #[test]
    fn filter_parsing_defaults_to_all() {
        assert_eq!(DriverFilter::parse(Some("serie-b")), DriverFilter::Series(Series::B));
        assert_eq!(DriverFilter::parse(Some("bogus")), DriverFilter::All);
        assert_eq!(DriverFilter::parse(None), DriverFilter::All);
    }

    #[test]
    fn missing_driver_is_none() {
        let snap = snapshot();
        assert!(find_profile(&snap, "Delorean").is_some());
        assert!(find_profile(&snap, "Nobody").is_none());
    }
}
