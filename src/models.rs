use crate::coerce;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lap time placeholder for a driver with no recorded time.
pub const NO_TIME: &str = "--";
/// Lap time placeholder for a driver who did not finish.
pub const DID_NOT_FINISH: &str = "DNF";

/// Lap time in seconds, or `None` for the sentinels and anything unparsable.
///
/// Accepts `ss.xx`, `m:ss.xx` and `h:mm:ss.xx`, with either a comma or a
/// period as the decimal separator.
pub fn parse_lap_time(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_TIME || trimmed == DID_NOT_FINISH {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let (last, leading) = parts.split_last()?;
    let mut seconds = 0.0;
    for part in leading {
        let unit: u32 = part.parse().ok()?;
        seconds = (seconds + f64::from(unit)) * 60.0;
    }
    let tail: f64 = last.parse().ok()?;
    if !tail.is_finite() || tail < 0.0 || (!leading.is_empty() && tail >= 60.0) {
        return None;
    }
    Some(seconds + tail)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Series {
    A,
    B,
}

impl Series {
    pub const ALL: [Series; 2] = [Series::A, Series::B];

    pub fn label(self) -> &'static str {
        match self {
            Series::A => "A",
            Series::B => "B",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" | "a" => Some(Series::A),
            "B" | "b" => Some(Series::B),
            _ => None,
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn lenient_series<'de, D>(deserializer: D) -> Result<Option<Series>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = coerce::lenient_opt_string(deserializer)?;
    Ok(raw.as_deref().and_then(Series::parse))
}

/// One competitor on the roster. `name` is the only join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub number: String,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub points: u32,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub wins: u32,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub ch_wins: u32,
    #[serde(default = "coerce::default_lap_time", deserialize_with = "coerce::lap_time")]
    pub best_time: String,
    /// Explicit series membership. When absent the roster position decides.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_series"
    )]
    pub serie: Option<Series>,
}

impl DriverRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: String::new(),
            points: 0,
            wins: 0,
            ch_wins: 0,
            best_time: NO_TIME.to_string(),
            serie: None,
        }
    }

    /// Composite ranking score: ten per win plus season points.
    pub fn total(&self) -> u64 {
        u64::from(self.wins) * 10 + u64::from(self.points)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarStats {
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub wins: u32,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub losses: u32,
}

impl CarStats {
    pub fn races(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    pub fn merged(self, other: CarStats) -> CarStats {
        CarStats {
            wins: self.wins.saturating_add(other.wins),
            losses: self.losses.saturating_add(other.losses),
        }
    }

    /// Percentage in `0..=100`, zero when no races were run.
    pub fn win_percentage(&self) -> f64 {
        let races = self.races();
        if races == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(races) * 100.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesCounters {
    #[serde(default, deserialize_with = "coerce::lenient_map")]
    pub car_stats: BTreeMap<String, CarStats>,
}

/// Per-series race counters, independent of `DriverRecord::wins`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    #[serde(rename = "A", default, deserialize_with = "coerce::lenient_object")]
    pub a: SeriesCounters,
    #[serde(rename = "B", default, deserialize_with = "coerce::lenient_object")]
    pub b: SeriesCounters,
}

impl RaceState {
    pub fn series(&self, series: Series) -> &SeriesCounters {
        match series {
            Series::A => &self.a,
            Series::B => &self.b,
        }
    }

    pub fn series_mut(&mut self, series: Series) -> &mut SeriesCounters {
        match series {
            Series::A => &mut self.a,
            Series::B => &mut self.b,
        }
    }

    pub fn stats(&self, series: Series, name: &str) -> CarStats {
        self.series(series)
            .car_stats
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    /// Both series' counters for one driver added together.
    pub fn combined(&self, name: &str) -> CarStats {
        self.stats(Series::A, name).merged(self.stats(Series::B, name))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffState {
    #[serde(default, deserialize_with = "coerce::lenient_bool")]
    pub active: bool,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub current_round_index: u32,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub current_race_in_round: u32,
    #[serde(default, deserialize_with = "coerce::lenient_bool")]
    pub is_final: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesQualification {
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub qualified: Vec<String>,
}

/// Rank-ordered qualified names per series; the first entry leads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayoffData {
    #[serde(rename = "A", default, deserialize_with = "coerce::lenient_object")]
    pub a: SeriesQualification,
    #[serde(rename = "B", default, deserialize_with = "coerce::lenient_object")]
    pub b: SeriesQualification,
}

impl PlayoffData {
    pub fn qualified(&self, series: Series) -> &[String] {
        match series {
            Series::A => &self.a.qualified,
            Series::B => &self.b.qualified,
        }
    }

    pub fn qualified_mut(&mut self, series: Series) -> &mut Vec<String> {
        match series {
            Series::A => &mut self.a.qualified,
            Series::B => &mut self.b.qualified,
        }
    }

    pub fn is_qualified(&self, name: &str) -> bool {
        Series::ALL
            .iter()
            .any(|series| self.qualified(*series).iter().any(|q| q == name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub winner: String,
    #[serde(default, deserialize_with = "coerce::lenient_i32")]
    pub season: i32,
    #[serde(default, deserialize_with = "coerce::lenient_opt_u32")]
    pub value: Option<u32>,
    #[serde(default, deserialize_with = "coerce::lenient_opt_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_opt_u32")]
    pub points: Option<u32>,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub date: String,
}

impl AwardRecord {
    pub fn new(winner: impl Into<String>, season: i32) -> Self {
        Self {
            winner: winner.into(),
            season,
            value: None,
            time: None,
            points: None,
            date: String::new(),
        }
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionshipRecord {
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::lenient_i32")]
    pub year: i32,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub wins: u32,
    #[serde(default, deserialize_with = "coerce::lenient_u32")]
    pub points: u32,
    #[serde(default, deserialize_with = "lenient_series")]
    pub serie: Option<Series>,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub date: String,
}

impl ChampionshipRecord {
    pub fn new(
        name: impl Into<String>,
        year: i32,
        wins: u32,
        points: u32,
        serie: Option<Series>,
    ) -> Self {
        Self {
            name: name.into(),
            year,
            wins,
            points,
            serie,
            date: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordAwardRequest {
    pub winner: String,
    pub season: Option<i32>,
    pub value: Option<u32>,
    pub time: Option<String>,
    pub points: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RecordChampionRequest {
    pub name: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub points: u32,
    pub serie: Option<Series>,
}

/// Hall-of-fame form fields arrive as raw text and are coerced like stored values.
#[derive(Debug, Deserialize)]
pub struct ChampionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub wins: String,
    #[serde(default)]
    pub points: String,
    #[serde(default)]
    pub serie: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverListQuery {
    pub filter: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverQuery {
    pub driver: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AwardQuery {
    pub award: Option<String>,
}
