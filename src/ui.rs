use crate::awards::{AwardCategory, AwardDefinition, AwardKind, AwardOutcome, AwardValue, Awards};
use crate::drivers::{DriverFilter, DriverProfile};
use crate::hall_of_fame::{HallOfFame, RecordHolder};
use crate::models::{AwardRecord, Series};
use crate::playoff::{Bracket, RoundStatus, SeriesPlayoffView, StandingsPreview};
use crate::standings::{QUALIFICATION_CUTOFF, SeriesStandings, StandingEntry};

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Percent-encodes a query parameter value.
pub fn encode_query(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn driver_link(name: &str) -> String {
    format!(
        r#"<a class="driver-link" href="/driver?driver={}">{}</a>"#,
        encode_query(name),
        escape_html(name)
    )
}

pub fn render_page(title: &str, refresh_secs: u64, body: &str) -> String {
    let refresh = if refresh_secs > 0 {
        format!(r#"<meta http-equiv="refresh" content="{refresh_secs}" />"#)
    } else {
        String::new()
    };
    PAGE_HTML
        .replace("{{REFRESH}}", &refresh)
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BODY}}", body)
}

pub fn render_not_found(heading: &str, message: &str) -> String {
    format!(
        r#"<section class="empty-state"><h2>{}</h2><p>{}</p></section>"#,
        escape_html(heading),
        escape_html(message)
    )
}

fn standings_table(
    series: Series,
    rows: &[(usize, bool, &StandingEntry)],
    boundary_tie: bool,
) -> String {
    let mut html = format!(
        r#"<section class="card"><h2>Serie {series} Standings</h2><table><thead><tr><th>Pos</th><th>Car</th><th>CH Wins</th><th>Total</th></tr></thead><tbody>"#
    );
    for &(position, qualified, entry) in rows {
        let mut classes = Vec::new();
        if position == QUALIFICATION_CUTOFF + 1 {
            classes.push("cutoff");
        }
        if entry.ch_wins > 0 {
            classes.push("champion");
        } else if !qualified {
            classes.push("out");
        }
        html.push_str(&format!(
            r#"<tr class="{}"><td>{position}</td><td>{}</td><td class="gold">{}</td><td>{}</td></tr>"#,
            classes.join(" "),
            driver_link(&entry.name),
            entry.ch_wins,
            entry.total
        ));
        if position == QUALIFICATION_CUTOFF && boundary_tie {
            html.push_str(
                r#"<tr class="tie"><td colspan="4"><strong>TIED</strong><br />A race is required to decide who enters the playoffs</td></tr>"#,
            );
        }
    }
    if rows.is_empty() {
        html.push_str(r#"<tr><td colspan="4" class="muted">No drivers in this series</td></tr>"#);
    }
    html.push_str("</tbody></table></section>");
    html
}

pub fn render_standings(standings: &[SeriesStandings]) -> String {
    let mut html = String::from(r#"<div class="columns">"#);
    for series in standings {
        let rows: Vec<_> = series
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index + 1, index < QUALIFICATION_CUTOFF, entry))
            .collect();
        html.push_str(&standings_table(series.series, &rows, series.boundary_tie));
    }
    html.push_str("</div>");
    html
}

fn preview_table(preview: &StandingsPreview) -> String {
    let rows: Vec<_> = preview
        .rows
        .iter()
        .map(|row| (row.position, row.qualified, &row.entry))
        .collect();
    standings_table(preview.series, &rows, preview.boundary_tie)
}

fn render_bracket(series: Series, bracket: &Bracket) -> String {
    let mut html = String::from(r#"<section class="card"><h2>Current Status</h2>"#);
    match bracket.current_round {
        Some(round) => html.push_str(&format!(
            "<p><strong>Active Round:</strong> {}</p><p>Race {} / {}</p>",
            escape_html(round.name),
            bracket.race_number,
            round.races
        )),
        None => html.push_str("<p><strong>Active Round:</strong> N/A</p>"),
    }
    html.push_str("</section>");

    if let Some(finalists) = &bracket.finalists {
        html.push_str(&format!(
            r#"<section class="card final"><h2>🏁 FASTWAY FINAL 🏁</h2><div class="columns"><div><h3>Série A Champion</h3><p class="big">{}</p></div><div><h3>Série B Champion</h3><p class="big">{}</p></div></div></section>"#,
            escape_html(&finalists.a),
            escape_html(&finalists.b)
        ));
    }

    html.push_str(&format!(
        r#"<section class="card"><h2>Série {series} Qualified Drivers</h2><h3>{} / {} Qualified</h3>"#,
        bracket.qualified.len(),
        bracket.qualification_slots
    ));
    if bracket.qualified.is_empty() {
        html.push_str(r#"<p class="muted">No drivers qualified yet</p>"#);
    }
    for driver in &bracket.qualified {
        html.push_str(&format!(
            r#"<div class="qualified"><strong>#{}</strong> {}<div class="muted">Total: {} | Wins: {} | CH: {}</div></div>"#,
            driver.rank,
            driver_link(&driver.name),
            driver.total,
            driver.wins,
            driver.ch_wins
        ));
    }
    html.push_str("</section>");

    html.push_str(r#"<section class="card"><h2>Playoff Rounds</h2><div class="grid">"#);
    for progress in &bracket.rounds {
        let class = match progress.status {
            RoundStatus::Completed => "round completed",
            RoundStatus::Active => "round active",
            RoundStatus::Upcoming => "round",
        };
        html.push_str(&format!(
            r#"<div class="{class}"><h3>{}</h3><p>Races: {} | Target: {} drivers per series</p><p>Progress {:.0}%</p><div class="bar"><div class="fill" style="width: {:.1}%"></div></div></div>"#,
            escape_html(progress.round.name),
            progress.round.races,
            progress.round.target_count,
            progress.percent,
            progress.percent.clamp(0.0, 100.0)
        ));
    }
    html.push_str("</div></section>");
    html
}

pub fn render_playoffs(views: &[SeriesPlayoffView]) -> String {
    let mut html = String::from(r#"<div class="columns">"#);
    for view in views {
        html.push_str(r#"<div class="column">"#);
        match view {
            SeriesPlayoffView::NoData { .. } => {
                html.push_str(&render_not_found(
                    "No Driver Data Available",
                    "Please add driver data first.",
                ));
            }
            SeriesPlayoffView::Preview { standings } => {
                html.push_str(&preview_table(standings));
                html.push_str(
                    r#"<section class="empty-state"><h2>Playoffs Not Started</h2><p>The playoffs begin after the regular season is complete.</p></section>"#,
                );
            }
            SeriesPlayoffView::Bracket { standings, bracket } => {
                html.push_str(&preview_table(standings));
                html.push_str(&render_bracket(standings.series, bracket));
            }
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

pub fn render_drivers(
    profiles: &[DriverProfile],
    filter: DriverFilter,
    search: &str,
    roster_empty: bool,
) -> String {
    let mut html = String::from(r#"<form class="filters" method="get" action="/drivers">"#);
    for (value, label) in [
        ("all", "All"),
        ("serie-a", "Serie A"),
        ("serie-b", "Serie B"),
        ("playoff", "Playoff"),
    ] {
        let active = if filter.as_str() == value { " active" } else { "" };
        html.push_str(&format!(
            r#"<button class="filter-btn{active}" name="filter" value="{value}">{label}</button>"#
        ));
    }
    html.push_str(&format!(
        r#"<input type="search" name="q" placeholder="Search drivers" value="{}" /></form>"#,
        escape_html(search)
    ));

    if roster_empty {
        html.push_str(
            r#"<p class="muted">No driver data available. Complete some races first!</p>"#,
        );
        return html;
    }
    if profiles.is_empty() {
        html.push_str(r#"<p class="muted">No drivers match your search criteria.</p>"#);
        return html;
    }

    html.push_str(r#"<div class="grid">"#);
    for profile in profiles {
        let playoff = if profile.playoff_qualified { " playoff" } else { "" };
        html.push_str(&format!(
            r#"<a class="driver-card serie-{}{playoff}" href="/driver?driver={}"><span class="name">{}</span><span class="badge">{} serie</span></a>"#,
            profile.serie.label().to_lowercase(),
            encode_query(&profile.name),
            escape_html(&profile.name),
            profile.serie
        ));
    }
    html.push_str("</div>");
    html
}

pub fn render_driver(profile: &DriverProfile) -> String {
    let mut stats = vec![
        ("Total Points", profile.total.to_string()),
        ("Wins", profile.wins.to_string()),
        ("Championship Wins", profile.ch_wins.to_string()),
        ("Win Percentage", format!("{:.1}%", profile.win_percentage)),
        ("Best Time", profile.best_time.clone()),
        ("Total Races", profile.total_races.to_string()),
        ("Points", profile.points.to_string()),
        ("Serie", profile.serie.to_string()),
    ];
    if !profile.number.is_empty() {
        stats.push(("Number", format!("#{}", profile.number)));
    }

    let mut html = format!("<h2>{}</h2>", escape_html(&profile.name));
    if profile.playoff_qualified {
        html.push_str(r#"<p class="badge playoff">Playoff qualified</p>"#);
    }
    html.push_str(r#"<div class="grid">"#);
    for (label, value) in stats {
        html.push_str(&format!(
            r#"<div class="stat"><span class="label">{label}</span><span class="value">{}</span></div>"#,
            escape_html(&value)
        ));
    }
    html.push_str("</div>");
    html
}

fn outcome_summary(definition: &AwardDefinition, outcome: &AwardOutcome) -> String {
    match outcome {
        AwardOutcome::Winner { winner, value } => {
            let detail = match value {
                AwardValue::LapTime { time, .. } => format!("Time: {}", escape_html(time)),
                AwardValue::Wins { count } => format!("{count} Wins"),
                AwardValue::Points { total } => format!("{total} Points"),
            };
            format!(
                r#"<div class="winner-name">{}</div><div class="muted">{detail}</div>"#,
                escape_html(winner)
            )
        }
        AwardOutcome::NoWinner if definition.category == AwardCategory::Championship => {
            r#"<div class="muted">Decided after season + playoffs</div>"#.to_string()
        }
        AwardOutcome::NoWinner => r#"<div class="muted">No winner yet</div>"#.to_string(),
        AwardOutcome::NotYetAvailable if definition.kind == AwardKind::BestImprovement => {
            r#"<div class="muted">Compare last season vs current</div>"#.to_string()
        }
        AwardOutcome::NotYetAvailable => {
            r#"<div class="muted">Calculated at season end</div>"#.to_string()
        }
    }
}

pub fn render_awards(awards: &Awards, has_history: impl Fn(AwardKind) -> bool) -> String {
    let mut html = String::new();
    for category in AwardCategory::ALL {
        html.push_str(&format!(
            r#"<section class="award-category"><h2>{}</h2><div class="grid">"#,
            category.title()
        ));
        for (kind, outcome) in awards {
            let definition = kind.definition();
            if definition.category != category {
                continue;
            }
            let gold = if definition.gold { " gold" } else { "" };
            let history = if has_history(*kind) {
                r#"<div class="muted">View history →</div>"#
            } else {
                ""
            };
            html.push_str(&format!(
                r#"<a class="award-card{gold}" href="/award?award={}"><div class="icon">{}</div><h3>{}</h3><p>{}</p>{}{history}</a>"#,
                kind.id(),
                definition.icon,
                escape_html(definition.title),
                escape_html(definition.description),
                outcome_summary(&definition, outcome)
            ));
        }
        html.push_str("</div></section>");
    }
    html
}

pub fn render_no_awards() -> String {
    render_not_found(
        "No Awards Available Yet",
        "Complete races and seasons to unlock awards and achievements.",
    )
}

fn history_detail(record: &AwardRecord) -> String {
    if let Some(time) = &record.time {
        format!("Time: {}", escape_html(time))
    } else if let Some(value) = record.value {
        format!("{value}")
    } else if let Some(points) = record.points {
        format!("{points} Points")
    } else {
        String::new()
    }
}

pub fn render_award(
    definition: &AwardDefinition,
    outcome: &AwardOutcome,
    history: &[AwardRecord],
) -> String {
    let mut html = format!(
        r#"<section class="card"><div class="icon">{}</div><h2>{}</h2><p>{}</p><h3>Current</h3>{}</section>"#,
        definition.icon,
        escape_html(definition.title),
        escape_html(definition.description),
        outcome_summary(definition, outcome)
    );
    html.push_str(r#"<section class="card"><h2>Past Winners</h2>"#);
    if history.is_empty() {
        html.push_str(r#"<p class="muted">No past winners recorded.</p>"#);
    } else {
        html.push_str(
            "<table><thead><tr><th>Season</th><th>Winner</th><th></th></tr></thead><tbody>",
        );
        for record in history {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                record.season,
                driver_link(&record.winner),
                history_detail(record)
            ));
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</section>");
    html
}

fn record_card(title: &str, value: String, holder: &str) -> String {
    format!(
        r#"<div class="stat"><span class="label">{title}</span><span class="value">{}</span><span class="muted">{}</span></div>"#,
        escape_html(&value),
        escape_html(holder)
    )
}

fn holder_card(title: &str, holder: &Option<RecordHolder>) -> String {
    match holder {
        Some(held) => record_card(title, held.value.to_string(), &held.holder),
        None => record_card(title, "0".to_string(), "N/A"),
    }
}

pub fn render_hall_of_fame(hall: &HallOfFame, season: i32) -> String {
    let mut html = String::from(r#"<section class="card"><h2>Championship History</h2>"#);
    if hall.history.is_empty() {
        html.push_str(
            r#"<div class="empty-state"><h3>No Championships Yet</h3><p>Champions are added after each completed season.</p></div>"#,
        );
    } else {
        html.push_str(r#"<div class="grid">"#);
        for champion in &hall.history {
            let name = if champion.name.is_empty() { "Unknown" } else { champion.name.as_str() };
            let serie = champion.serie.map(Series::label).unwrap_or("N/A");
            html.push_str(&format!(
                r#"<div class="champion"><div class="icon">🏆</div><h3>{}</h3><p>Season {}</p><p class="muted">Wins {} | Points {} | Serie {serie}</p></div>"#,
                escape_html(name),
                champion.year,
                champion.wins,
                champion.points
            ));
        }
        html.push_str("</div>");
    }
    html.push_str(&format!(
        r#"<details><summary>⚙ Add champion</summary><form method="post" action="/hall-of-fame/add"><input name="name" placeholder="Name" required /><input name="year" type="number" value="{season}" /><input name="wins" type="number" value="0" /><input name="points" type="number" value="0" /><select name="serie"><option value="A">Série A</option><option value="B">Série B</option></select><button type="submit">Save</button></form></details></section>"#
    ));

    let records = &hall.records;
    html.push_str(r#"<section class="card"><h2>Records</h2><div class="grid">"#);
    html.push_str(&holder_card("Most Wins", &records.most_wins));
    html.push_str(&holder_card("Most Championships", &records.most_championships));
    html.push_str(&match &records.best_time {
        Some(lap) => record_card("Best Time", lap.time.clone(), &lap.holder),
        None => record_card("Best Time", "--".to_string(), "N/A"),
    });
    html.push_str(&holder_card("Highest Points", &records.highest_points));
    html.push_str(&holder_card("Most Total Points", &records.most_total_points));
    html.push_str("</div></section>");
    html
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {{REFRESH}}
  <title>{{TITLE}} · Fastway League</title>
  <style>
    :root {
      --bg: #fafafa;
      --ink: #1a1a1a;
      --muted: #777;
      --card: #f5f5f5;
      --line: rgba(0, 0, 0, 0.08);
      --accent: #ff003c;
      --gold: #d4a800;
      --shadow: 0 4px 20px rgba(0, 0, 0, 0.06);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    nav {
      display: flex;
      gap: 18px;
      padding: 18px 32px;
      background: var(--ink);
    }

    nav a {
      color: white;
      text-decoration: none;
      font-weight: 600;
    }

    main {
      max-width: 1200px;
      margin: 0 auto;
      padding: 32px 18px 48px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.6rem);
    }

    .card,
    .award-card,
    .driver-card,
    .stat,
    .champion,
    .round {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 20px;
      box-shadow: var(--shadow);
      color: var(--ink);
      text-decoration: none;
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 24px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      padding: 10px 12px;
      text-align: left;
    }

    tr.cutoff td {
      border-top: 4px solid var(--accent);
    }

    tr.champion {
      background: rgba(255, 215, 0, 0.15);
    }

    tr.out {
      background: #f0f0f0;
    }

    tr.tie td {
      text-align: center;
      color: var(--accent);
      background: rgba(255, 0, 60, 0.1);
    }

    .gold,
    .award-card.gold h3 {
      color: var(--gold);
    }

    .muted {
      color: var(--muted);
    }

    .driver-link {
      color: inherit;
      text-decoration: none;
      font-weight: 600;
    }

    .stat span {
      display: block;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value,
    .big,
    .winner-name {
      font-size: 1.6rem;
      font-weight: 700;
    }

    .badge {
      display: inline-block;
      margin-top: 6px;
      font-size: 0.8rem;
      text-transform: uppercase;
      color: var(--muted);
    }

    .driver-card.playoff {
      border-left: 4px solid var(--accent);
    }

    .driver-card .name {
      display: block;
      font-weight: 700;
    }

    .qualified {
      padding: 12px;
      margin: 8px 0;
      border-left: 4px solid var(--ink);
      background: white;
      border-radius: 8px;
    }

    .round.active {
      border: 2px solid var(--ink);
    }

    .round.completed {
      background: #f0f0f0;
    }

    .bar {
      height: 16px;
      background: rgba(0, 0, 0, 0.1);
      border-radius: 8px;
      overflow: hidden;
    }

    .bar .fill {
      height: 100%;
      background: var(--ink);
    }

    .icon {
      font-size: 2rem;
    }

    .empty-state {
      text-align: center;
      padding: 32px;
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    .filter-btn {
      border: 1px solid var(--line);
      background: white;
      border-radius: 999px;
      padding: 8px 16px;
      cursor: pointer;
    }

    .filter-btn.active {
      background: var(--ink);
      color: white;
    }

    form input,
    form select {
      padding: 8px 12px;
      border-radius: 8px;
      border: 1px solid var(--line);
    }
  </style>
</head>
<body>
  <nav>
    <a href="/">Standings</a>
    <a href="/drivers">Drivers</a>
    <a href="/playoffs">Playoffs</a>
    <a href="/awards">Awards</a>
    <a href="/hall-of-fame">Hall of Fame</a>
  </nav>
  <main>
    <h1>{{TITLE}}</h1>
    {{BODY}}
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverRecord, RaceState};
    use crate::standings::build_all_standings;

    #[test]
    fn escaping_covers_markup_and_quotes() {
        assert_eq!(
            escape_html("Erik's <Rod> & \"Co\""),
            "Erik&#39;s &lt;Rod&gt; &amp; &quot;Co&quot;"
        );
    }

    #[test]
    fn query_encoding_handles_spaces_and_quotes() {
        assert_eq!(encode_query("'69 Camaro"), "%2769%20Camaro");
    }

    #[test]
    fn page_includes_refresh_only_when_enabled() {
        assert!(render_page("Standings", 10, "").contains(r#"content="10""#));
        assert!(!render_page("Standings", 0, "").contains("http-equiv"));
    }

    #[test]
    fn tie_banner_appears_at_the_cutoff() {
        let drivers: Vec<DriverRecord> = (0..32)
            .map(|i| DriverRecord {
                points: if i >= 13 { 5 } else { 100 - i },
                ..DriverRecord::new(format!("d{i}"))
            })
            .collect();
        let html = render_standings(&build_all_standings(&drivers, &RaceState::default()));
        assert!(html.contains("TIED"));
    }
}
