use crate::awards::{AwardKind, Awards, calculate_awards};
use crate::coerce::parse_int_prefix;
use crate::drivers::{DriverFilter, DriverProfile, build_profiles, filter_profiles, find_profile};
use crate::errors::AppError;
use crate::hall_of_fame::HallOfFame;
use crate::history::{award_history, current_season, record_award, record_champion};
use crate::league::{LeagueSnapshot, parse_year, save_playoff_data, save_playoff_state};
use crate::models::{
    AwardQuery, AwardRecord, ChampionForm, ChampionshipRecord, DriverListQuery, DriverQuery,
    PlayoffData, PlayoffState, RecordAwardRequest, RecordChampionRequest, Series,
};
use crate::playoff::{self, SeriesPlayoffView, playoff_overview};
use crate::standings::{SeriesStandings, build_all_standings};
use crate::state::AppState;
use crate::storage::{MemoryStore, RecordStore, persist_store};
use crate::ui;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffProgress {
    pub state: PlayoffState,
    pub data: PlayoffData,
}

fn page(state: &AppState, title: &str, body: &str) -> Html<String> {
    Html(ui::render_page(title, state.config.refresh_secs, body))
}

fn not_found_page(state: &AppState, heading: &str, message: &str) -> Response {
    let body = ui::render_not_found(heading, message);
    (StatusCode::NOT_FOUND, page(state, heading, &body)).into_response()
}

async fn persist(state: &AppState, store: &MemoryStore) -> Result<(), AppError> {
    persist_store(&state.config.data_path, store).await?;
    Ok(())
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    let standings = build_all_standings(&snapshot.drivers, &snapshot.race_state);
    page(&state, "Standings", &ui::render_standings(&standings))
}

pub async fn drivers_page(
    State(state): State<AppState>,
    Query(query): Query<DriverListQuery>,
) -> Html<String> {
    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    let filter = DriverFilter::parse(query.filter.as_deref());
    let search = query.q.unwrap_or_default();
    let profiles = filter_profiles(build_profiles(&snapshot), filter, &search);
    let body = ui::render_drivers(&profiles, filter, &search, snapshot.drivers.is_empty());
    page(&state, "Drivers", &body)
}

pub async fn driver_page(
    State(state): State<AppState>,
    Query(query): Query<DriverQuery>,
) -> Response {
    let Some(name) = query.driver.filter(|name| !name.is_empty()) else {
        return not_found_page(&state, "Driver not found", "No driver was specified.");
    };

    let store = state.store.lock().await;
    match find_profile(&LeagueSnapshot::load(&*store), &name) {
        Some(profile) => page(&state, &profile.name, &ui::render_driver(&profile)).into_response(),
        None => not_found_page(
            &state,
            "Driver not found",
            &format!("No driver named {name} is on the roster."),
        ),
    }
}

pub async fn playoffs_page(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let views = playoff_overview(&LeagueSnapshot::load(&*store));
    page(&state, "Playoffs", &ui::render_playoffs(&views))
}

pub async fn awards_page(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    if snapshot.drivers.is_empty() {
        return page(&state, "Awards", &ui::render_no_awards());
    }

    let awards = calculate_awards(&snapshot.drivers, &snapshot.race_state);
    let body = ui::render_awards(&awards, |kind| {
        !award_history(&*store, kind.id()).is_empty()
    });
    page(&state, "Awards", &body)
}

pub async fn award_page(
    State(state): State<AppState>,
    Query(query): Query<AwardQuery>,
) -> Response {
    let Some(kind) = query.award.as_deref().and_then(AwardKind::from_id) else {
        return not_found_page(&state, "Award not found", "No award with that id exists.");
    };

    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    let awards = calculate_awards(&snapshot.drivers, &snapshot.race_state);
    let Some(outcome) = awards.get(&kind) else {
        return not_found_page(&state, "Award not found", "No award with that id exists.");
    };
    let definition = kind.definition();
    let history = award_history(&*store, kind.id());
    page(
        &state,
        definition.title,
        &ui::render_award(&definition, outcome, &history),
    )
    .into_response()
}

pub async fn hall_of_fame_page(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let hall = HallOfFame::load(&*store);
    page(
        &state,
        "Hall of Fame",
        &ui::render_hall_of_fame(&hall, current_season()),
    )
}

fn form_count(raw: &str) -> u32 {
    parse_int_prefix(raw)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0)
}

pub async fn add_champion(
    State(state): State<AppState>,
    Form(form): Form<ChampionForm>,
) -> Result<Redirect, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        warn!("ignoring champion form without a name");
        return Ok(Redirect::to("/hall-of-fame"));
    }

    let record = ChampionshipRecord::new(
        name,
        parse_year(&form.year).unwrap_or_else(current_season),
        form_count(&form.wins),
        form_count(&form.points),
        Series::parse(&form.serie),
    );
    let mut store = state.store.lock().await;
    record_champion(&mut *store, record)?;
    persist(&state, &store).await?;
    Ok(Redirect::to("/hall-of-fame"))
}

pub async fn get_store_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let store = state.store.lock().await;
    let value = store
        .get(&key)
        .ok_or_else(|| AppError::not_found(format!("no value stored under {key}")))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], value).into_response())
}

pub async fn put_store_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: String,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    info!(key = %key, bytes = body.len(), "replacing stored value");
    store.set(&key, body);
    persist(&state, &store).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_standings(State(state): State<AppState>) -> Json<Vec<SeriesStandings>> {
    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    Json(build_all_standings(&snapshot.drivers, &snapshot.race_state))
}

pub async fn get_playoffs(State(state): State<AppState>) -> Json<Vec<SeriesPlayoffView>> {
    let store = state.store.lock().await;
    Json(playoff_overview(&LeagueSnapshot::load(&*store)))
}

pub async fn get_awards(State(state): State<AppState>) -> Json<Awards> {
    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    Json(calculate_awards(&snapshot.drivers, &snapshot.race_state))
}

pub async fn get_drivers(
    State(state): State<AppState>,
    Query(query): Query<DriverListQuery>,
) -> Json<Vec<DriverProfile>> {
    let store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    let filter = DriverFilter::parse(query.filter.as_deref());
    let search = query.q.unwrap_or_default();
    Json(filter_profiles(build_profiles(&snapshot), filter, &search))
}

pub async fn get_driver(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DriverProfile>, AppError> {
    let store = state.store.lock().await;
    find_profile(&LeagueSnapshot::load(&*store), &name)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no driver named {name}")))
}

pub async fn get_hall_of_fame(State(state): State<AppState>) -> Json<HallOfFame> {
    let store = state.store.lock().await;
    Json(HallOfFame::load(&*store))
}

fn award_kind(award_id: &str) -> Result<AwardKind, AppError> {
    AwardKind::from_id(award_id)
        .ok_or_else(|| AppError::not_found(format!("unknown award {award_id}")))
}

pub async fn get_award_history(
    State(state): State<AppState>,
    Path(award_id): Path<String>,
) -> Result<Json<Vec<AwardRecord>>, AppError> {
    let kind = award_kind(&award_id)?;
    let store = state.store.lock().await;
    Ok(Json(award_history(&*store, kind.id())))
}

pub async fn post_award_history(
    State(state): State<AppState>,
    Path(award_id): Path<String>,
    Json(payload): Json<RecordAwardRequest>,
) -> Result<Json<Vec<AwardRecord>>, AppError> {
    let kind = award_kind(&award_id)?;
    let winner = payload.winner.trim();
    if winner.is_empty() {
        return Err(AppError::bad_request("winner must not be empty"));
    }

    let record = AwardRecord {
        value: payload.value,
        time: payload.time,
        points: payload.points,
        ..AwardRecord::new(winner, payload.season.unwrap_or_else(current_season))
    };
    let mut store = state.store.lock().await;
    let history = record_award(&mut *store, kind.id(), record)?;
    persist(&state, &store).await?;
    Ok(Json(history))
}

pub async fn post_champion(
    State(state): State<AppState>,
    Json(payload): Json<RecordChampionRequest>,
) -> Result<Json<Vec<ChampionshipRecord>>, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let record = ChampionshipRecord::new(
        name,
        payload.year.unwrap_or_else(current_season),
        payload.wins,
        payload.points,
        payload.serie,
    );
    let mut store = state.store.lock().await;
    let history = record_champion(&mut *store, record)?;
    persist(&state, &store).await?;
    Ok(Json(history))
}

pub async fn start_playoffs(
    State(state): State<AppState>,
) -> Result<Json<PlayoffProgress>, AppError> {
    let mut store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    if snapshot.drivers.is_empty() {
        return Err(AppError::bad_request("no drivers to qualify"));
    }
    if snapshot.playoff_state.active {
        return Err(AppError::bad_request("playoffs are already running"));
    }

    let (playoff_state, data) = playoff::start_playoffs(&snapshot);
    save_playoff_state(&mut *store, &playoff_state)?;
    save_playoff_data(&mut *store, &data)?;
    persist(&state, &store).await?;
    info!(
        serie_a = data.a.qualified.len(),
        serie_b = data.b.qualified.len(),
        "playoffs started"
    );
    Ok(Json(PlayoffProgress {
        state: playoff_state,
        data,
    }))
}

pub async fn advance_playoffs(
    State(state): State<AppState>,
) -> Result<Json<PlayoffProgress>, AppError> {
    let mut store = state.store.lock().await;
    let snapshot = LeagueSnapshot::load(&*store);
    let mut playoff_state = snapshot.playoff_state;
    let mut data = snapshot.playoff_data;
    if !playoff::advance_race(&mut playoff_state, &mut data) {
        return Err(AppError::bad_request("no playoff race left to run"));
    }

    save_playoff_state(&mut *store, &playoff_state)?;
    save_playoff_data(&mut *store, &data)?;
    persist(&state, &store).await?;
    info!(
        round = playoff_state.current_round_index,
        race = playoff_state.current_race_in_round,
        is_final = playoff_state.is_final,
        "playoff race recorded"
    );
    Ok(Json(PlayoffProgress {
        state: playoff_state,
        data,
    }))
}
