use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/drivers", get(handlers::drivers_page))
        .route("/driver", get(handlers::driver_page))
        .route("/playoffs", get(handlers::playoffs_page))
        .route("/awards", get(handlers::awards_page))
        .route("/award", get(handlers::award_page))
        .route("/hall-of-fame", get(handlers::hall_of_fame_page))
        .route("/hall-of-fame/add", post(handlers::add_champion))
        .route(
            "/api/store/:key",
            get(handlers::get_store_value).put(handlers::put_store_value),
        )
        .route("/api/standings", get(handlers::get_standings))
        .route("/api/playoffs", get(handlers::get_playoffs))
        .route("/api/playoffs/start", post(handlers::start_playoffs))
        .route("/api/playoffs/advance", post(handlers::advance_playoffs))
        .route("/api/awards", get(handlers::get_awards))
        .route("/api/drivers", get(handlers::get_drivers))
        .route("/api/drivers/:name", get(handlers::get_driver))
        .route("/api/hall-of-fame", get(handlers::get_hall_of_fame))
        .route(
            "/api/history/awards/:award_id",
            get(handlers::get_award_history).post(handlers::post_award_history),
        )
        .route("/api/history/champions", post(handlers::post_champion))
        .with_state(state)
}
