pub mod app;
pub mod awards;
pub mod coerce;
pub mod config;
pub mod drivers;
pub mod errors;
pub mod hall_of_fame;
pub mod handlers;
pub mod history;
pub mod league;
pub mod models;
pub mod playoff;
pub mod seed;
pub mod standings;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{load_store, persist_store};
