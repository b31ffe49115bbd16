pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod telemetry;

pub use config::{Config, PrimaryGenrePolicy};
pub use error::{AppError, AppResult, ErrorCode};
pub use models::{EnrichedMovie, FavoriteRecord, Genre, MovieSummary, Resource};
pub use state::AppState;
