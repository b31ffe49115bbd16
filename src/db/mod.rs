pub mod favorites;
pub mod genres;
pub mod sqlite;

pub use favorites::{FavoriteStore, SqliteFavoriteStore};
pub use genres::{GenreStore, SqliteGenreStore};
pub use sqlite::create_pool;
