pub mod catalog;
pub mod enrichment;
pub mod genre_cache;
pub mod providers;

pub use catalog::{MovieCatalog, MovieRepository};
pub use enrichment::{EnrichmentPipeline, ImageUrls};
pub use genre_cache::GenreCache;
pub use providers::{CatalogProvider, TmdbProvider};
