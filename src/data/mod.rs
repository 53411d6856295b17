//! Price history acquisition: remote sheet -> cleaned [`TimeSeries`](crate::domain::TimeSeries).

pub mod cache;
pub mod loader;
pub mod parser;
pub mod source;
pub mod table;

pub use cache::{CacheMode, MemoryCache, NoCache, SeriesCache};
pub use loader::{Dataset, LoadReport, Loader};
pub use source::{DEFAULT_DATA_URL, Fetch, FileSource, HttpSource};
