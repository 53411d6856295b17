//! Time-series shaping: granularity selection and bucket aggregation.

pub mod aggregate;
pub mod granularity;

pub use aggregate::aggregate;
pub use granularity::select as select_granularity;
