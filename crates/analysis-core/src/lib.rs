pub mod config;
pub mod error;
pub mod fundamentals;
pub mod metric;
pub mod series;
pub mod stats;
pub mod types;

pub use config::*;
pub use error::*;
pub use fundamentals::FundamentalsSnapshot;
pub use metric::Metric;
pub use series::PriceSeries;
pub use types::*;
