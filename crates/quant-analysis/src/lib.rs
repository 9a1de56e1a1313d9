//! Historical performance of a price series: all-time statistics, trailing 1 and 5
//! year windows, and calendar-year rows.

pub mod performance;
pub mod yearly;

pub use performance::*;
pub use yearly::*;
