//! Input side: the data point model and loading of series files.
//!
//! Each input file holds one monitored signal as a JSON array of
//! `[timestamp, value]` pairs, already ordered by timestamp.

pub mod load;
pub mod point;

pub use load::load_series;
pub use point::{DataPoint, Reading, Series, Signal, Timestamp};
