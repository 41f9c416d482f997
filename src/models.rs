pub mod geo;
pub mod period;
pub mod report;
