pub mod geography;
pub mod period;
pub mod report_service;
pub mod rollup;

pub use report_service::ReportService;
