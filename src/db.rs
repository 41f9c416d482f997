pub mod report_query;
pub mod report_repo;
pub use report_repo::ReportRepository;
