mod report;
pub mod routes;

pub use report::StatsReport;
