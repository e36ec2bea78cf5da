pub mod dashboard;

pub use dashboard::DashboardApi;
