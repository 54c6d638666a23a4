mod join;
mod recommend;
mod report;

pub use join::{Catalog, CatalogError, JoinedRecord, join};
pub use recommend::{current_license, recommend};
pub use report::{
    AnalysisError, DetailRow, DistributionEntry, LicenseAnalyzer, NAME_KEY_PREFIX, PopulationReport,
    REPORT_SCHEMA_VERSION, ReportSummary, UserListing, UserReport,
};
