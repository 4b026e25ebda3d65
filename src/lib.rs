// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;

// Re-export commonly used types
pub use crate::analysis::report::{FullReport, SearchAnalyzer};
pub use crate::analysis::timeseries::{keyword_series, KeywordMatch, Periodicity, SeriesPoint};
pub use crate::analysis::DimensionAnalyzer;
pub use crate::config::{loader::load_config, BrandGroup, ClientConfig, Dimension};
pub use crate::core::{
    DistributionRow, GroupComparisonRow, Metric, MetricSummary, NamedTable, Period, Record,
    SubdomainComparisonRow, SubsetVariationRow, TopMoverRow,
};
pub use crate::errors::{AnalyticsError, Result};
pub use crate::io::{
    create_writer, export_report, load_csv_dir, process_month_range, MonthlyRecordSource,
    OutputFormat, OutputWriter,
};
