use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analysis::timeseries::Periodicity;
use crate::config::Dimension;
use crate::core::{Metric, Period};
use crate::io::OutputFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Colored tables on stdout
    Terminal,
    /// Pretty-printed JSON on stdout
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Terminal => OutputFormat::Terminal,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DimensionArg {
    Query,
    Page,
}

impl From<DimensionArg> for Dimension {
    fn from(value: DimensionArg) -> Self {
        match value {
            DimensionArg::Query => Dimension::Query,
            DimensionArg::Page => Dimension::Page,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Clicks,
    Impressions,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Clicks => Metric::Clicks,
            MetricArg::Impressions => Metric::Impressions,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodicityArg {
    Month,
    Day,
}

impl From<PeriodicityArg> for Periodicity {
    fn from(value: PeriodicityArg) -> Self {
        match value {
            PeriodicityArg::Month => Periodicity::Month,
            PeriodicityArg::Day => Periodicity::Day,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "searchdelta")]
#[command(about = "Period-over-period search performance analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the full comparison report for two periods
    Report {
        /// Directory of source CSV files
        data_dir: PathBuf,

        /// Client configuration file (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Initial period as YYYY-MM-DD..YYYY-MM-DD
        #[arg(long = "period-1")]
        period_1: Period,

        /// Final period as YYYY-MM-DD..YYYY-MM-DD
        #[arg(long = "period-2")]
        period_2: Period,

        /// Subdomain substrings to filter and compare, comma-separated
        #[arg(long, value_delimiter = ',')]
        subdomains: Option<Vec<String>>,

        /// Number of top movers per table
        #[arg(long, default_value = "10")]
        top: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: FormatArg,

        /// Export every report table as CSV into this directory
        #[arg(long)]
        export: Option<PathBuf>,

        /// Filename prefix for exported tables
        #[arg(long, default_value = "")]
        prefix: String,

        /// Also read CSVs from subdirectories
        #[arg(long)]
        recursive: bool,
    },

    /// Compare two periods along one dimension, or chart one keyword
    Compare {
        /// Directory of source CSV files
        data_dir: PathBuf,

        /// Client configuration file (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dimension to compare
        #[arg(short, long, value_enum, default_value = "query")]
        dimension: DimensionArg,

        /// Initial period as YYYY-MM-DD..YYYY-MM-DD
        #[arg(long = "period-1")]
        period_1: Period,

        /// Final period as YYYY-MM-DD..YYYY-MM-DD
        #[arg(long = "period-2")]
        period_2: Period,

        /// Metric for the top movers table
        #[arg(short, long, value_enum, default_value = "clicks")]
        metric: MetricArg,

        /// Also list the top N movers
        #[arg(long)]
        top: Option<usize>,

        /// Subdomain substrings restricting the top movers
        #[arg(long, value_delimiter = ',')]
        subdomains: Option<Vec<String>>,

        /// Chart this keyword over time instead of comparing subsets
        #[arg(short, long)]
        keyword: Option<String>,

        /// Bucket width for the keyword series
        #[arg(long, value_enum, default_value = "month")]
        periodicity: PeriodicityArg,

        /// Match the keyword as a substring instead of exactly
        #[arg(long)]
        contains: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: FormatArg,

        /// Also read CSVs from subdirectories
        #[arg(long)]
        recursive: bool,
    },

    /// Write a starter client configuration file
    Init {
        /// Destination path
        #[arg(long, default_value = "searchdelta.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args_parse() {
        let cli = Cli::try_parse_from([
            "searchdelta",
            "report",
            "data/",
            "--period-1",
            "2026-01-01..2026-01-31",
            "--period-2",
            "2026-02-01..2026-02-28",
            "--subdomains",
            "www.acme.cl,pay.acme.cl",
            "--top",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                subdomains, top, ..
            } => {
                assert_eq!(
                    subdomains,
                    Some(vec!["www.acme.cl".to_string(), "pay.acme.cl".to_string()])
                );
                assert_eq!(top, 5);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_compare_keyword_args_parse() {
        let cli = Cli::try_parse_from([
            "searchdelta",
            "compare",
            "data/",
            "--period-1",
            "2026-01-01..2026-01-31",
            "--period-2",
            "2026-02-01..2026-02-28",
            "--keyword",
            "webpay",
            "--periodicity",
            "day",
            "--contains",
        ])
        .unwrap();
        match cli.command {
            Commands::Compare {
                keyword,
                periodicity,
                contains,
                ..
            } => {
                assert_eq!(keyword.as_deref(), Some("webpay"));
                assert!(matches!(periodicity, PeriodicityArg::Day));
                assert!(contains);
            }
            _ => panic!("expected compare command"),
        }
    }

    #[test]
    fn test_bad_period_rejected() {
        let result = Cli::try_parse_from([
            "searchdelta",
            "report",
            "data/",
            "--period-1",
            "2026-01-01",
            "--period-2",
            "2026-02-01..2026-02-28",
        ]);
        assert!(result.is_err());
    }
}
