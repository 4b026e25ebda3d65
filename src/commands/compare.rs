use std::path::PathBuf;

use anyhow::Result;

use crate::analysis::report::SearchAnalyzer;
use crate::analysis::timeseries::{keyword_series, KeywordMatch, Periodicity};
use crate::config::Dimension;
use crate::core::{Metric, NamedTable, Period};
use crate::io::output::print_tables;
use crate::io::{load_csv_dir, OutputFormat};

pub struct CompareConfig {
    pub data_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub dimension: Dimension,
    pub period_1: Period,
    pub period_2: Period,
    pub metric: Metric,
    pub top: Option<usize>,
    pub subdomains: Option<Vec<String>>,
    pub keyword: Option<String>,
    pub periodicity: Periodicity,
    pub contains: bool,
    pub format: OutputFormat,
    pub recursive: bool,
}

pub fn handle_compare(config: CompareConfig) -> Result<()> {
    let client = super::resolve_client_config(config.config.as_deref())?;
    let records = load_csv_dir(&config.data_dir, &client, config.recursive)?;

    let tables = if let Some(keyword) = &config.keyword {
        let matching = if config.contains {
            KeywordMatch::Contains
        } else {
            KeywordMatch::Exact
        };
        let range = Period::new(config.period_1.start, config.period_2.end);
        let series = keyword_series(
            &records,
            Some(keyword),
            matching,
            config.periodicity,
            Some(&range),
        );
        vec![NamedTable::from_rows(
            format!("keyword_series_{keyword}"),
            &series,
        )]
    } else {
        let analyzer = SearchAnalyzer::new(records, client)?;
        let comparison =
            analyzer.compare_periods(config.dimension, &config.period_1, &config.period_2)?;
        let mut tables = vec![NamedTable::from_rows(
            format!("{}_comparison", config.dimension),
            &comparison,
        )];
        if let Some(top) = config.top {
            let movers = analyzer.top_movers(
                config.dimension,
                &config.period_1,
                &config.period_2,
                config.metric,
                top,
                config.subdomains.as_deref(),
            )?;
            tables.push(NamedTable::from_rows(
                format!("top_{}_{}", config.dimension, config.metric),
                &movers,
            ));
        }
        tables
    };

    match config.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
        OutputFormat::Terminal => print_tables(&tables),
    }
    Ok(())
}
