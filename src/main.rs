use anyhow::Result;
use clap::Parser;
use searchdelta::cli::{Cli, Commands};
use searchdelta::commands::{self, CompareConfig, ReportConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            data_dir,
            config,
            period_1,
            period_2,
            subdomains,
            top,
            format,
            export,
            prefix,
            recursive,
        } => commands::handle_report(ReportConfig {
            data_dir,
            config,
            period_1,
            period_2,
            subdomains,
            top,
            format: format.into(),
            export,
            prefix,
            recursive,
        }),
        Commands::Compare {
            data_dir,
            config,
            dimension,
            period_1,
            period_2,
            metric,
            top,
            subdomains,
            keyword,
            periodicity,
            contains,
            format,
            recursive,
        } => commands::handle_compare(CompareConfig {
            data_dir,
            config,
            dimension: dimension.into(),
            period_1,
            period_2,
            metric: metric.into(),
            top,
            subdomains,
            keyword,
            periodicity: periodicity.into(),
            contains,
            format: format.into(),
            recursive,
        }),
        Commands::Init { path, force } => commands::init_config(&path, force),
    }
}
