use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use holiday_core::builder::HolidaySetBuilder;
use holiday_core::holiday::Holiday;
use holiday_providers::baidu::BaiduCalendarProvider;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "holiday-data",
    about = "Resolve statutory holiday rest runs and make-up workdays"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch holidays for a year range and print the resolved set
    Fetch {
        /// First year to include
        #[arg(long)]
        start_year: i32,

        /// Last year to include (defaults to the start year)
        #[arg(long)]
        end_year: Option<i32>,

        /// Emit the resolved holidays as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Also resolve anchors normally absorbed into a following holiday
        /// (e.g. the Spring Festival eve)
        #[arg(long)]
        keep_absorbed: bool,
    },
}

async fn cmd_fetch(start_year: i32, end_year: i32, json: bool, keep_absorbed: bool) -> Result<()> {
    anyhow::ensure!(
        start_year <= end_year,
        "start year {start_year} is after end year {end_year}"
    );

    let provider = BaiduCalendarProvider::new();
    let anchors = provider
        .fetch_holiday_anchors(start_year, end_year)
        .await
        .context("failed to fetch holiday anchors")?;
    info!("fetched {} anchor(s) for {start_year}..={end_year}", anchors.len());

    let builder = if keep_absorbed {
        HolidaySetBuilder::new().keep_all_anchors()
    } else {
        HolidaySetBuilder::new()
    };
    let report = builder.build(&provider, &anchors).await;

    if !report.failures.is_empty() {
        warn!("{} anchor(s) failed to resolve", report.failures.len());
    }
    anyhow::ensure!(
        !report.holidays.is_empty(),
        "no holidays resolved ({} anchor(s) failed)",
        report.failures.len()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report.holidays)?);
    } else {
        print_report(&report.holidays);
        if !report.failures.is_empty() {
            println!("{} anchor(s) failed to resolve; see log.", report.failures.len());
        }
    }

    Ok(())
}

fn print_report(holidays: &[Holiday]) {
    let mut by_year: BTreeMap<i32, Vec<&Holiday>> = BTreeMap::new();
    for holiday in holidays {
        by_year.entry(holiday.year).or_default().push(holiday);
    }

    for (year, holidays) in &by_year {
        println!("== {year} ==");
        for holiday in holidays {
            println!(
                "{}: {} rest day(s), {} make-up day(s)",
                holiday.name,
                holiday.rest_dates.len(),
                holiday.makeup_dates.len()
            );
            println!("    rest:    {}", join_dates(&holiday.rest_dates));
            println!("    make-up: {}", join_dates(&holiday.makeup_dates));
        }
        println!();
    }
}

fn join_dates(dates: &[chrono::NaiveDate]) -> String {
    if dates.is_empty() {
        return "(none)".to_string();
    }
    dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Fetch {
            start_year,
            end_year,
            json,
            keep_absorbed,
        } => {
            let end_year = end_year.unwrap_or(start_year);
            cmd_fetch(start_year, end_year, json, keep_absorbed).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;

    #[test]
    fn parse_fetch_args() {
        let cli = Cli::try_parse_from([
            "holiday-data",
            "fetch",
            "--start-year",
            "2020",
            "--end-year",
            "2021",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                start_year,
                end_year,
                json,
                keep_absorbed,
            } => {
                assert_eq!(start_year, 2020);
                assert_eq!(end_year, Some(2021));
                assert!(json);
                assert!(!keep_absorbed);
            }
        }
    }

    #[test]
    fn parse_fetch_defaults() {
        let cli =
            Cli::try_parse_from(["holiday-data", "fetch", "--start-year", "2021"]).unwrap();

        match cli.command {
            Commands::Fetch {
                start_year,
                end_year,
                json,
                keep_absorbed,
            } => {
                assert_eq!(start_year, 2021);
                assert!(end_year.is_none());
                assert!(!json);
                assert!(!keep_absorbed);
            }
        }
    }

    #[test]
    fn parse_fetch_requires_start_year() {
        assert!(Cli::try_parse_from(["holiday-data", "fetch"]).is_err());
    }

    #[test]
    fn join_dates_formats() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2021, 2, 11).unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 12).unwrap(),
        ];
        assert_eq!(join_dates(&dates), "2021-02-11, 2021-02-12");
        assert_eq!(join_dates(&[]), "(none)");
    }
}
