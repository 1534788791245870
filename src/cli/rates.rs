//! Standalone `rates <days> <currency...>` command.

use super::ui;
use crate::core::rates::{DailyRates, ExchangeRateProvider, fetch_range};
use crate::hub::command::MAX_DAYS;
use anyhow::Result;
use std::fmt;
use tracing::info;

pub const USAGE: &str = "Usage: fxchat rates <number_of_days> <currencies>";

#[derive(Debug, Clone, Default)]
pub struct RatesArgs {
    pub days: Option<String>,
    pub currencies: Vec<String>,
    pub json: bool,
}

/// Reasons an invocation is turned away before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInvocation {
    MissingArguments,
    NotANumber,
    OutOfRange,
}

impl fmt::Display for InvalidInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInvocation::MissingArguments => f.write_str(USAGE),
            InvalidInvocation::NotANumber => f.write_str("Please provide a valid number."),
            InvalidInvocation::OutOfRange => {
                write!(f, "Please enter a number between 1 and {MAX_DAYS}.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatesRequest {
    pub days: u32,
    pub currencies: Vec<String>,
}

impl RatesRequest {
    pub fn from_args(args: &RatesArgs) -> Result<Self, InvalidInvocation> {
        let days = match args.days.as_deref() {
            Some(days) if !args.currencies.is_empty() => days,
            _ => return Err(InvalidInvocation::MissingArguments),
        };

        let days: i64 = days
            .trim()
            .parse()
            .map_err(|_| InvalidInvocation::NotANumber)?;
        if !(1..=i64::from(MAX_DAYS)).contains(&days) {
            return Err(InvalidInvocation::OutOfRange);
        }

        Ok(RatesRequest {
            days: days as u32,
            currencies: args.currencies.iter().map(|c| c.to_uppercase()).collect(),
        })
    }
}

/// Invalid invocations are reported on stdout and still return `Ok`.
pub async fn run(provider: &dyn ExchangeRateProvider, args: &RatesArgs) -> Result<()> {
    let request = match RatesRequest::from_args(args) {
        Ok(request) => request,
        Err(invalid) => {
            println!("{invalid}");
            return Ok(());
        }
    };
    info!(days = request.days, currencies = ?request.currencies, "Fetching exchange rates");

    let pb = ui::new_spinner(format!("Fetching {} day(s) of rates...", request.days));
    let rates = fetch_range(provider, request.days, &request.currencies).await;
    pb.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rates)?);
    } else {
        println!("{}", display_as_tables(&rates));
    }
    Ok(())
}

pub fn display_as_tables(rates: &[DailyRates]) -> String {
    if rates.is_empty() {
        return ui::style_text(
            "No exchange rates available for the requested days.",
            ui::StyleType::Error,
        );
    }

    rates
        .iter()
        .map(|day| {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Currency"),
                ui::header_cell("Sale"),
                ui::header_cell("Purchase"),
            ]);
            for quote in &day.quotes {
                table.add_row(vec![
                    comfy_table::Cell::new(&quote.currency),
                    ui::rate_cell(&quote.sale),
                    ui::rate_cell(&quote.purchase),
                ]);
            }
            format!(
                "{} {}\n{}",
                ui::style_text("Date:", ui::StyleType::Subtle),
                ui::style_text(&day.date, ui::StyleType::Title),
                table
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
