//! The `exchange [days] [CUR ...]` chat command and its result formatting.

use crate::core::rates::DailyRates;
use std::num::IntErrorKind;

pub const COMMAND_TOKEN: &str = "exchange";
pub const DEFAULT_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 10;
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCommand {
    pub days: u32,
    pub currencies: Vec<String>,
}

impl Default for ExchangeCommand {
    fn default() -> Self {
        ExchangeCommand {
            days: DEFAULT_DAYS,
            currencies: vec![DEFAULT_CURRENCY.to_string()],
        }
    }
}

impl ExchangeCommand {
    /// Returns `None` for plain chat lines. Malformed arguments never fail the
    /// command; they fall back to the defaults.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != COMMAND_TOKEN {
            return None;
        }

        let mut command = ExchangeCommand::default();
        if let Some(days) = tokens.next() {
            command.days = parse_days(days);
        }

        let currencies: Vec<String> = tokens.map(str::to_uppercase).collect();
        if !currencies.is_empty() {
            command.currencies = currencies;
        }

        Some(command)
    }
}

fn parse_days(token: &str) -> u32 {
    match token.parse::<u32>() {
        Ok(0) => DEFAULT_DAYS,
        Ok(days) => days.min(MAX_DAYS),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_DAYS,
        Err(_) => DEFAULT_DAYS,
    }
}

/// One block per date, separated by a blank line.
pub fn format_rates(rates: &[DailyRates]) -> String {
    rates
        .iter()
        .map(|day| {
            let lines: Vec<String> = day
                .quotes
                .iter()
                .map(|q| {
                    format!(
                        "  {} - Sale: {}, Purchase: {}",
                        q.currency, q.sale, q.purchase
                    )
                })
                .collect();
            format!("{}:\n{}", day.date, lines.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{Quote, Rate};

    #[test]
    fn test_plain_chat_is_not_a_command() {
        assert_eq!(ExchangeCommand::parse("hello there"), None);
        assert_eq!(ExchangeCommand::parse(""), None);
        assert_eq!(ExchangeCommand::parse("exchanges 2"), None);
        assert_eq!(ExchangeCommand::parse("let's exchange 2"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            ExchangeCommand::parse("exchange"),
            Some(ExchangeCommand::default())
        );
        assert_eq!(
            ExchangeCommand::parse("  exchange  "),
            Some(ExchangeCommand::default())
        );
    }

    #[test]
    fn test_days_and_currencies() {
        let command = ExchangeCommand::parse("exchange 2 usd Eur").unwrap();
        assert_eq!(command.days, 2);
        assert_eq!(command.currencies, vec!["USD", "EUR"]);
    }

    #[test]
    fn test_invalid_days_fall_back() {
        assert_eq!(
            ExchangeCommand::parse("exchange abc"),
            Some(ExchangeCommand {
                days: 1,
                currencies: vec!["USD".to_string()],
            })
        );
        assert_eq!(ExchangeCommand::parse("exchange 0").unwrap().days, 1);
        assert_eq!(ExchangeCommand::parse("exchange -3").unwrap().days, 1);
        assert_eq!(ExchangeCommand::parse("exchange 2.5 EUR").unwrap().days, 1);

        let command = ExchangeCommand::parse("exchange x pln").unwrap();
        assert_eq!(command.currencies, vec!["PLN"]);
    }

    #[test]
    fn test_days_capped() {
        assert_eq!(ExchangeCommand::parse("exchange 10").unwrap().days, 10);
        assert_eq!(ExchangeCommand::parse("exchange 11").unwrap().days, MAX_DAYS);
        assert_eq!(ExchangeCommand::parse("exchange 365").unwrap().days, MAX_DAYS);
        assert_eq!(
            ExchangeCommand::parse("exchange 99999999999").unwrap().days,
            MAX_DAYS
        );
        assert_eq!(
            ExchangeCommand::parse("exchange -99999999999").unwrap().days,
            DEFAULT_DAYS
        );
    }

    #[test]
    fn test_format_rates() {
        let rates = vec![
            DailyRates {
                date: "02.12.2024".to_string(),
                quotes: vec![
                    Quote {
                        currency: "USD".to_string(),
                        sale: Rate::Value("41.5".to_string()),
                        purchase: Rate::Value("40.9".to_string()),
                    },
                    Quote {
                        currency: "XYZ".to_string(),
                        sale: Rate::NotAvailable,
                        purchase: Rate::NotAvailable,
                    },
                ],
            },
            DailyRates {
                date: "01.12.2024".to_string(),
                quotes: vec![Quote {
                    currency: "USD".to_string(),
                    sale: Rate::Value("41.4".to_string()),
                    purchase: Rate::Value("40.8".to_string()),
                }],
            },
        ];

        assert_eq!(
            format_rates(&rates),
            "02.12.2024:\n  USD - Sale: 41.5, Purchase: 40.9\n  XYZ - Sale: N/A, Purchase: N/A\n\n01.12.2024:\n  USD - Sale: 41.4, Purchase: 40.8"
        );
        assert_eq!(format_rates(&[]), "");
    }
}
