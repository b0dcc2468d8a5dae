use chrono::{Local, NaiveDate};
use clap::Parser;
use console::style;
use sbxctl_core::{DateRange, validate_realm};
use sbxctl_types::RealmUsage;
use serde::Serialize;

use crate::{Context, output};

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct CredCommand {
    /// Four character realm code
    pub realm: String,

    /// last-month, YYYY-MM or YYYY-MM-DD:YYYY-MM-DD
    pub time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreditReport<'a> {
    realm: &'a str,
    from: String,
    to: String,
    minutes_up: u64,
    minutes_down: u64,
    credits: u64,
}

impl<'a> CreditReport<'a> {
    fn new(realm: &'a str, range: &DateRange, usage: &RealmUsage) -> Self {
        CreditReport {
            realm,
            from: range.from_param(),
            to: range.to_param(),
            minutes_up: usage.minutes_up,
            minutes_down: usage.minutes_down,
            credits: usage.credits(),
        }
    }
}

impl CredCommand {
    /// `last-month` is the previous month of the user's local calendar
    fn range(&self, today: NaiveDate) -> Result<DateRange, String> {
        DateRange::parse(&self.time, today).map_err(|e| e.to_string())
    }

    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        // Bad input fails before credentials are even looked at
        validate_realm(&self.realm).map_err(|e| e.to_string())?;
        let range = self.range(Local::now().date_naive())?;
        let session = ctx.session()?;

        let usage = session
            .dispatcher()
            .realm_usage(&self.realm, &range)
            .await
            .map_err(|e| format!("Failed to fetch usage of realm {}: {}", self.realm, e))?;
        let report = CreditReport::new(&self.realm, &range, &usage);

        if ctx.json {
            return output::print_json(&report);
        }

        println!(
            "{} {} ({})",
            style("Realm").bold(),
            style(report.realm).cyan(),
            range
        );
        println!("  {} {}", style("Minutes up:").bold(), report.minutes_up);
        println!("  {} {}", style("Minutes down:").bold(), report.minutes_down);
        println!("  {} {}", style("Credits:").bold(), style(report.credits).green());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred(time: &str) -> CredCommand {
        CredCommand {
            realm: "zzzz".to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_last_month_follows_the_given_day() {
        let first_of_march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let range = cred("last-month").range(first_of_march).unwrap();
        assert_eq!(range.from_param(), "2024-02-01");
        assert_eq!(range.to_param(), "2024-02-29");

        // the evening of Feb 29 in UTC-5 is already March 1 in UTC
        let last_of_february = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let range = cred("last-month").range(last_of_february).unwrap();
        assert_eq!(range.from_param(), "2024-01-01");
        assert_eq!(range.to_param(), "2024-01-31");

        assert!(cred("yesterday").range(first_of_march).is_err());
    }

    #[test]
    fn test_credit_report() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let range = DateRange::parse("2024-03", today).unwrap();
        let usage: RealmUsage =
            serde_json::from_str(r#"{ "minutesUp": 100, "minutesDown": 10 }"#).unwrap();

        let json = serde_json::to_value(CreditReport::new("zzzz", &range, &usage)).unwrap();
        assert_eq!(json["from"], "2024-03-01");
        assert_eq!(json["to"], "2024-03-31");
        assert_eq!(json["minutesDown"], 10);
        assert_eq!(json["credits"], 103);
    }
}
