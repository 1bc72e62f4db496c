//! Decode command - show what a CPR number encodes.

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;

use sundkort_core::card::rules::format_cpr;
use sundkort_core::decode_cpr;

/// Arguments for the decode command.
#[derive(Args)]
pub struct DecodeArgs {
    /// CPR number (DDMMYY-SSSS)
    #[arg(required = true)]
    cpr: String,

    /// Reference date for age computation (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = super::parse_date)]
    today: Option<NaiveDate>,
}

pub async fn run(args: DecodeArgs) -> anyhow::Result<()> {
    let details = decode_cpr(&args.cpr)
        .map_err(|e| anyhow::anyhow!("Invalid CPR number {}: {}", args.cpr, e))?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("{} {}", style("CPR:").bold(), format_cpr(&args.cpr));
    println!("  Date of birth: {}", details.date_of_birth());
    println!("  Age:           {}", details.age_on(today));
    println!("  Gender:        {}", details.gender);

    Ok(())
}
