//! Extract command - map the lines of a single card to named fields.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::{debug, info};

use sundkort_core::{CardExtractor, ExtractionResult, FieldRecord, HealthCardMapper};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (.txt, .text, .ocr or .pdf), or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show card type, anchor line and warnings
    #[arg(long)]
    show_metadata: bool,

    /// Reference date for age computation (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = super::parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let mut mapper = HealthCardMapper::from_config(&config);
    if let Some(today) = args.today {
        mapper = mapper.with_reference_date(today);
    }

    info!("Processing file: {}", args.input.display());

    let source = super::open_source(&args.input, &config)?;
    let result = mapper.extract(source.as_ref())?;

    let output = format_record(&result.record, args.format, config.output.pretty_json)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_metadata {
        print_metadata(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_metadata(result: &ExtractionResult) {
    let metadata = &result.metadata;

    println!();
    println!("{} Card type: {}", style("ℹ").blue(), metadata.card_type);
    println!("{} Issuer: {:?}", style("ℹ").blue(), metadata.issuer_kind);
    match metadata.anchor_line {
        Some(index) => println!("{} CPR anchor: line {}", style("ℹ").blue(), index + 1),
        None => println!("{} CPR anchor: not found", style("ℹ").blue()),
    }
    println!(
        "{} Fields filled: {}/{}",
        style("ℹ").blue(),
        result.record.filled_count(),
        FieldRecord::FIELD_NAMES.len()
    );
    println!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        metadata.processing_time_ms
    );
    for warning in &metadata.warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
}

pub fn format_record(
    record: &FieldRecord,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &FieldRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(FieldRecord::FIELD_NAMES)?;
    wtr.write_record(record.fields().iter().map(|(_, value)| *value))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &FieldRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Holder: {}\n", record.holder_name));
    output.push_str(&format!("  CPR:     {}\n", record.national_id));
    output.push_str(&format!("  Address: {}\n", record.holder_address));
    output.push_str(&format!("  City:    {}\n", record.holder_postal_city));
    if !record.date_of_birth.is_empty() {
        output.push_str(&format!(
            "  Born:    {} (age {}, {})\n",
            record.date_of_birth, record.age, record.gender
        ));
    }
    output.push('\n');

    output.push_str(&format!("Doctor: {}\n", record.doctor_name));
    output.push_str(&format!("  Address: {}\n", record.doctor_address));
    output.push_str(&format!("  Phone:   {}\n", record.doctor_phone));
    output.push('\n');

    output.push_str(&format!("Region:       {}\n", record.region));
    output.push_str(&format!("Municipality: {}\n", record.municipality));
    output.push_str(&format!("Valid from:   {}\n", record.valid_from));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FieldRecord {
        FieldRecord {
            holder_name: "ANNA JENSEN".to_string(),
            national_id: "010190-1234".to_string(),
            city: "Aarhus, C".to_string(),
            ..FieldRecord::default()
        }
    }

    #[test]
    fn test_csv_has_header_and_one_row() {
        let csv = format_record(&record(), OutputFormat::Csv, false).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], FieldRecord::FIELD_NAMES.join(","));
        assert!(rows[1].contains("010190-1234"));
        // embedded comma is quoted
        assert!(rows[1].contains("\"Aarhus, C\""));
    }

    #[test]
    fn test_json_keeps_empty_fields() {
        let json = format_record(&record(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["holder_name"], "ANNA JENSEN");
        assert_eq!(value["doctor_phone"], "");
        assert!(!json.contains('\n'));

        let pretty = format_record(&record(), OutputFormat::Json, true).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_text_omits_birth_line_without_cpr_details() {
        let text = format_record(&record(), OutputFormat::Text, false).unwrap();
        assert!(text.starts_with("Holder: ANNA JENSEN"));
        assert!(!text.contains("Born:"));
    }
}
