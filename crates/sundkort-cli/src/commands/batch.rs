//! Batch command - extract fields from many card files concurrently.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use sundkort_core::{CardExtractor, ExtractionResult, HealthCardMapper, SundkortConfig};

use super::extract::{format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Reference date for age computation (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = super::parse_date)]
    today: Option<NaiveDate>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| super::is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut mapper = HealthCardMapper::from_config(&config);
    if let Some(today) = args.today {
        mapper = mapper.with_reference_date(today);
    }
    let mapper = Arc::new(mapper);
    let config = Arc::new(config);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let mapper = Arc::clone(&mapper);
        let config = Arc::clone(&config);
        let pb = overall_pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let result = process_single_file(&path, &mapper, &config).map_err(|e| e.to_string());
            pb.inc(1);

            ProcessResult {
                path,
                result,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            }
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let processed = handle.await?;

        if let Err(error_msg) = &processed.result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", processed.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", processed.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push(processed);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_ok()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();

    if let Some(output_dir) = &args.output_dir {
        for processed in &successful {
            if let Ok(extraction) = &processed.result {
                let output_name = processed
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("card");

                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));
                let content =
                    format_record(&extraction.record, args.format, config.output.pretty_json)?;

                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for processed in &failed {
            if let Err(error_msg) = &processed.result {
                println!("  - {}: {}", processed.path.display(), error_msg);
            }
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    mapper: &HealthCardMapper,
    config: &SundkortConfig,
) -> anyhow::Result<ExtractionResult> {
    let source = super::open_source(path, config)?;
    Ok(mapper.extract(source.as_ref())?)
}

/// One row of `summary.csv`.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    national_id: &'a str,
    holder_name: &'a str,
    doctor_name: &'a str,
    date_of_birth: &'a str,
    card_type: &'a str,
    filled_fields: Option<usize>,
    warnings: String,
    processing_time_ms: u64,
    error: &'a str,
}

impl<'a> SummaryRow<'a> {
    fn new(processed: &'a ProcessResult) -> Self {
        let filename = processed
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &processed.result {
            Ok(extraction) => {
                let record = &extraction.record;
                Self {
                    filename,
                    status: "success",
                    national_id: &record.national_id,
                    holder_name: &record.holder_name,
                    doctor_name: &record.doctor_name,
                    date_of_birth: &record.date_of_birth,
                    card_type: &extraction.metadata.card_type,
                    filled_fields: Some(record.filled_count()),
                    warnings: extraction.metadata.warnings.join("; "),
                    processing_time_ms: processed.processing_time_ms,
                    error: "",
                }
            }
            Err(error_msg) => Self {
                filename,
                status: "error",
                national_id: "",
                holder_name: "",
                doctor_name: "",
                date_of_birth: "",
                card_type: "",
                filled_fields: None,
                warnings: String::new(),
                processing_time_ms: processed.processing_time_ms,
                error: error_msg,
            },
        }
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for processed in results {
        wtr.serialize(SummaryRow::new(processed))?;
    }

    wtr.flush()?;
    Ok(())
}
