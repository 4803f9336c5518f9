//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::StreamExt;
use futures_util::stream;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use swinv_core::{ExtractionResult, InvoiceScanner};

use super::config::load_config;
use super::process::{OutputFormat, format_result};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
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

    /// Number of files processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();

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

    let scanner = InvoiceScanner::new(config);
    let mut pending = stream::iter(files)
        .map(|path| {
            let scanner = scanner.clone();
            async move {
                let file_start = Instant::now();
                let outcome = scanner.scan_file(&path).await;
                (path, outcome, file_start.elapsed().as_millis() as u64)
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some((path, outcome, processing_time_ms)) = pending.next().await {
        overall_pb.inc(1);

        match outcome {
            Ok(result) => {
                debug!(
                    "Processed {} with {} warning(s)",
                    path.display(),
                    result.warnings.len()
                );
                results.push(ProcessResult {
                    path,
                    result: Some(result),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }
    }

    overall_pb.finish_and_clear();

    // Completion order depends on scheduling; report in path order.
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for entry in &successful {
            if let Some(result) = &entry.result {
                write_output(output_dir, &entry.path, result, args.format)?;
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
        for entry in &failed {
            println!(
                "  - {}: {}",
                entry.path.display(),
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_output(
    output_dir: &Path,
    input: &Path,
    result: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));

    fs::write(&output_path, format_result(result, format, false)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "external_number",
        "supplier_name",
        "invoice_date",
        "due_date",
        "gross_amount",
        "vat_rate",
        "vat_rate_source",
        "iban",
        "positions",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for entry in results {
        let filename = entry
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        if let Some(result) = &entry.result {
            let data = &result.data;
            wtr.write_record([
                filename,
                "success".to_string(),
                data.external_number.clone().unwrap_or_default(),
                data.supplier_name.clone().unwrap_or_default(),
                opt_to_string(data.invoice_date),
                opt_to_string(data.due_date),
                opt_to_string(data.gross_amount),
                opt_to_string(data.vat_rate),
                data.vat_rate_source
                    .map(|s| format!("{:?}", s).to_lowercase())
                    .unwrap_or_default(),
                data.iban.clone().unwrap_or_default(),
                data.positions.len().to_string(),
                result.warnings.len().to_string(),
                entry.processing_time_ms.to_string(),
                String::new(),
            ])?;
        } else {
            let mut record = vec![String::new(); 14];
            record[0] = filename;
            record[1] = "error".to_string();
            record[12] = entry.processing_time_ms.to_string();
            record[13] = entry.error.clone().unwrap_or_default();
            wtr.write_record(&record)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use swinv_core::{ExtractedInvoiceData, VatRateSource};

    #[test]
    fn test_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let results = vec![
            ProcessResult {
                path: PathBuf::from("in/a.pdf"),
                result: Some(ExtractionResult {
                    data: ExtractedInvoiceData {
                        supplier_name: Some("Muster AG".to_string()),
                        gross_amount: Some(Decimal::new(5000, 2)),
                        vat_rate: Some(Decimal::new(81, 1)),
                        vat_rate_source: Some(VatRateSource::Default),
                        ..Default::default()
                    },
                    warnings: vec!["Could not extract iban".to_string()],
                    processing_time_ms: 2,
                }),
                error: None,
                processing_time_ms: 4,
            },
            ProcessResult {
                path: PathBuf::from("in/b.pdf"),
                result: None,
                error: Some("document unreadable".to_string()),
                processing_time_ms: 1,
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "a.pdf,success,,Muster AG,,,50.00,8.1,default,,0,1,4,");
        assert_eq!(rows[2], "b.pdf,error,,,,,,,,,,,1,document unreadable");
    }
}
