//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use swinv_core::invoice::rules::format_iban;
use swinv_core::{ExtractedInvoiceData, ExtractionResult, InvoiceScanner};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the reconstructed document text
    #[arg(long)]
    raw_text: bool,

    /// Print fields that could not be extracted
    #[arg(long)]
    show_warnings: bool,
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
    /// File extension used when writing per-file outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Extracting invoice data...");

    let scanner = InvoiceScanner::new(config);
    let result = scanner
        .scan_file(&args.input)
        .await
        .with_context(|| format!("Failed to process {}", args.input.display()));

    pb.finish_and_clear();
    let result = result?;

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_result(&result, args.format, args.raw_text)?;

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

    debug!(
        "Total processing time: {:?} (extraction {}ms)",
        start.elapsed(),
        result.processing_time_ms
    );

    Ok(())
}

/// Render one extraction result in the requested format.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    raw_text: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(&result.data, raw_text),
        OutputFormat::Csv => format_csv(&result.data),
        OutputFormat::Text => Ok(format_text(&result.data, raw_text)),
    }
}

fn format_json(data: &ExtractedInvoiceData, raw_text: bool) -> anyhow::Result<String> {
    let mut json = serde_json::to_value(data)?;
    if !raw_text {
        if let Some(obj) = json.as_object_mut() {
            obj.remove("rawText");
        }
    }
    Ok(serde_json::to_string_pretty(&json)?)
}

fn format_csv(data: &ExtractedInvoiceData) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "external_number",
        "supplier_name",
        "vat_number",
        "invoice_date",
        "due_date",
        "net_amount",
        "vat_rate",
        "vat_amount",
        "gross_amount",
        "iban",
        "positions",
    ])?;

    wtr.write_record([
        data.external_number.clone().unwrap_or_default(),
        data.supplier_name.clone().unwrap_or_default(),
        data.vat_number.clone().unwrap_or_default(),
        opt_to_string(data.invoice_date),
        opt_to_string(data.due_date),
        opt_to_string(data.net_amount),
        opt_to_string(data.vat_rate),
        opt_to_string(data.vat_amount),
        opt_to_string(data.gross_amount),
        data.iban.clone().unwrap_or_default(),
        data.positions.len().to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(data: &ExtractedInvoiceData, raw_text: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Supplier: {}\n", data.supplier_name.as_deref().unwrap_or("-")));
    if let Some(vat_number) = &data.vat_number {
        output.push_str(&format!("  UID: {}\n", vat_number));
    }
    output.push_str(&format!("Invoice: {}\n", data.external_number.as_deref().unwrap_or("-")));
    output.push_str(&format!("Date: {}\n", opt_or_dash(data.invoice_date)));
    if let Some(due_date) = data.due_date {
        output.push_str(&format!("Payment due: {}\n", due_date));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Net:   CHF {}\n", opt_or_dash(data.net_amount)));
    output.push_str(&format!(
        "  VAT:   CHF {} ({}%)\n",
        opt_or_dash(data.vat_amount),
        opt_or_dash(data.vat_rate)
    ));
    output.push_str(&format!("  Gross: CHF {}\n", opt_or_dash(data.gross_amount)));
    if let Some(iban) = &data.iban {
        output.push_str(&format!("  IBAN:  {}\n", format_iban(iban)));
    }

    if !data.positions.is_empty() {
        output.push_str("\nPositions:\n");
        for position in &data.positions {
            output.push_str(&format!(
                "  {} x {} {} @ {} = {}\n",
                position.quantity,
                position.unit,
                position.description,
                position.unit_price,
                position.total
            ));
        }
    }

    if raw_text {
        output.push_str("\nText:\n");
        output.push_str(&data.raw_text);
        output.push('\n');
    }

    output
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
