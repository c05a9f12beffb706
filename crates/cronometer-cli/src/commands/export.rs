//! Export command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use tokio::io::AsyncWrite;

use cronometer::ExportParams;

use crate::output;

use super::AccountArgs;

/// Kind of data to export.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Servings,
    Exercises,
    Biometrics,
    Notes,
    DailySummary,
}

impl ExportKind {
    /// Value of the `generate` parameter.
    fn wire_name(self) -> &'static str {
        match self {
            ExportKind::Servings => "servings",
            ExportKind::Exercises => "exercises",
            ExportKind::Biometrics => "biometrics",
            ExportKind::Notes => "notes",
            ExportKind::DailySummary => "dailySummary",
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub account: AccountArgs,

    /// What to export
    #[arg(long, value_enum)]
    pub generate: ExportKind,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Extra export parameter as key=value (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Write the export to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn build_params(args: &ExportArgs) -> Result<ExportParams> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            bail!("--start {start} is after --end {end}");
        }
    }

    let mut params: ExportParams = args.params.iter().cloned().collect();
    params.insert("generate".to_string(), args.generate.wire_name().to_string());
    if let Some(start) = args.start {
        params.insert("start".to_string(), start.format("%Y-%m-%d").to_string());
    }
    if let Some(end) = args.end {
        params.insert("end".to_string(), end.format("%Y-%m-%d").to_string());
    }

    Ok(params)
}

pub async fn run(args: ExportArgs) -> Result<()> {
    let params = build_params(&args)?;
    let client = args.account.client()?;

    output::progress("Starting export...");

    let export = client
        .export(&params)
        .await
        .context("Failed to start export")?;
    tracing::debug!(content_type = ?export.content_type(), "Export started");

    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };

    let bytes = export
        .copy_to(&mut writer)
        .await
        .context("Failed to read export")?;

    match &args.output {
        Some(path) => output::success(&format!("Wrote {bytes} bytes to {}", path.display())),
        None => output::success(&format!("Exported {bytes} bytes")),
    }

    Ok(())
}
