//! Renderer module
//!
//! Renders a ScanResult (and the outcome of a synchronize pass) to
//! jsonl, json, md or raw.

use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use crate::core::model::{CandidateFile, ScanResult, SyncOutcome};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Jsonl,
    Json,
    #[default]
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    /// Highlight the maximum version in md output
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
            color: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// JSON view of a candidate
#[derive(Serialize)]
struct CandidateRow<'a> {
    #[serde(flatten)]
    file: &'a CandidateFile,
    version_str: String,
    is_max: bool,
}

/// Renderer for scan results
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    #[allow(dead_code)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a scan result to a string
    pub fn render(&self, result: &ScanResult) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result),
            OutputFormat::Json => self.to_json(&rows(result)),
            OutputFormat::Markdown => self.render_markdown(result),
            OutputFormat::Raw => self.render_raw(result),
        }
    }

    /// Render to a writer
    #[allow(dead_code)]
    pub fn render_to<W: Write>(&self, result: &ScanResult, mut writer: W) -> std::io::Result<()> {
        let output = self.render(result);
        writer.write_all(output.as_bytes())
    }

    /// Render the outcome of a synchronize pass
    pub fn render_outcome(&self, outcome: &SyncOutcome) -> String {
        match self.config.format {
            OutputFormat::Jsonl | OutputFormat::Json => self.to_json(outcome),
            OutputFormat::Markdown | OutputFormat::Raw => describe_outcome(outcome).join("\n"),
        }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> String {
        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|_| "null".to_string())
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result: &ScanResult) -> String {
        rows(result)
            .iter()
            .map(|row| self.to_json(row))
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    fn render_markdown(&self, result: &ScanResult) -> String {
        if result.is_empty() {
            return "No QC APK files with a numeric version were found.\n".to_string();
        }

        let mut output = String::from("## QC APK files (newest first)\n\n");
        for (i, file) in result.iter().enumerate() {
            let line = format_line(file, i == 0);
            if i == 0 && self.config.color {
                output.push_str(&format!("- {}\n", line.red().bold()));
            } else {
                output.push_str(&format!("- {}\n", line));
            }
        }
        output
    }

    /// Plain listing, one candidate per line
    fn render_raw(&self, result: &ScanResult) -> String {
        result
            .iter()
            .enumerate()
            .map(|(i, file)| format_line(file, i == 0))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn rows(result: &ScanResult) -> Vec<CandidateRow<'_>> {
    result
        .iter()
        .enumerate()
        .map(|(i, file)| CandidateRow {
            file,
            version_str: file.version_str(),
            is_max: i == 0,
        })
        .collect()
}

/// One listing line, e.g. `[max version 1.10.0] qc_app1.10.0.apk (in: sub)`
pub fn format_line(file: &CandidateFile, is_max: bool) -> String {
    let label = if is_max { "max version" } else { "version" };
    format!(
        "[{} {}] {} (in: {})",
        label,
        file.version_str(),
        file.name,
        file.relative_dir
    )
}

/// Human readable lines describing a synchronize pass
pub fn describe_outcome(outcome: &SyncOutcome) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = &outcome.listing_error {
        lines.push(format!("Cannot list target directory: {}", error));
    }
    for name in &outcome.deleted {
        lines.push(format!("Deleted old version: {}", name));
    }
    for failure in &outcome.deletion_failures {
        lines.push(format!(
            "Failed to delete old version {}: {}",
            failure.file, failure.message
        ));
    }

    if outcome.deleted.is_empty() {
        lines.push("No old versions to delete in target directory".to_string());
    } else {
        lines.push(format!(
            "Deleted {} old version(s) in total",
            outcome.deleted_count()
        ));
    }

    match &outcome.copy_error {
        Some(error) => lines.push(format!("Copy of {} failed: {}", outcome.winner, error)),
        None => lines.push(format!(
            "Copied max version to target directory: {}",
            outcome.winner
        )),
    }

    lines
}
