use crate::cli::args::OutputFormat;
use crate::core::form::SubmissionResult;
use crate::core::installer::InstallReport;
use crate::core::loader::Severity;
use crate::core::table::{export_to_writer, ExportError, ExportFormat};
use crate::domain::config::XtuiConfig;
use crate::infrastructure::probe::ProbeReport;
use std::io::{self, Write};
use tabled::builder::Builder;

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_rows(&mut self, headers: &[String], rows: &[&[String]]) -> Result<(), OutputError>;
    fn write_submission(&mut self, labels: &[String], result: &SubmissionResult) -> Result<(), OutputError>;
    fn write_install_report(&mut self, report: &InstallReport) -> Result<(), OutputError>;
    fn write_probe(&mut self, report: &ProbeReport) -> Result<(), OutputError>;
    fn write_config(&mut self, config: &XtuiConfig) -> Result<(), OutputError>;
    fn write_notice(&mut self, severity: Severity, message: &str) -> Result<(), OutputError>;
    fn write_message(&mut self, message: &str) -> Result<(), OutputError>;
    fn write_error(&mut self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Record encoding error: {0}")]
    RecordError(#[from] ExportError),
    #[error("Table formatting error: {0}")]
    TableError(String),
}

impl From<OutputError> for crate::domain::error::XtuiError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self::with_writers(format, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(format: OutputFormat, out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self { format, out, err }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn write_table(&mut self, headers: &[String], rows: &[&[String]]) -> Result<(), OutputError> {
        let mut builder = Builder::default();
        builder.push_record(headers.iter().cloned());
        for row in rows {
            builder.push_record(row.iter().cloned());
        }
        writeln!(self.out, "{}", builder.build())?;
        Ok(())
    }

    fn write_pairs(&mut self, headers: [&str; 2], pairs: Vec<(String, String)>) -> Result<(), OutputError> {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Vec<String>> = pairs.into_iter().map(|(k, v)| vec![k, v]).collect();
        let rows: Vec<&[String]> = rows.iter().map(Vec::as_slice).collect();
        self.write_rows(&headers, &rows)
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_rows(&mut self, headers: &[String], rows: &[&[String]]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{}", headers.join("\t"))?;
                for row in rows {
                    writeln!(self.out, "{}", row.join("\t"))?;
                }
            }
            OutputFormat::Json => {
                export_to_writer(ExportFormat::Json, headers, rows, &mut self.out)?;
                writeln!(self.out)?;
            }
            OutputFormat::Table => self.write_table(headers, rows)?,
            OutputFormat::Csv => export_to_writer(ExportFormat::Csv, headers, rows, &mut self.out)?,
        }
        Ok(())
    }

    fn write_submission(&mut self, labels: &[String], result: &SubmissionResult) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                for (index, (_, value)) in result.iter().enumerate() {
                    let label = labels.get(index).map(String::as_str).unwrap_or("?");
                    writeln!(self.out, "{}: {}", label, value)?;
                }
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(result)?)?;
            }
            OutputFormat::Table | OutputFormat::Csv => {
                let pairs = result.iter().map(|(key, value)| (key, value.to_string())).collect();
                self.write_pairs(["key", "value"], pairs)?;
            }
        }
        Ok(())
    }

    fn write_install_report(&mut self, report: &InstallReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                let suffix = if report.cancelled { " (cancelled)" } else { "" };
                writeln!(
                    self.out,
                    "Installed {} of {} applications{}",
                    report.installed.len(),
                    report.total,
                    suffix
                )?;
                for app in &report.installed {
                    writeln!(self.out, "  {}", app)?;
                }
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(report)?)?;
            }
            OutputFormat::Table | OutputFormat::Csv => {
                let headers = vec!["application".to_string()];
                let rows: Vec<Vec<String>> = report.installed.iter().map(|app| vec![app.clone()]).collect();
                let rows: Vec<&[String]> = rows.iter().map(Vec::as_slice).collect();
                self.write_rows(&headers, &rows)?;
            }
        }
        Ok(())
    }

    fn write_probe(&mut self, report: &ProbeReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{} is reachable ({:.2} ms)", report.target, report.latency_ms)?;
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(report)?)?;
            }
            OutputFormat::Table | OutputFormat::Csv => {
                let pairs = vec![
                    ("target".to_string(), report.target.clone()),
                    ("reachable".to_string(), report.reachable.to_string()),
                    ("latency_ms".to_string(), format!("{:.2}", report.latency_ms)),
                ];
                self.write_pairs(["field", "value"], pairs)?;
            }
        }
        Ok(())
    }

    fn write_config(&mut self, config: &XtuiConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                let text = toml::to_string_pretty(config).map_err(|e| OutputError::TableError(e.to_string()))?;
                write!(self.out, "{}", text)?;
            }
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(config)?)?;
            }
            OutputFormat::Table | OutputFormat::Csv => {
                let value = toml::Value::try_from(config).map_err(|e| OutputError::TableError(e.to_string()))?;
                let mut pairs = Vec::new();
                flatten_toml("", &value, &mut pairs);
                self.write_pairs(["key", "value"], pairs)?;
            }
        }
        Ok(())
    }

    fn write_notice(&mut self, severity: Severity, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": severity.name(),
                });
                let text = serde_json::to_string_pretty(&output)?;
                match severity {
                    Severity::Error => writeln!(self.err, "{}", text)?,
                    _ => writeln!(self.out, "{}", text)?,
                }
            }
            _ => match severity {
                Severity::Error => writeln!(self.err, "Error: {}", message)?,
                Severity::Warning => writeln!(self.out, "Warning: {}", message)?,
                Severity::Success => writeln!(self.out, "Success: {}", message)?,
                Severity::Info => writeln!(self.out, "{}", message)?,
            },
        }
        Ok(())
    }

    fn write_message(&mut self, message: &str) -> Result<(), OutputError> {
        self.write_notice(Severity::Info, message)
    }

    fn write_error(&mut self, error: &str) -> Result<(), OutputError> {
        self.write_notice(Severity::Error, error)
    }
}

/// Dotted `section.key` pairs for every leaf value.
fn flatten_toml(prefix: &str, value: &toml::Value, pairs: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, value) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_toml(&path, value, pairs);
            }
        }
        toml::Value::String(s) => pairs.push((prefix.to_string(), s.clone())),
        other => pairs.push((prefix.to_string(), other.to_string())),
    }
}
