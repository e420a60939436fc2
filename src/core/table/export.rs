//! Table export to CSV, YAML, JSON and XML.
//!
//! Exports always take the filtered row set, never a single page. Excel,
//! PDF and Markdown are part of the format list but write nothing.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::error::XtuiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Yaml,
    Json,
    Xml,
    Excel,
    Pdf,
    Markdown,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 7] = [
        ExportFormat::Csv,
        ExportFormat::Yaml,
        ExportFormat::Json,
        ExportFormat::Xml,
        ExportFormat::Excel,
        ExportFormat::Pdf,
        ExportFormat::Markdown,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Markdown => "md",
        }
    }

    /// `exported_data.<ext>`
    pub fn default_filename(&self) -> String {
        format!("exported_data.{}", self.extension())
    }

    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            ExportFormat::Csv | ExportFormat::Yaml | ExportFormat::Json | ExportFormat::Xml
        )
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Yaml => "YAML",
            ExportFormat::Json => "JSON",
            ExportFormat::Xml => "XML",
            ExportFormat::Excel => "Excel",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Markdown => "Markdown",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExportFormat {
    type Err = XtuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            other => Err(XtuiError::InvalidInput(format!("unknown export format: {}", other))),
        }
    }
}

/// What an export call actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Written(PathBuf),
    Unsupported(ExportFormat),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {format} export: {source}")]
    Io {
        format: ExportFormat,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode {format}: {message}")]
    Encode { format: ExportFormat, message: String },

    #[error("{0} export is not supported")]
    Unsupported(ExportFormat),
}

impl ExportError {
    pub fn format(&self) -> ExportFormat {
        match self {
            ExportError::Io { format, .. } | ExportError::Encode { format, .. } => *format,
            ExportError::Unsupported(format) => *format,
        }
    }
}

impl From<ExportError> for XtuiError {
    fn from(err: ExportError) -> Self {
        XtuiError::Export {
            format: err.format().to_string(),
            message: err.to_string(),
        }
    }
}

/// One row shaped as a header-to-cell mapping, in header order.
struct Record<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}

fn records<'a>(headers: &'a [String], rows: &'a [&'a [String]]) -> Vec<Record<'a>> {
    rows.iter().map(|cells| Record { headers, cells }).collect()
}

/// Write `rows` to `path`. Unsupported formats return without touching the filesystem.
pub fn export(
    format: ExportFormat,
    headers: &[String],
    rows: &[&[String]],
    path: &Path,
) -> Result<ExportStatus, ExportError> {
    if !format.is_supported() {
        return Ok(ExportStatus::Unsupported(format));
    }

    let io_err = |source| ExportError::Io { format, source };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    export_to_writer(format, headers, rows, &mut writer)?;
    writer.flush().map_err(io_err)?;
    Ok(ExportStatus::Written(path.to_path_buf()))
}

pub fn export_to_writer<W: Write>(
    format: ExportFormat,
    headers: &[String],
    rows: &[&[String]],
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(headers, rows, writer),
        ExportFormat::Json => serde_json::to_writer_pretty(writer, &records(headers, rows))
            .map_err(|e| encode_err(format, e)),
        ExportFormat::Yaml => {
            serde_yaml::to_writer(writer, &records(headers, rows)).map_err(|e| encode_err(format, e))
        }
        ExportFormat::Xml => write_xml(headers, rows, writer),
        ExportFormat::Excel | ExportFormat::Pdf | ExportFormat::Markdown => {
            Err(ExportError::Unsupported(format))
        }
    }
}

fn encode_err(format: ExportFormat, err: impl fmt::Display) -> ExportError {
    ExportError::Encode {
        format,
        message: err.to_string(),
    }
}

fn xml_err<E: fmt::Display>(err: E) -> ExportError {
    encode_err(ExportFormat::Xml, err)
}

fn write_csv<W: Write>(headers: &[String], rows: &[&[String]], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| encode_err(ExportFormat::Csv, e);

    csv_writer.write_record(headers).map_err(csv_err)?;
    for row in rows {
        csv_writer.write_record(*row).map_err(csv_err)?;
    }
    csv_writer.flush().map_err(|source| ExportError::Io {
        format: ExportFormat::Csv,
        source,
    })
}

/// `<records><record><field name="H">v</field>...</record></records>`
fn write_xml<W: Write>(headers: &[String], rows: &[&[String]], writer: W) -> Result<(), ExportError> {
    let mut xml = XmlWriter::new_with_indent(writer, b' ', 2);

    xml.write_event(Event::Start(BytesStart::new("records")))
        .map_err(xml_err)?;
    for row in rows {
        xml.write_event(Event::Start(BytesStart::new("record")))
            .map_err(xml_err)?;
        for (header, cell) in headers.iter().zip(row.iter()) {
            let start = BytesStart::new("field").with_attributes([("name", header.as_str())]);
            xml.write_event(Event::Start(start)).map_err(xml_err)?;
            xml.write_event(Event::Text(BytesText::new(cell))).map_err(xml_err)?;
            xml.write_event(Event::End(BytesEnd::new("field"))).map_err(xml_err)?;
        }
        xml.write_event(Event::End(BytesEnd::new("record")))
            .map_err(xml_err)?;
    }
    xml.write_event(Event::End(BytesEnd::new("records")))
        .map_err(xml_err)?;
    Ok(())
}
