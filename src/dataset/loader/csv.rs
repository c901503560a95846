//! CSV file loader.
//!
//! Reads a headered CSV file into a [`Table`] of string columns. There is no
//! header-less mode: the first record always names the columns.

use crate::core::error::{PipelineError, Result};
use crate::dataset::table::Table;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Quote character
    pub quote_char: char,
    /// Escape character
    pub escape_char: Option<char>,
    /// Comment character
    pub comment_char: Option<char>,
    /// Maximum number of data rows to read
    pub max_rows: Option<usize>,
    /// Trim whitespace from headers and fields
    pub trim: bool,
    /// Buffer size for reading
    pub buffer_size: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: ',',
            quote_char: '"',
            escape_char: None,
            comment_char: None,
            max_rows: None,
            trim: true,
            buffer_size: 8192,
        }
    }
}

impl CsvConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, c) in [("delimiter", self.delimiter), ("quote_char", self.quote_char)] {
            if !c.is_ascii() {
                return Err(PipelineError::invalid_parameter(
                    name,
                    c.to_string(),
                    "must be a single ASCII character",
                ));
            }
        }
        if self.delimiter == self.quote_char {
            return Err(PipelineError::config("delimiter and quote_char must differ"));
        }
        if self.buffer_size == 0 {
            return Err(PipelineError::invalid_parameter(
                "buffer_size",
                "0",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// CSV table loader
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    csv_config: CsvConfig,
}

impl CsvLoader {
    /// Create a new CSV loader
    pub fn new(csv_config: CsvConfig) -> Self {
        CsvLoader { csv_config }
    }

    /// Set delimiter character
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.csv_config.delimiter = delimiter;
        self
    }

    /// Set maximum rows to read
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.csv_config.max_rows = Some(max_rows);
        self
    }

    /// Get the CSV configuration
    pub fn csv_config(&self) -> &CsvConfig {
        &self.csv_config
    }

    fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.csv_config.delimiter as u8)
            .quote(self.csv_config.quote_char as u8)
            .has_headers(true)
            .flexible(false)
            .buffer_capacity(self.csv_config.buffer_size);

        if self.csv_config.trim {
            builder.trim(csv::Trim::All);
        }
        if let Some(escape_char) = self.csv_config.escape_char {
            builder.escape(Some(escape_char as u8));
        }
        if let Some(comment_char) = self.csv_config.comment_char {
            builder.comment(Some(comment_char as u8));
        }
        builder
    }

    fn open(path: &Path) -> Result<File> {
        if !path.exists() {
            return Err(PipelineError::data_loading(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(PipelineError::data_loading(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        File::open(path).map_err(|e| {
            PipelineError::data_loading(format!("Failed to open file {}: {}", path.display(), e))
        })
    }

    /// Load a CSV file into a table
    pub fn load_table<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let path = path.as_ref();
        log::info!("Loading CSV file: {}", path.display());
        let table = self.read_table(Self::open(path)?)?;
        log::info!(
            "Loaded {} rows with {} columns",
            table.num_rows(),
            table.num_columns()
        );
        Ok(table)
    }

    /// Parse an in-memory CSV document into a table
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        self.read_table(bytes)
    }

    /// Read only the header row of a CSV file
    pub fn read_header<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let mut reader = self.reader_builder().from_reader(Self::open(path.as_ref())?);
        let headers = reader
            .headers()
            .map_err(|e| PipelineError::data_loading(format!("Failed to read headers: {}", e)))?;
        let headers = header_names(headers);
        if headers.is_empty() {
            return Err(PipelineError::data_loading("CSV file has no columns"));
        }
        Ok(headers)
    }

    /// Read a table from any reader
    pub fn read_table<R: Read>(&self, source: R) -> Result<Table> {
        let mut reader = self.reader_builder().from_reader(source);

        let headers = header_names(
            reader
                .headers()
                .map_err(|e| PipelineError::data_loading(format!("Failed to read headers: {}", e)))?,
        );
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(PipelineError::data_loading("CSV file has no columns"));
        }

        let mut rows = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                PipelineError::data_loading(format!(
                    "CSV parsing error at line {}: {}",
                    line_num + 2,
                    e
                ))
            })?;

            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());

            if let Some(max_rows) = self.csv_config.max_rows {
                if rows.len() >= max_rows {
                    log::info!("Reached max_rows limit of {}, stopping", max_rows);
                    break;
                }
            }
        }

        if rows.is_empty() {
            return Err(PipelineError::data_loading("CSV file contains no data rows"));
        }

        Table::from_rows(headers, rows)
    }

    /// Serialize a table to CSV bytes using this loader's delimiter and quote
    pub fn to_csv_bytes(&self, table: &Table) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.csv_config.delimiter as u8)
            .quote(self.csv_config.quote_char as u8)
            .from_writer(Vec::new());

        writer.write_record(table.column_names())?;
        for index in 0..table.num_rows() {
            if let Some(row) = table.row(index) {
                writer.write_record(row)?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| PipelineError::serialization(format!("Failed to flush CSV writer: {}", e)))
    }
}

fn header_names(headers: &StringRecord) -> Vec<String> {
    headers.iter().map(|h| h.trim().to_string()).collect()
}
