use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;

use crate::error::{Error, Result};
use crate::model::Dataset;

pub const CSV_HEADER: [&str; 5] = ["country", "name", "start", "end", "bio"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write `data` to `path`, replacing any existing file.
pub fn write(data: &Dataset, format: OutputFormat, path: &Path) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, data).map_err(|e| {
                if e.is_io() {
                    io_err(e.into())
                } else {
                    Error::Json(e)
                }
            })?;
            out.write_all(b"\n").map_err(io_err)?;
        }
        OutputFormat::Csv => write_csv(data, &mut out).map_err(|e| {
            if e.is_io_error() {
                io_err(e.into())
            } else {
                Error::Csv(e)
            }
        })?,
    }

    out.flush().map_err(io_err)
}

/// Header row always present, even with no leaders.
fn write_csv<W: Write>(data: &Dataset, out: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for row in data.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
