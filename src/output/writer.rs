//! Output table writer
//!
//! Fixed header `clave;resumen;<OUTPUT_FIELDS>`, one row per ticket in
//! batch order.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::pipeline::ClassifiedTicket;
use crate::types::{OUTPUT_FIELDS, Result};

/// Leading columns before the classification fields
pub const KEY_COLUMNS: [&str; 2] = ["clave", "resumen"];

/// Header row of the output table
pub fn header() -> Vec<&'static str> {
    KEY_COLUMNS.iter().chain(OUTPUT_FIELDS.iter()).copied().collect()
}

/// Write the rows to any sink
pub fn write_results<W: Write>(sink: W, rows: &[ClassifiedTicket], delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(sink);

    writer.write_record(header())?;
    for row in rows {
        let mut record = vec![row.key.as_str(), row.title.as_str()];
        record.extend(row.result.fields());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the rows to `path`, creating parent directories as needed
pub fn save_results(path: &Path, rows: &[ClassifiedTicket], delimiter: u8) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_results(std::io::BufWriter::new(file), rows, delimiter)
}

/// `Resultado_Clasificado_Q<quarter>-<year>.csv` for the given date
pub fn default_output_name(date: NaiveDate) -> String {
    let quarter = (date.month() - 1) / 3 + 1;
    format!("Resultado_Clasificado_Q{}-{}.csv", quarter, date.year())
}

/// Default output path in the current directory, dated today
pub fn default_output_path() -> PathBuf {
    PathBuf::from(default_output_name(chrono::Local::now().date_naive()))
}
