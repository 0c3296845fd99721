//! CSV rendering.
//!
//! Semi-structured attributes are written in their canonical form so list
//! values survive a round trip through any CSV reader. Nothing is truncated.

use crate::error::ExportError;
use crate::{EXPORT_COLUMNS, cell_value};
use rolodex_core::ContactRecord;

pub fn render(records: &[ContactRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS.iter().map(|(header, _)| *header))?;
    for record in records {
        writer.write_record(
            EXPORT_COLUMNS
                .iter()
                .map(|(_, column)| cell_value(record, column, false)),
        )?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
