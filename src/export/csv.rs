use crate::errors::CiphertraceError;
use crate::models::AnalysisRecord;

/// Header row plus one row per record. Fields containing the delimiter,
/// quotes or line breaks are quoted by the writer.
pub fn records_to_csv<'a, R, I>(records: I) -> Result<String, CiphertraceError>
where
    R: AnalysisRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::csv_header())?;
    for record in records {
        writer.write_record(record.csv_row())?;
    }
    let bytes = writer.into_inner()
        .map_err(|e| CiphertraceError::Internal(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| CiphertraceError::Internal(format!("CSV output is not UTF-8: {}", e)))
}
