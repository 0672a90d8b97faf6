//! CSV accident table parser.
//!
//! The table is read fully into memory by the caller and parsed here. Only
//! the configured location column is kept; every other column is ignored.

use accident_map_accident_models::AccidentRecord;
use serde::{Deserialize, Serialize};

use crate::SourceError;

/// Layout of the accident table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentTableConfig {
    /// Header of the free-text location column (e.g. `"Lokasi"`).
    pub location_column: String,
    /// Field delimiter (default: comma).
    #[serde(default)]
    pub delimiter: Option<String>,
}

impl AccidentTableConfig {
    /// Returns the delimiter byte, defaulting to `,`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the delimiter is not a single
    /// ASCII character.
    pub fn delimiter_byte(&self) -> Result<u8, SourceError> {
        match self.delimiter.as_deref() {
            None | Some("") => Ok(b','),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => Err(SourceError::Config {
                message: format!("delimiter must be a single ASCII character, got {d:?}"),
            }),
        }
    }
}

/// Parses an accident table from raw CSV bytes.
///
/// Cell values are trimmed. Rows are kept even when the location is blank;
/// aggregation decides what to do with them.
///
/// # Errors
///
/// Returns [`SourceError`] if the CSV is malformed, the delimiter config is
/// invalid, or the location column is missing from the header row.
pub fn parse_accidents(
    bytes: &[u8],
    config: &AccidentTableConfig,
) -> Result<Vec<AccidentRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    let Some(index) = headers.iter().position(|h| *h == config.location_column) else {
        return Err(SourceError::MissingColumn {
            column: config.location_column.clone(),
            found: headers.join(", "),
        });
    };

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let location = record.get(index).unwrap_or("").trim().to_owned();
        records.push(AccidentRecord { location });
    }

    log::info!(
        "Parsed {} accident records (location column '{}')",
        records.len(),
        config.location_column
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AccidentTableConfig {
        AccidentTableConfig {
            location_column: "Lokasi".to_string(),
            delimiter: None,
        }
    }

    #[test]
    fn parses_location_column() {
        let csv = "No,Lokasi,Tanggal\n\
                   1,\"KEC. GUBENG, KOTA SURABAYA\",2024-01-01\n\
                   2, KEC. WONOKROMO, KOTA SURABAYA ,2024-01-02\n";
        let records = parse_accidents(csv.as_bytes(), &config()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location, "KEC. GUBENG, KOTA SURABAYA");
        // Unquoted commas split the cell; the location keeps its first part.
        assert_eq!(records[1].location, "KEC. WONOKROMO");
    }

    #[test]
    fn reports_missing_column() {
        let csv = "No,Lokasi2\n1,x\n";
        let err = parse_accidents(csv.as_bytes(), &config()).unwrap_err();
        match err {
            SourceError::MissingColumn { column, found } => {
                assert_eq!(column, "Lokasi");
                assert_eq!(found, "No, Lokasi2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn supports_custom_delimiter_and_bom() {
        let csv = "\u{feff}Lokasi;Jenis\nKEC. TANDES, KOTA SURABAYA;Tabrakan\n";
        let cfg = AccidentTableConfig {
            location_column: "Lokasi".to_string(),
            delimiter: Some(";".to_string()),
        };
        let records = parse_accidents(csv.as_bytes(), &cfg).unwrap();
        assert_eq!(records[0].location, "KEC. TANDES, KOTA SURABAYA");
    }

    #[test]
    fn rejects_multi_char_delimiter() {
        let cfg = AccidentTableConfig {
            location_column: "Lokasi".to_string(),
            delimiter: Some("::".to_string()),
        };
        assert!(matches!(
            cfg.delimiter_byte(),
            Err(SourceError::Config { .. })
        ));
    }

    #[test]
    fn keeps_rows_with_blank_location() {
        let csv = "Lokasi,No\n,1\nKEC. GUBENG, KOTA SURABAYA,2\n";
        let records = parse_accidents(csv.as_bytes(), &config()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].location.is_empty());
    }
}
