// Records hold the rows read from the input csv
use anyhow::Context;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// One input row. Only the first field, the ip address, is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub ip: String,
}

pub fn open_input(path: &Path) -> anyhow::Result<File> {
    File::open(path).context("Error opening file")
}

/// Parse every row eagerly. A row with an empty first field is skipped with a
/// warning; a row whose field count differs from the first row fails the whole read.
pub fn read_records<R: Read>(rdr: R) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(rdr);

    let mut records = Vec::new();
    for (n, row) in reader.records().enumerate() {
        let row = row.context("Error reading CSV")?;
        match row.get(0) {
            Some(ip) if !ip.is_empty() => records.push(Record { ip: ip.to_string() }),
            _ => warn!("skipping row {}: no ip address in first field", n + 1),
        }
    }
    debug!("read {} records", records.len());
    Ok(records)
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let file = open_input(path)?;
    read_records(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ips(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.ip.as_str()).collect()
    }

    #[test]
    fn first_field_in_input_order() {
        let records = read_records("8.8.8.8,google\n1.1.1.1,cloudflare\n".as_bytes()).unwrap();
        assert_eq!(ips(&records), vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn first_row_is_not_a_header() {
        let records = read_records("ip\n10.0.0.1\n".as_bytes()).unwrap();
        assert_eq!(ips(&records), vec!["ip", "10.0.0.1"]);
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(read_records("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn rows_without_address_are_skipped() {
        let records = read_records("8.8.8.8,a\n,b\n1.1.1.1,c\n".as_bytes()).unwrap();
        assert_eq!(ips(&records), vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn unequal_rows_fail() {
        let err = read_records("8.8.8.8,a\n1.1.1.1\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").starts_with("Error reading CSV"));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "192.0.2.1\n192.0.2.2\n192.0.2.3\n").unwrap();
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].ip, "192.0.2.3");
    }

    #[test]
    fn missing_file() {
        let err = load_records(Path::new("/nonexistent/ips.csv")).unwrap_err();
        assert!(format!("{err:#}").starts_with("Error opening file: "));
    }
}
