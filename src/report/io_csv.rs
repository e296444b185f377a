// Primitives for reading CSV files.

use crate::report::io_common::{RawRecord, RawTable};
use crate::report::*;

pub fn read_csv_table(path: &str) -> ReportResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let headers: Vec<String> = rdr
        .headers()
        .context(CsvHeaderSnafu { path })?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    debug!("read_csv_table: headers: {:?}", headers);
    if headers.iter().all(|h| h.is_empty()) {
        whatever!("{}: no header row", path);
    }

    let mut res = RawTable {
        headers,
        ..RawTable::default()
    };
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 1;
        let line = match line_r {
            Ok(line) => line,
            // Reading is not going to make progress after an IO error.
            Err(e) if e.is_io_error() => return Err(e).context(CsvOpenSnafu { path }),
            Err(e) => {
                warn!("{}: skipping row {}: {}", path, lineno, e);
                res.skipped_rows += 1;
                continue;
            }
        };
        if line.len() != res.headers.len() {
            warn!(
                "{}: skipping row {}: {} cells, expected {}",
                path,
                lineno,
                line.len(),
                res.headers.len()
            );
            res.skipped_rows += 1;
            continue;
        }
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, &line);
        res.records.push(RawRecord {
            lineno,
            cells: line.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    fn read(f: &tempfile::NamedTempFile) -> ReportResult<RawTable> {
        read_csv_table(f.path().to_str().unwrap())
    }

    #[test]
    fn quoted_multiline_cells() {
        let f = write_csv(b" Country , Feedback\nKenya ,\"Great\n\nToo slow\"\n  Ghana,ok\n");
        let t = read(&f).unwrap();
        assert_eq!(t.headers, vec!["Country".to_string(), "Feedback".to_string()]);
        assert_eq!(t.skipped_rows, 0);
        assert_eq!(
            t.records,
            vec![
                RawRecord {
                    lineno: 1,
                    cells: vec!["Kenya".to_string(), "Great\n\nToo slow".to_string()]
                },
                RawRecord {
                    lineno: 2,
                    cells: vec!["Ghana".to_string(), "ok".to_string()]
                },
            ]
        );
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let f = write_csv(b"a,b,c\n1,2,3\n4,5\n6,7,8,9\n\xff\xfe,x,y\n10,11,12\n");
        let t = read(&f).unwrap();
        assert_eq!(t.records.len(), 2);
        assert_eq!(t.records[1].cells[0], "10");
        assert_eq!(t.skipped_rows, 3);
    }

    #[test]
    fn empty_file_has_no_header() {
        let f = write_csv(b"");
        assert!(read(&f).is_err());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_table("/nonexistent/survey.csv"),
            Err(ReportError::CsvOpen { .. })
        ));
    }
}
