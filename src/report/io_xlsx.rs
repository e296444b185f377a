use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use crate::report::io_common::{RawRecord, RawTable};
use crate::report::*;

pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> ReportResult<RawTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu {
        path,
        reason: "the worksheet is empty",
    })?;
    let headers: Vec<String> = header.iter().map(|c| cell_to_string(c).trim().to_string()).collect();
    debug!("read_xlsx_table: header: {:?}", headers);

    let mut res = RawTable {
        headers,
        ..RawTable::default()
    };
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 1;
        // Excel ranges often end with blank lines.
        if row.iter().all(|c| *c == DataType::Empty) {
            debug!("read_xlsx_table: blank row {}", lineno);
            continue;
        }
        let cells: Vec<String> = row.iter().map(|c| cell_to_string(c).trim().to_string()).collect();
        debug!("read_xlsx_table: lineno: {:?} row: {:?}", lineno, &cells);
        res.records.push(RawRecord { lineno, cells });
    }
    Ok(res)
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> ReportResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu {
                path,
                reason: format!("no worksheet named {:?}", name),
            })?
            .context(OpeningExcelSnafu { path }),
        None => {
            let sheets = workbook.worksheets();
            debug!(
                "get_range: worksheets: {:?}",
                sheets.iter().map(|(n, _)| n).collect::<Vec<_>>()
            );
            let (_, range) = sheets.into_iter().next().context(EmptyExcelSnafu {
                path,
                reason: "the workbook has no worksheet",
            })?;
            Ok(range)
        }
    }
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => format_number(*f),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => excel_date_to_string(*f),
        DataType::Empty => String::new(),
        x => {
            warn!("Unreadable cell {:?}, treated as blank", x);
            String::new()
        }
    }
}

// Ratings come out of Excel as floats.
fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

// Excel stores dates as days since 1899-12-30. Out of range dates are blank.
fn excel_date_to_string(days: f64) -> String {
    let millis = days * 86_400_000.0;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        warn!("Excel date out of range: {}", days);
        return String::new();
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|epoch| {
            epoch.checked_add_signed(Duration::milliseconds(millis.round() as i64))
        })
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_read_as_text() {
        assert_eq!(cell_to_string(&DataType::Float(4.0)), "4");
        assert_eq!(cell_to_string(&DataType::Float(4.5)), "4.5");
        assert_eq!(cell_to_string(&DataType::Int(3)), "3");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(
            cell_to_string(&DataType::String("Kenya".to_string())),
            "Kenya"
        );
    }

    #[test]
    fn excel_dates() {
        // 2024-03-01 is day 45352.
        assert_eq!(excel_date_to_string(45352.0), "2024-03-01 00:00:00");
        assert_eq!(excel_date_to_string(45352.5), "2024-03-01 12:00:00");
        assert_eq!(
            cell_to_string(&DataType::DateTime(45352.25)),
            "2024-03-01 06:00:00"
        );
    }

    #[test]
    fn out_of_range_dates_are_blank() {
        assert_eq!(excel_date_to_string(1e10), "");
        assert_eq!(excel_date_to_string(1e15), "");
        assert_eq!(excel_date_to_string(-1e15), "");
        assert_eq!(excel_date_to_string(f64::INFINITY), "");
        assert_eq!(excel_date_to_string(f64::NAN), "");
        assert_eq!(cell_to_string(&DataType::DateTime(1e300)), "");
    }

    #[test]
    fn missing_workbook() {
        assert!(matches!(
            read_xlsx_table("/nonexistent/survey.xlsx", None),
            Err(ReportError::OpeningExcel { .. })
        ));
    }
}
