use crate::error::LoadError;
use crate::ingest::dates::parse_date_flexible;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::path::Path;

/// 读取提取文件首个工作表, 按 Cella 统计指定日期的行数.
///
/// 可选的 cella 过滤在日期过滤之前生效; 日期列解析失败的行按"无日期"丢弃.
pub fn count_extract_rows(
    path: &Path,
    date_col: &str,
    cella_col: &str,
    stats_date: NaiveDate,
    cella: Option<&str>,
) -> Result<IndexMap<String, i32>, LoadError> {
    let input_err = |detail: String| LoadError::Input {
        path: path.to_path_buf(),
        detail,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| input_err(e.to_string()))?;
    let sheet_names = workbook.sheet_names();
    let first_sheet = sheet_names
        .first()
        .ok_or_else(|| input_err("workbook has no sheets".to_string()))?
        .clone();
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| input_err(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| input_err("sheet has no header row".to_string()))?
        .iter()
        .map(header_string)
        .collect();

    tally_rows(&headers, rows, date_col, cella_col, stats_date, cella, path)
}

/// 表头单元格转列名
fn header_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// 单元格转 Cella 标识; 空单元格视为缺失
fn cell_string(cell: &Data) -> Option<String> {
    if matches!(cell, Data::Empty) {
        return None;
    }
    let s = cell.to_string();
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 单元格转日期: Excel 序列日期直接换算, 文本按日在前约定解析
fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|ndt| ndt.date()),
        Data::String(s) => parse_date_flexible(s),
        Data::DateTimeIso(s) => parse_date_flexible(s),
        _ => None,
    }
}

fn tally_rows<'a>(
    headers: &[String],
    rows: impl Iterator<Item = &'a [Data]>,
    date_col: &str,
    cella_col: &str,
    stats_date: NaiveDate,
    cella: Option<&str>,
    path: &Path,
) -> Result<IndexMap<String, i32>, LoadError> {
    let column_err = |column: &str| LoadError::ColumnNotFound {
        column: column.to_string(),
        path: path.to_path_buf(),
    };
    let date_idx = headers
        .iter()
        .position(|h| h == date_col)
        .ok_or_else(|| column_err(date_col))?;
    let cella_idx = headers
        .iter()
        .position(|h| h == cella_col)
        .ok_or_else(|| column_err(cella_col))?;

    let mut counts: IndexMap<String, i32> = IndexMap::new();
    for row in rows {
        let Some(unit) = row.get(cella_idx).and_then(cell_string) else {
            continue;
        };
        if let Some(filter) = cella {
            if unit != filter {
                continue;
            }
        }
        let Some(row_date) = row.get(date_idx).and_then(cell_date) else {
            continue;
        };
        if row_date != stats_date {
            continue;
        }
        *counts.entry(unit).or_insert(0) += 1;
    }
    Ok(counts)
}
