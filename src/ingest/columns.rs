use crate::error::LoadError;
use std::path::Path;

/// 预报文件中"期望数量"列的标准名与词干
pub const EXPECTED_COL: &str = "Ожидается";
pub const EXPECTED_STEM: &str = "ожид";

/// 规范化列名: 小写、ё→е、去空白
pub fn normalize_colname(name: &str) -> String {
    name.to_lowercase()
        .replace('ё', "е")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// 在列名序列中定位语义列.
///
/// 先按规范化后的全名精确匹配, 找不到再按词干子串匹配;
/// 两轮都取第一个命中 (结果由列序决定).
pub fn resolve_column(columns: &[String], target: &str, stem: &str) -> Option<usize> {
    let want = normalize_colname(target);
    if let Some(idx) = columns.iter().position(|c| normalize_colname(c) == want) {
        return Some(idx);
    }
    let stem = normalize_colname(stem);
    columns
        .iter()
        .position(|c| normalize_colname(c).contains(&stem))
}

/// 定位预报文件的期望数量列, 找不到即为致命错误
pub fn find_expected_column(columns: &[String], path: &Path) -> Result<usize, LoadError> {
    resolve_column(columns, EXPECTED_COL, EXPECTED_STEM).ok_or_else(|| {
        LoadError::ColumnNotFound {
            column: EXPECTED_COL.to_string(),
            path: path.to_path_buf(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_lowercases_and_strips_spaces() {
        assert_eq!(normalize_colname("  Ожидается  "), "ожидается");
        assert_eq!(normalize_colname("ОЖИДАЕТСЯ"), "ожидается");
        assert_eq!(normalize_colname("Ожид ается"), "ожидается");
    }

    #[test]
    fn normalize_collapses_yo() {
        assert_eq!(normalize_colname("ОжидаЁтся"), "ожидается");
    }

    #[test]
    fn case_and_spacing_variants_resolve_to_same_column() {
        for variant in ["Ожидается", "ОЖИДАЕТСЯ", " ожидается ", "Ожид ается"] {
            let columns = cols(&["Время", variant, "Комментарий"]);
            assert_eq!(resolve_column(&columns, EXPECTED_COL, EXPECTED_STEM), Some(1));
        }
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        // "Ожидаемое" 只命中词干, 排在前也不应胜过精确命中
        let columns = cols(&["Ожидаемое кол-во", "Ожидается"]);
        assert_eq!(resolve_column(&columns, EXPECTED_COL, EXPECTED_STEM), Some(1));
    }

    #[test]
    fn substring_fallback_takes_first_match() {
        let columns = cols(&["Время", "Ожидается, шт", "Ожидаемое"]);
        assert_eq!(resolve_column(&columns, EXPECTED_COL, EXPECTED_STEM), Some(1));
    }

    #[test]
    fn missing_column_is_an_error() {
        let columns = cols(&["Время", "Приход"]);
        let err = find_expected_column(&columns, Path::new("forecast.csv")).unwrap_err();
        assert!(matches!(err, LoadError::ColumnNotFound { .. }));
    }
}
