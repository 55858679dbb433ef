use crate::error::LoadError;
use crate::ingest::columns;
use bigdecimal::{BigDecimal, Zero};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// 预报汇总结果.
///
/// 文件里有 Cella 列时按 Cella 求和; 没有时整个文件的合计落到 fallback,
/// 由 reconcile 作为缺省期望值分发.
#[derive(Debug, Default, Clone)]
pub struct ForecastTotals {
    pub by_cella: IndexMap<String, BigDecimal>,
    pub fallback: Option<BigDecimal>,
}

/// 读预报文件并汇总期望数量.
///
/// 分隔符从首行嗅探; 期望数量列按模糊名称定位; 数值转换失败的行丢弃.
/// 过滤后没有任何行时返回零值结果而不是报错.
pub fn compute_expected(
    path: &Path,
    cella: Option<&str>,
    cella_col: Option<&str>,
) -> Result<ForecastTotals, LoadError> {
    let input_err = |detail: String| LoadError::Input {
        path: path.to_path_buf(),
        detail,
    };

    let raw = fs::read_to_string(path).map_err(|e| input_err(e.to_string()))?;
    let delimiter = sniff_delimiter(&raw);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| input_err(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // 配置了 Cella 列但文件里没有 -> 按无列处理, 走全局汇总
    let cella_idx = cella_col.and_then(|name| headers.iter().position(|h| h == name));

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|e| input_err(e.to_string()))?);
    }
    if let (Some(idx), Some(filter)) = (cella_idx, cella) {
        records.retain(|r| r.get(idx).map(str::trim) == Some(filter));
    }
    if records.is_empty() {
        return Ok(ForecastTotals::default());
    }

    let expected_idx = columns::find_expected_column(&headers, path)?;

    let mut totals = ForecastTotals::default();
    let mut global = BigDecimal::zero();
    for record in &records {
        let Some(value) = record.get(expected_idx).and_then(parse_decimal) else {
            continue;
        };
        match cella_idx {
            Some(idx) => {
                let Some(unit) = record.get(idx).map(str::trim).filter(|s| !s.is_empty()) else {
                    continue;
                };
                let entry = totals
                    .by_cella
                    .entry(unit.to_string())
                    .or_insert_with(BigDecimal::zero);
                *entry = &*entry + &value;
            }
            None => global = &global + &value,
        }
    }

    if cella_idx.is_none() {
        match cella {
            // 无列但请求了单 Cella: 合计归到该 Cella 名下
            Some(unit) => {
                totals.by_cella.insert(unit.to_string(), global);
            }
            None => totals.fallback = Some(global),
        }
    }
    Ok(totals)
}

/// 从首行嗅探分隔符, 取出现次数最多的候选.
///
/// 平局时靠前的候选优先 (分号排在逗号前, 列名里夹逗号的情况常见);
/// 一个都没出现时退回逗号.
fn sniff_delimiter(sample: &str) -> u8 {
    let first_line = sample.lines().next().unwrap_or("");
    let mut best = b',';
    let mut best_count = 0;
    for candidate in [b';', b',', b'\t', b'|'] {
        let count = first_line.matches(candidate as char).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// 宽松数值转换: 去空白后按十进制解析, 失败返回 None
fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok()
}
