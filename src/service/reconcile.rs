use crate::ingest::forecast::ForecastTotals;
use crate::models::StatsRecord;
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// 合并三路部分结果, 每个 Cella 产出一条记录.
///
/// 目标 Cella 集合: 配置了单 Cella 过滤时就是它本身, 否则取三路键的并集.
/// 缺失的计数补 0; 缺失的期望值先落预报的全局值, 再落 0.
/// 输出按 Cella 名称排序, 保证运行顺序可复现.
pub fn reconcile(
    stats_date: NaiveDate,
    cella_filter: Option<&str>,
    partial: &IndexMap<String, i32>,
    full: &IndexMap<String, i32>,
    forecast: &ForecastTotals,
) -> Vec<StatsRecord> {
    let units: BTreeSet<String> = match cella_filter {
        Some(unit) => BTreeSet::from([unit.to_string()]),
        None => partial
            .keys()
            .chain(full.keys())
            .chain(forecast.by_cella.keys())
            .cloned()
            .collect(),
    };

    units
        .into_iter()
        .map(|cella| {
            let expected = forecast
                .by_cella
                .get(&cella)
                .cloned()
                .or_else(|| forecast.fallback.clone())
                .unwrap_or_else(BigDecimal::zero);
            StatsRecord {
                stats_date,
                partial_count: partial.get(&cella).copied().unwrap_or(0),
                full_count: full.get(&cella).copied().unwrap_or(0),
                expected,
                cella,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn counts(pairs: &[(&str, i32)]) -> IndexMap<String, i32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn worked_example_a1_b2() {
        let partial = counts(&[("A1", 3)]);
        let full = counts(&[("A1", 5), ("B2", 2)]);
        let mut forecast = ForecastTotals::default();
        forecast.by_cella.insert("A1".to_string(), dec("10"));

        let records = reconcile(date(), None, &partial, &full, &forecast);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].cella, "A1");
        assert_eq!(records[0].partial_count, 3);
        assert_eq!(records[0].full_count, 5);
        assert_eq!(records[0].expected, dec("10"));

        assert_eq!(records[1].cella, "B2");
        assert_eq!(records[1].partial_count, 0);
        assert_eq!(records[1].full_count, 2);
        assert_eq!(records[1].expected, dec("0"));
    }

    #[test]
    fn output_covers_union_of_all_sources() {
        let partial = counts(&[("C3", 1)]);
        let full = counts(&[("A1", 1)]);
        let mut forecast = ForecastTotals::default();
        forecast.by_cella.insert("B2".to_string(), dec("2"));

        let records = reconcile(date(), None, &partial, &full, &forecast);
        let units: Vec<&str> = records.iter().map(|r| r.cella.as_str()).collect();
        assert_eq!(units, vec!["A1", "B2", "C3"]);
    }

    #[test]
    fn output_is_sorted_regardless_of_input_order() {
        let partial = counts(&[("Z9", 1), ("A1", 1), ("M5", 1)]);
        let records = reconcile(date(), None, &partial, &counts(&[]), &ForecastTotals::default());
        let units: Vec<&str> = records.iter().map(|r| r.cella.as_str()).collect();
        assert_eq!(units, vec!["A1", "M5", "Z9"]);
    }

    #[test]
    fn global_fallback_fills_missing_expected() {
        let full = counts(&[("A1", 4), ("B2", 1)]);
        let forecast = ForecastTotals {
            by_cella: IndexMap::new(),
            fallback: Some(dec("7.5")),
        };
        let records = reconcile(date(), None, &counts(&[]), &full, &forecast);
        assert!(records.iter().all(|r| r.expected == dec("7.5")));
    }

    #[test]
    fn filter_emits_exactly_one_record_even_if_unseen() {
        let records = reconcile(
            date(),
            Some("A1"),
            &counts(&[]),
            &counts(&[]),
            &ForecastTotals::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cella, "A1");
        assert_eq!(records[0].partial_count, 0);
        assert_eq!(records[0].full_count, 0);
        assert_eq!(records[0].expected, dec("0"));
    }

    #[test]
    fn empty_sources_yield_no_records_without_filter() {
        let records = reconcile(
            date(),
            None,
            &counts(&[]),
            &counts(&[]),
            &ForecastTotals::default(),
        );
        assert!(records.is_empty());
    }
}
