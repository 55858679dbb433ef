use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 每 Cella 每日统计事实 (唯一键: cella + stats_date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRecord {
    pub stats_date: NaiveDate,
    pub cella: String,
    pub partial_count: i32,
    pub full_count: i32,
    pub expected: BigDecimal,
}

/// upsert 返回的行标识, 用于运维日志确认
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PersistedStats {
    pub id: i64,
    pub run_ts: DateTime<Utc>,
}
