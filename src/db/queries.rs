use crate::models::{PersistedStats, StatsRecord};
use sqlx::PgPool;

/// 引用 SQL 标识符; schema/table 名来自配置, 可能带连字符或大小写
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// 幂等建 schema 与目标表
pub async fn ensure_target_table(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .execute(pool)
        .await?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            run_ts TIMESTAMPTZ NOT NULL DEFAULT now(),
            stats_date DATE NOT NULL,
            cella TEXT NOT NULL,
            partial_count INT NOT NULL,
            full_count INT NOT NULL,
            expected NUMERIC(18,2) NOT NULL,
            UNIQUE (cella, stats_date)
        )
        "#,
        qualified_table(schema, table)
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// 按 (cella, stats_date) upsert 一条统计记录.
///
/// 冲突时三个指标连同 run_ts 一起刷新, run_ts 始终反映最近一次成功运行.
pub async fn upsert_stats(
    pool: &PgPool,
    schema: &str,
    table: &str,
    record: &StatsRecord,
) -> Result<PersistedStats, sqlx::Error> {
    sqlx::query_as::<_, PersistedStats>(&format!(
        r#"
        INSERT INTO {} (stats_date, cella, partial_count, full_count, expected)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (cella, stats_date) DO UPDATE
        SET partial_count = EXCLUDED.partial_count,
            full_count = EXCLUDED.full_count,
            expected = EXCLUDED.expected,
            run_ts = now()
        RETURNING id, run_ts
        "#,
        qualified_table(schema, table)
    ))
    .bind(record.stats_date)
    .bind(&record.cella)
    .bind(record.partial_count)
    .bind(record.full_count)
    .bind(record.expected.clone())
    .fetch_one(pool)
    .await
}
