use crate::config::AppConfig;
use crate::db::queries;
use crate::error::LoadError;
use crate::ingest::{dates, extract, forecast};
use crate::models::PersistedStats;
use crate::service::reconcile::reconcile;
use sqlx::PgPool;
use tracing::info;

/// 统计装载服务: 一次调用完成取数、汇总、入库
pub struct StatsLoader {
    pool: PgPool,
    config: AppConfig,
}

impl StatsLoader {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config }
    }

    /// 全流程: 统计日期 -> 两个提取文件计数 -> 预报汇总 -> 合并 -> 逐 Cella upsert.
    ///
    /// upsert 逐条提交, 中途失败不回滚已写入的 Cella; 整次重跑是收敛的.
    pub async fn run(&self) -> Result<Vec<PersistedStats>, LoadError> {
        let cfg = &self.config;
        let stats_date =
            dates::determine_stats_date(cfg.stats_date.as_deref(), Some(cfg.tz.as_str()))?;
        info!("Stats date: {}", stats_date);

        let cella = cfg.cella.as_deref();
        let partial_path = cfg.files.resolve(&cfg.files.partial);
        let full_path = cfg.files.resolve(&cfg.files.full);
        let forecast_path = cfg.files.resolve(&cfg.files.forecast);

        let partial = extract::count_extract_rows(
            &partial_path,
            &cfg.columns.date_col,
            &cfg.columns.cella_col,
            stats_date,
            cella,
        )?;
        info!(
            "Partial extract {}: {} Cella(s), {} row(s)",
            partial_path.display(),
            partial.len(),
            partial.values().sum::<i32>()
        );

        let full = extract::count_extract_rows(
            &full_path,
            &cfg.columns.date_col,
            &cfg.columns.cella_col,
            stats_date,
            cella,
        )?;
        info!(
            "Full extract {}: {} Cella(s), {} row(s)",
            full_path.display(),
            full.len(),
            full.values().sum::<i32>()
        );

        let totals = forecast::compute_expected(
            &forecast_path,
            cella,
            cfg.columns.csv_cella_col.as_deref(),
        )?;
        info!(
            "Forecast {}: {} Cella(s), fallback={:?}",
            forecast_path.display(),
            totals.by_cella.len(),
            totals.fallback
        );

        let records = reconcile(stats_date, cella, &partial, &full, &totals);
        if records.is_empty() {
            info!("No Cella seen in any source for {}, nothing to persist", stats_date);
            return Ok(Vec::new());
        }

        queries::ensure_target_table(&self.pool, &cfg.schema, &cfg.table).await?;

        let mut persisted = Vec::with_capacity(records.len());
        for record in &records {
            info!(
                "Computed metrics for {}: partial={} full={} expected={}",
                record.cella, record.partial_count, record.full_count, record.expected
            );
            let row = queries::upsert_stats(&self.pool, &cfg.schema, &cfg.table, record).await?;
            info!("DB record: id={} run_ts={}", row.id, row.run_ts);
            persisted.push(row);
        }
        Ok(persisted)
    }
}
