use cella_stats_rust::{create_pool, AppConfig, StatsLoader};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置 (缺失必填项在任何 I/O 之前失败)
    let config = AppConfig::from_env()?;
    info!("Starting loader with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    // 执行装载
    let loader = StatsLoader::new(pool, config);
    let persisted = loader.run().await?;
    info!("Done: {} record(s) upserted", persisted.len());

    Ok(())
}
