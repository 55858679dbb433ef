use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 单 Cella 过滤; 不设置则处理所有出现过的 Cella
    pub cella: Option<String>,
    /// 显式统计日期覆盖 (原样保存, 解析在 ingest::dates 中做)
    pub stats_date: Option<String>,
    pub tz: String,
    pub files: FileConfig,
    pub columns: ColumnConfig,
    pub database: DatabaseConfig,
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// 相对路径的基准目录
    pub base_dir: Option<PathBuf>,
    pub partial: PathBuf,
    pub full: PathBuf,
    pub forecast: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub date_col: String,
    pub cella_col: String,
    /// 预报文件中的 Cella 列; 不设置则预报按全局汇总
    pub csv_cella_col: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

// 日志里不输出口令
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl FileConfig {
    /// 相对路径挂到 base_dir 下, 绝对路径原样返回
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, LoadError> {
        let port = match var("PGPORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| LoadError::Config(format!("PGPORT '{raw}' is not a valid port")))?,
            None => 5432,
        };
        // 口令必须显式给出 (允许显式的空口令), 不提供默认值
        let password = env::var("PGPASSWORD")
            .map_err(|_| LoadError::Config("PGPASSWORD must be set".to_string()))?;

        Ok(Self {
            cella: var("CELLA"),
            stats_date: var("STATS_DATE"),
            tz: var("TZ").unwrap_or_else(|| "Europe/Moscow".to_string()),
            files: FileConfig {
                base_dir: var("BASE_DIR").map(PathBuf::from),
                partial: var("PARTIAL_XLS")
                    .unwrap_or_else(|| "Частично.xls".to_string())
                    .into(),
                full: var("FULL_XLS")
                    .unwrap_or_else(|| "Целиком.xls".to_string())
                    .into(),
                forecast: var("FORECAST_CSV")
                    .unwrap_or_else(|| "Почасовой прогноз прихода заказов на склад.csv".to_string())
                    .into(),
            },
            columns: ColumnConfig {
                date_col: var("DATE_COL").unwrap_or_else(|| "Плановая дата поставки".to_string()),
                cella_col: var("CELLA_COL").unwrap_or_else(|| "Cella".to_string()),
                csv_cella_col: var("CSV_CELLA_COL"),
            },
            database: DatabaseConfig {
                host: var("PGHOST").unwrap_or_else(|| "localhost".to_string()),
                port,
                dbname: var("PGDATABASE").unwrap_or_else(|| "postgres".to_string()),
                user: var("PGUSER").unwrap_or_else(|| "postgres".to_string()),
                password,
            },
            schema: var("SCHEMA").unwrap_or_else(|| "REPORT".to_string()),
            table: var("TABLE").unwrap_or_else(|| "execution-of-orders".to_string()),
        })
    }
}
