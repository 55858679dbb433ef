use std::path::PathBuf;
use thiserror::Error;

/// 装载流程错误分类
#[derive(Debug, Error)]
pub enum LoadError {
    /// 缺失或非法配置, 在任何 I/O 之前失败
    #[error("configuration error: {0}")]
    Config(String),

    /// 输入文件缺失或不可读
    #[error("failed to read input {path}: {detail}")]
    Input { path: PathBuf, detail: String },

    /// 声明的列在文件中不存在
    #[error("column '{column}' not found in {path}")]
    ColumnNotFound { column: String, path: PathBuf },

    /// 显式 STATS_DATE 覆盖值无法解析
    #[error("invalid date '{0}'")]
    DateParse(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}
