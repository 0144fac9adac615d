// ==========================================
// 灾害救援物流系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入/导出错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 解析失败 ({file}): {message}")]
    CsvParseError { file: String, message: String },

    #[error("CSV 写出失败: {0}")]
    CsvWriteError(String),

    #[error("JSON 写出失败: {0}")]
    JsonError(#[from] serde_json::Error),

    // ===== 数据映射错误 =====
    #[error("字段值错误 ({file} 行 {row}, 字段 {field}): {value}")]
    FieldValueError {
        file: String,
        row: usize,
        field: String,
        value: String,
    },

    // ===== 数据质量错误 =====
    #[error("数据集校验失败: {0}")]
    ValidationError(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
