// ==========================================
// 价格目录导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 注意: 空键行不是错误（RowParser 返回 Ok(None) 表示跳过）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Excel 解析失败: {0}")]
    WorkbookParse(String),

    #[error("Excel 文件无工作表")]
    EmptyWorkbook,

    // ===== 数值规整错误 =====
    // 行级致命错误: 使所在批次的提交不被执行（已提交批次保留）
    #[error("数值字段无法解析 (行 {row}, 字段 {field}): 原始值 \"{value}\"")]
    MalformedNumericValue {
        row: usize,
        field: &'static str,
        value: String,
    },

    // ===== 数据库错误 =====
    #[error("数据库事务失败: {0}")]
    DatabaseTransaction(String),

    // ===== 并发错误 =====
    #[error("行处理任务异常终止: {0}")]
    WorkerPanicked(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    Internal(String),
}

impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::DatabaseTransaction(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
