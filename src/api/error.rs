// ==========================================
// 价格目录导入系统 - API 层错误类型
// ==========================================
// 职责: 汇聚各层错误为调用方可见的单一错误面
// 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::{ExportError, QueryError};
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
