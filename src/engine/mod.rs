// ==========================================
// 价格目录导入系统 - 引擎层
// ==========================================
// 职责: 读路径业务规则（查询引擎 / 导出器）
// 红线: 引擎不直接拼 SQL, 存储访问经由 Repository
// ==========================================

pub mod export;
pub mod query;

pub use export::{CatalogExporter, ExportError};
pub use query::{CatalogPage, PageQuery, QueryEngine, QueryError, QueryResult};
