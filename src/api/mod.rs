// ==========================================
// 价格目录导入系统 - API 层
// ==========================================
// 职责: 对外业务接口（导入 / 查询 / 导出）
// ==========================================

pub mod catalog_api;
pub mod error;

pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult};
