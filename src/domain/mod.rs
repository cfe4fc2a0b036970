// ==========================================
// 价格目录导入系统 - 领域层
// ==========================================
// 职责: 定义核心实体与导入中间产物
// 红线: 领域结构不携带数据访问逻辑
// ==========================================

pub mod catalog;

pub use catalog::{CatalogItem, ImportCandidate, ImportReport};
