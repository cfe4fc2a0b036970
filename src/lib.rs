// ==========================================
// 价格目录导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 职责: 批量价格目录导入(并发行处理 + 分批事务提交)
//       与分页/搜索/排序查询、对称导出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 读路径规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{CatalogItem, ImportCandidate, ImportReport};

// 导入管道
pub use importer::{ImportError, ImportPipeline, NumericNormalizer, RowParser, WorkbookParser};

// 引擎
pub use engine::{CatalogExporter, CatalogPage, PageQuery, QueryEngine};

// 仓储
pub use repository::{
    CatalogImportRepository, CatalogImportRepositoryImpl, CatalogQueryRepository, SortColumn,
};

// API
pub use api::CatalogApi;

// 配置
pub use config::ImportConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "价格目录导入系统";
