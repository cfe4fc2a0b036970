// ==========================================
// 价格目录导入系统 - 导入层
// ==========================================
// 职责: 外部 xlsx 数据导入, 生成/更新目录条目
// 流程: 工作簿解析 → 行解析 → 数值规整 → 分批 upsert 提交
// ==========================================

// 模块声明
pub mod error;
pub mod numeric;
pub mod pipeline;
pub mod row_parser;
pub mod workbook_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use numeric::NumericNormalizer;
pub use pipeline::ImportPipeline;
pub use row_parser::RowParser;
pub use workbook_parser::{ParsedSheet, SheetRow, WorkbookParser};
