// ==========================================
// 价格目录导入系统 - 目录 API
// ==========================================
// 职责: 对外统一入口（导入 / 分页查询 / 导出）
// 外层(HTTP 控制器等)只依赖本层契约, 不触碰管道与引擎细节
// ==========================================

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfig;
use crate::domain::ImportReport;
use crate::engine::{CatalogExporter, CatalogPage, PageQuery, QueryEngine};
use crate::importer::ImportPipeline;
use crate::repository::{CatalogImportRepositoryImpl, CatalogQueryRepository};

// ==========================================
// CatalogApi - 目录 API
// ==========================================

/// 目录 API
///
/// 职责：
/// 1. 整簿导入（并发行处理 + 分批事务提交）
/// 2. 分页/搜索/排序查询
/// 3. 过滤导出（与查询同一过滤语义）
pub struct CatalogApi {
    pipeline: ImportPipeline<CatalogImportRepositoryImpl>,
    query_engine: QueryEngine,
}

impl CatalogApi {
    /// 基于共享连接创建 API 实例
    ///
    /// # 参数
    /// - conn: 已初始化 schema 的 SQLite 连接
    /// - config: 导入配置
    pub fn new(conn: Arc<Mutex<Connection>>, config: ImportConfig) -> Self {
        let import_repo = Arc::new(CatalogImportRepositoryImpl::new(Arc::clone(&conn)));
        let query_repo = Arc::new(CatalogQueryRepository::new(conn));

        Self {
            pipeline: ImportPipeline::new(import_repo, config),
            query_engine: QueryEngine::new(query_repo),
        }
    }

    // ==========================================
    // 导入接口
    // ==========================================

    /// 从 xlsx 文档字节流导入
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入汇总
    /// - Err(ApiError::Import): 首个行级/文档级错误（已提交批次保留）
    pub async fn import_from_document(&self, document_bytes: &[u8]) -> ApiResult<ImportReport> {
        if document_bytes.is_empty() {
            return Err(ApiError::InvalidInput("文档字节流为空".to_string()));
        }
        Ok(self.pipeline.import_from_bytes(document_bytes).await?)
    }

    /// 携带取消信号的导入（行粒度协作式取消）
    pub async fn import_with_cancel(
        &self,
        document_bytes: &[u8],
        cancel: Arc<AtomicBool>,
    ) -> ApiResult<ImportReport> {
        if document_bytes.is_empty() {
            return Err(ApiError::InvalidInput("文档字节流为空".to_string()));
        }
        Ok(self.pipeline.import_with_cancel(document_bytes, cancel).await?)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 分页查询目录条目
    ///
    /// # 参数
    /// - page: 1 基页号
    /// - page_size: 页大小
    /// - search: 可选搜索词（全字段大小写不敏感子串匹配）
    /// - sort_column: 可选排序列名（白名单, 未知列报错）
    /// - sort_descending: 降序标记
    ///
    /// # 返回
    /// - Ok(CatalogPage): 本页条目 + 过滤后总数
    pub fn list_page(
        &self,
        page: usize,
        page_size: usize,
        search: Option<String>,
        sort_column: Option<String>,
        sort_descending: bool,
    ) -> ApiResult<CatalogPage> {
        let query = PageQuery {
            page,
            page_size,
            search,
            sort_column,
            sort_descending,
        };
        Ok(self.query_engine.list_page(&query)?)
    }

    // ==========================================
    // 导出接口
    // ==========================================

    /// 导出过滤后的全量目录为 xlsx 字节流
    ///
    /// 过滤语义与 list_page 完全一致; 无分页
    pub fn export_to_document(&self, search: Option<&str>) -> ApiResult<Vec<u8>> {
        let items = self.query_engine.filtered_items(search)?;
        let bytes = CatalogExporter::to_document(&items)?;
        info!(items = items.len(), size_bytes = bytes.len(), "目录导出完成");
        Ok(bytes)
    }
}
