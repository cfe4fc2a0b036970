// ==========================================
// 价格目录导入系统 - 导入侧 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{CatalogItem, ImportCandidate, ImportReport};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogImportRepository Trait
// ==========================================
// 用途: 导入管道的数据落地
// 实现者: CatalogImportRepositoryImpl（rusqlite）
#[async_trait]
pub trait CatalogImportRepository: Send + Sync {
    /// 以单个事务 upsert 一批候选记录
    ///
    /// 语义:
    /// - 不存在该 part_key → 创建（id 由数据库分配）
    /// - 已存在该 part_key → 原地覆盖可变字段（id/part_key/created_at 不动）
    /// - 原子性由存储层 `INSERT … ON CONFLICT(part_key) DO UPDATE` 保证，
    ///   不存在“先查后插”的竞态窗口
    ///
    /// # 返回
    /// - Ok(usize): 本批 upsert 的记录数
    /// - Err: 数据库错误（整个事务回滚，本批一行都不落地）
    async fn upsert_batch(&self, candidates: Vec<ImportCandidate>) -> RepositoryResult<usize>;

    /// 记录一次导入批次汇总（import_batch 表）
    async fn insert_import_report(&self, report: &ImportReport) -> RepositoryResult<()>;

    /// 按自然键查询单条记录
    async fn find_by_part_key(&self, part_key: &str) -> RepositoryResult<Option<CatalogItem>>;

    /// 全表记录数
    async fn count_all(&self) -> RepositoryResult<usize>;
}
