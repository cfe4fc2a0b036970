// ==========================================
// 价格目录导入系统 - 目录领域模型
// ==========================================
// 对齐: db.rs catalog_item / import_batch 表
// 价格字段统一使用 rust_decimal::Decimal（定点小数）
// ==========================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// CatalogItem - 目录条目（持久化实体）
// ==========================================
// 生命周期: 首次出现 part_key 时创建，之后仅更新，永不删除
// 用途: 导入层写入，查询引擎只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    // ===== 代理主键（数据库分配，创建后不变）=====
    pub id: i64,

    // ===== 文本属性（每次重导入均可被覆盖）=====
    pub band: String,            // 产品线
    pub category_code: String,   // 类目代码
    pub manufacturer: String,    // 厂商
    pub item_description: String, // 条目描述

    // ===== 自然键（全表唯一，一经写入不变）=====
    pub part_key: String,

    // ===== 价格字段（定点小数，重导入可覆盖）=====
    pub list_price: Decimal,     // 目录价
    pub min_discount: Decimal,   // 最低折扣
    pub discount_price: Decimal, // 折后价

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 首次创建时间（更新路径不触碰）
    pub updated_at: DateTime<Utc>, // 最后一次写入时间
}

// ==========================================
// ImportCandidate - 导入中间结构体
// ==========================================
// 用途: 行解析产物（RowParser 产出 → upsert 批消费后丢弃）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportCandidate {
    pub band: String,
    pub category_code: String,
    pub manufacturer: String,
    pub part_key: String,
    pub item_description: String,
    pub list_price: Decimal,
    pub min_discount: Decimal,
    pub discount_price: Decimal,

    /// 源文件中的 1 基行号（诊断用，不落库）
    pub row_number: usize,
}

// ==========================================
// ImportReport - 单次导入的结果汇总
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,

    /// 扫描到的数据行总数（含空键跳过行）
    pub total_rows: usize,

    /// 成功 upsert 的行数
    pub imported_rows: usize,

    /// 因 part_key 为空而跳过的行数
    pub skipped_rows: usize,

    /// 实际处理的 sheet 数（上限 3）
    pub sheets_processed: usize,

    /// 是否被协作式取消（已提交批次不受影响）
    pub cancelled: bool,

    /// 导入耗时
    #[serde(skip)]
    pub elapsed: Duration,

    pub imported_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn new(batch_id: String) -> Self {
        Self {
            batch_id,
            total_rows: 0,
            imported_rows: 0,
            skipped_rows: 0,
            sheets_processed: 0,
            cancelled: false,
            elapsed: Duration::ZERO,
            imported_at: Utc::now(),
        }
    }
}
