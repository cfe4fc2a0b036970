// ==========================================
// 价格目录导入系统 - 查询侧 Repository
// ==========================================
// 职责: 过滤/排序/分页的只读数据访问（查询引擎的存储执行端）
// 约束: 所有查询参数化; 排序列只接受白名单枚举, 不拼接外部输入
// ==========================================

use crate::domain::CatalogItem;
use crate::repository::catalog_repo_impl::{CatalogImportRepositoryImpl, ITEM_COLUMNS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SortColumn - 排序列白名单
// ==========================================
// 动态"按名排序"不做运行时反射: 未知列名在进入存储层之前就被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Band,
    CategoryCode,
    Manufacturer,
    PartKey,
    ItemDescription,
    ListPrice,
    MinDiscount,
    DiscountPrice,
}

impl SortColumn {
    /// 按名称解析排序列（容忍 snake_case / camelCase / PascalCase）
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "band" => Some(Self::Band),
            "categorycode" => Some(Self::CategoryCode),
            "manufacturer" => Some(Self::Manufacturer),
            "partkey" => Some(Self::PartKey),
            "itemdescription" => Some(Self::ItemDescription),
            "listprice" => Some(Self::ListPrice),
            "mindiscount" => Some(Self::MinDiscount),
            "discountprice" => Some(Self::DiscountPrice),
            _ => None,
        }
    }

    /// ORDER BY 表达式（价格列按数值比较，存储本身是小数文本）
    fn order_expr(&self) -> &'static str {
        match self {
            Self::Band => "band",
            Self::CategoryCode => "category_code",
            Self::Manufacturer => "manufacturer",
            Self::PartKey => "part_key",
            Self::ItemDescription => "item_description",
            Self::ListPrice => "CAST(list_price AS REAL)",
            Self::MinDiscount => "CAST(min_discount AS REAL)",
            Self::DiscountPrice => "CAST(discount_price AS REAL)",
        }
    }
}

// 搜索过滤: 文本列大小写不敏感子串匹配，价格列按小数文本包含匹配
// 统一走 instr: 搜索词是字面量子串, "%" / "_" 不具有通配符语义
// ?1 为空串时由首个分支直接放行（全量）
const SEARCH_CLAUSE: &str = r#"(
    ?1 = ''
    OR instr(LOWER(band), LOWER(?1)) > 0
    OR instr(LOWER(category_code), LOWER(?1)) > 0
    OR instr(LOWER(manufacturer), LOWER(?1)) > 0
    OR instr(LOWER(part_key), LOWER(?1)) > 0
    OR instr(LOWER(item_description), LOWER(?1)) > 0
    OR instr(list_price, ?1) > 0
    OR instr(min_discount, ?1) > 0
    OR instr(discount_price, ?1) > 0
)"#;

// ==========================================
// CatalogQueryRepository
// ==========================================
pub struct CatalogQueryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogQueryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 过滤后的总记录数（与 find_page 使用同一过滤条件）
    pub fn count_filtered(&self, search: Option<&str>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let search = search.unwrap_or("").trim();

        let sql = format!("SELECT COUNT(*) FROM catalog_item WHERE {SEARCH_CLAUSE}");
        let count: i64 = conn.query_row(&sql, params![search], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// 过滤 + 排序 + 分页查询
    ///
    /// # 参数
    /// - search: 可选搜索词（跨全部字段子串匹配）
    /// - order: 可选排序（白名单列, descending 标记）
    /// - limit / offset: 分页窗口（offset 由引擎层按 (page-1)*page_size 计算）
    pub fn find_page(
        &self,
        search: Option<&str>,
        order: Option<(SortColumn, bool)>,
        limit: usize,
        offset: usize,
    ) -> RepositoryResult<Vec<CatalogItem>> {
        let conn = self.get_conn()?;
        let search = search.unwrap_or("").trim();

        let order_clause = match order {
            Some((column, descending)) => format!(
                "ORDER BY {} {}",
                column.order_expr(),
                if descending { "DESC" } else { "ASC" }
            ),
            // 无排序要求时按 id 保持稳定顺序
            None => "ORDER BY id ASC".to_string(),
        };

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM catalog_item \
             WHERE {SEARCH_CLAUSE} {order_clause} LIMIT ?2 OFFSET ?3"
        );

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(
                params![search, limit as i64, offset as i64],
                CatalogImportRepositoryImpl::map_item_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(items)
    }

    /// 过滤后的全量记录（导出路径：同一过滤条件，不分页）
    pub fn find_filtered(&self, search: Option<&str>) -> RepositoryResult<Vec<CatalogItem>> {
        let conn = self.get_conn()?;
        let search = search.unwrap_or("").trim();

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM catalog_item WHERE {SEARCH_CLAUSE} ORDER BY id ASC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![search], CatalogImportRepositoryImpl::map_item_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(items)
    }
}
