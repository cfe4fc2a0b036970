// ==========================================
// 价格目录导入系统 - 查询引擎
// ==========================================
// 职责: 过滤/排序/分页的规则层（参数校验、排序白名单、分页算术）
// 引擎无状态: 状态全部在存储层, 每次调用独立
// ==========================================
// 分页约定: 1 基页号, skip = (page - 1) * page_size
// 排序约定: 白名单列名, 未知列在触达存储层之前被拒绝
// 搜索约定: 全字段大小写不敏感子串匹配（文本列与价格文本渲染一致）
// ==========================================

use crate::domain::CatalogItem;
use crate::repository::{CatalogQueryRepository, RepositoryError, SortColumn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

// ==========================================
// 查询引擎错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("未知排序列: {0}")]
    UnknownSortColumn(String),

    #[error("非法分页参数: page={page}, page_size={page_size}（均须 >= 1）")]
    InvalidPagination { page: usize, page_size: usize },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type QueryResult<T> = Result<T, QueryError>;

// ==========================================
// PageQuery / CatalogPage
// ==========================================

/// 一次分页查询的入参
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1 基页号
    pub page: usize,
    pub page_size: usize,
    pub search: Option<String>,
    pub sort_column: Option<String>,
    #[serde(default)]
    pub sort_descending: bool,
}

/// 一页查询结果 + 过滤后总数
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total_matched: usize,
}

// ==========================================
// QueryEngine
// ==========================================
pub struct QueryEngine {
    query_repo: Arc<CatalogQueryRepository>,
}

impl QueryEngine {
    pub fn new(query_repo: Arc<CatalogQueryRepository>) -> Self {
        Self { query_repo }
    }

    /// 分页查询
    ///
    /// # 返回
    /// - Ok(CatalogPage): 本页条目 + 过滤后总数
    /// - Err(UnknownSortColumn / InvalidPagination): 在任何存储访问之前拒绝
    pub fn list_page(&self, query: &PageQuery) -> QueryResult<CatalogPage> {
        if query.page == 0 || query.page_size == 0 {
            return Err(QueryError::InvalidPagination {
                page: query.page,
                page_size: query.page_size,
            });
        }

        // 排序列先于存储访问解析: 未知列快速失败而非静默忽略
        let order = match query.sort_column.as_deref() {
            Some(name) => {
                let column = SortColumn::parse(name)
                    .ok_or_else(|| QueryError::UnknownSortColumn(name.to_string()))?;
                Some((column, query.sort_descending))
            }
            None => None,
        };

        // 标准分页算术: skip = (page - 1) * page_size
        let offset = (query.page - 1) * query.page_size;
        let search = query.search.as_deref();

        let total_matched = self.query_repo.count_filtered(search)?;
        let items = self
            .query_repo
            .find_page(search, order, query.page_size, offset)?;

        debug!(
            page = query.page,
            page_size = query.page_size,
            returned = items.len(),
            total = total_matched,
            "分页查询完成"
        );

        Ok(CatalogPage {
            items,
            total_matched,
        })
    }

    /// 导出路径: 同一过滤条件的全量集合（无分页、无排序要求）
    pub fn filtered_items(&self, search: Option<&str>) -> QueryResult<Vec<CatalogItem>> {
        Ok(self.query_repo.find_filtered(search)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rusqlite::{params, Connection};
    use std::sync::Mutex;

    fn engine_with_items(n: usize) -> QueryEngine {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();

        for i in 1..=n {
            conn.execute(
                r#"
                INSERT INTO catalog_item (
                    band, category_code, manufacturer, part_key, item_description,
                    list_price, min_discount, discount_price, created_at, updated_at
                ) VALUES ('B', 'C', 'Cisco', ?1, 'desc', ?2, '1.0', '2.0',
                          '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')
                "#,
                params![format!("K{i:03}"), format!("{i}.00")],
            )
            .unwrap();
        }

        QueryEngine::new(Arc::new(CatalogQueryRepository::new(Arc::new(Mutex::new(
            conn,
        )))))
    }

    fn page_query(page: usize, page_size: usize) -> PageQuery {
        PageQuery {
            page,
            page_size,
            search: None,
            sort_column: None,
            sort_descending: false,
        }
    }

    #[test]
    fn test_standard_pagination_convention() {
        // 25 条记录, 页大小 10, 第 2 页 → 第 11-20 条
        let engine = engine_with_items(25);
        let page = engine.list_page(&page_query(2, 10)).unwrap();

        assert_eq!(page.total_matched, 25);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].part_key, "K011");
        assert_eq!(page.items[9].part_key, "K020");
    }

    #[test]
    fn test_last_page_is_partial() {
        let engine = engine_with_items(25);
        let page = engine.list_page(&page_query(3, 10)).unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].part_key, "K021");
    }

    #[test]
    fn test_unknown_sort_column_rejected_fast() {
        let engine = engine_with_items(3);
        let mut query = page_query(1, 10);
        query.sort_column = Some("no_such_column".to_string());

        let err = engine.list_page(&query).unwrap_err();
        assert!(matches!(err, QueryError::UnknownSortColumn(name) if name == "no_such_column"));
    }

    #[test]
    fn test_zero_page_rejected() {
        let engine = engine_with_items(3);
        assert!(matches!(
            engine.list_page(&page_query(0, 10)),
            Err(QueryError::InvalidPagination { .. })
        ));
        assert!(matches!(
            engine.list_page(&page_query(1, 0)),
            Err(QueryError::InvalidPagination { .. })
        ));
    }

    #[test]
    fn test_sort_descending_by_price() {
        let engine = engine_with_items(5);
        let mut query = page_query(1, 10);
        query.sort_column = Some("listPrice".to_string());
        query.sort_descending = true;

        let page = engine.list_page(&query).unwrap();
        let prices: Vec<_> = page.items.iter().map(|i| i.list_price).collect();
        let mut sorted = prices.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(prices, sorted);
    }
}
