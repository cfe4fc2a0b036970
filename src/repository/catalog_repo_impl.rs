// ==========================================
// 价格目录导入系统 - 导入侧 Repository 实现
// ==========================================
// upsert 策略: INSERT … ON CONFLICT(part_key) DO UPDATE
// - 原子的"查-建"合并，重复键竞态在存储层被结构性消除
// - DO UPDATE 路径不触碰 id / part_key / created_at
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{CatalogItem, ImportCandidate, ImportReport};
use crate::repository::catalog_repo::CatalogImportRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CatalogImportRepositoryImpl
// ==========================================
pub struct CatalogImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogImportRepositoryImpl {
    /// 基于共享连接创建实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 基于数据库路径创建实例
    pub fn from_path(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射: catalog_item 查询列序
    /// (id, band, category_code, manufacturer, part_key, item_description,
    ///  list_price, min_discount, discount_price, created_at, updated_at)
    pub(crate) fn map_item_row(row: &Row<'_>) -> rusqlite::Result<CatalogItem> {
        Ok(CatalogItem {
            id: row.get(0)?,
            band: row.get(1)?,
            category_code: row.get(2)?,
            manufacturer: row.get(3)?,
            part_key: row.get(4)?,
            item_description: row.get(5)?,
            list_price: parse_decimal_column(row, 6)?,
            min_discount: parse_decimal_column(row, 7)?,
            discount_price: parse_decimal_column(row, 8)?,
            created_at: parse_datetime_column(row, 9)?,
            updated_at: parse_datetime_column(row, 10)?,
        })
    }
}

/// TEXT 列 → Decimal（落库时即为规范小数文本）
fn parse_decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

/// TEXT 列 → DateTime<Utc>（RFC 3339）
fn parse_datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

pub(crate) const ITEM_COLUMNS: &str = "id, band, category_code, manufacturer, part_key, \
     item_description, list_price, min_discount, discount_price, created_at, updated_at";

#[async_trait]
impl CatalogImportRepository for CatalogImportRepositoryImpl {
    async fn upsert_batch(&self, candidates: Vec<ImportCandidate>) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let count = {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO catalog_item (
                    band, category_code, manufacturer, part_key, item_description,
                    list_price, min_discount, discount_price, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(part_key) DO UPDATE SET
                    band = excluded.band,
                    category_code = excluded.category_code,
                    manufacturer = excluded.manufacturer,
                    item_description = excluded.item_description,
                    list_price = excluded.list_price,
                    min_discount = excluded.min_discount,
                    discount_price = excluded.discount_price,
                    updated_at = excluded.updated_at
                "#,
            )?;

            let now = Utc::now().to_rfc3339();
            let mut count = 0;
            // 按行序执行: 同批内重复键遵循"后者覆盖"语义
            for candidate in &candidates {
                stmt.execute(params![
                    candidate.band,
                    candidate.category_code,
                    candidate.manufacturer,
                    candidate.part_key,
                    candidate.item_description,
                    candidate.list_price.to_string(),
                    candidate.min_discount.to_string(),
                    candidate.discount_price.to_string(),
                    now,
                    now,
                ])?;
                count += 1;
            }
            count
        };

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(count)
    }

    async fn insert_import_report(&self, report: &ImportReport) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let summary_json = serde_json::to_string(report)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, total_rows, imported_rows, skipped_rows,
                sheets_processed, cancelled, elapsed_ms, summary_json, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                report.batch_id,
                report.total_rows as i64,
                report.imported_rows as i64,
                report.skipped_rows as i64,
                report.sheets_processed as i64,
                report.cancelled,
                report.elapsed.as_millis() as i64,
                summary_json,
                report.imported_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn find_by_part_key(&self, part_key: &str) -> RepositoryResult<Option<CatalogItem>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog_item WHERE part_key = ?");
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![part_key], Self::map_item_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn count_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM catalog_item", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn make_candidate(part_key: &str, list_price: &str) -> ImportCandidate {
        ImportCandidate {
            band: "Enterprise".to_string(),
            category_code: "NET".to_string(),
            manufacturer: "Cisco".to_string(),
            part_key: part_key.to_string(),
            item_description: "Switch".to_string(),
            list_price: Decimal::from_str(list_price).unwrap(),
            min_discount: Decimal::new(125, 1),
            discount_price: Decimal::new(108024, 2),
            row_number: 3,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates_in_place() {
        let repo = CatalogImportRepositoryImpl::new(setup_test_db());

        repo.upsert_batch(vec![make_candidate("KEY-1", "100.00")])
            .await
            .unwrap();
        let first = repo.find_by_part_key("KEY-1").await.unwrap().unwrap();

        repo.upsert_batch(vec![make_candidate("KEY-1", "200.00")])
            .await
            .unwrap();
        let second = repo.find_by_part_key("KEY-1").await.unwrap().unwrap();

        // id 与 created_at 在更新路径保持不变，可变字段被覆盖
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.list_price, Decimal::from_str("200.00").unwrap());
        assert_eq!(repo.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_keys_within_batch_last_wins() {
        let repo = CatalogImportRepositoryImpl::new(setup_test_db());

        repo.upsert_batch(vec![
            make_candidate("KEY-1", "100.00"),
            make_candidate("KEY-1", "300.00"),
        ])
        .await
        .unwrap();

        assert_eq!(repo.count_all().await.unwrap(), 1);
        let item = repo.find_by_part_key("KEY-1").await.unwrap().unwrap();
        assert_eq!(item.list_price, Decimal::from_str("300.00").unwrap());
    }

    #[tokio::test]
    async fn test_find_missing_key_returns_none() {
        let repo = CatalogImportRepositoryImpl::new(setup_test_db());
        assert!(repo.find_by_part_key("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_import_report() {
        let repo = CatalogImportRepositoryImpl::new(setup_test_db());
        let mut report = ImportReport::new("batch-1".to_string());
        report.total_rows = 10;
        report.imported_rows = 8;
        report.skipped_rows = 2;
        report.sheets_processed = 1;

        repo.insert_import_report(&report).await.unwrap();
    }
}
