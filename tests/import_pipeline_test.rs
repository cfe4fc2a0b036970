// ==========================================
// 导入管道集成测试
// ==========================================
// 测试目标: upsert 正确性 / 幂等性 / 唯一性 / 批提交语义 / 取消
// ==========================================


use async_trait::async_trait;
use price_catalog::api::ApiError;
use price_catalog::importer::ImportError;
use price_catalog::repository::RepositoryResult;
use price_catalog::{
    db, logging, CatalogImportRepository, CatalogImportRepositoryImpl, CatalogItem,
    ImportCandidate, ImportConfig, ImportPipeline, ImportReport,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use test_helpers::{build_single_sheet, build_workbook, create_api, create_test_db, product_row};

#[tokio::test]
async fn test_import_enforces_part_key_uniqueness() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    // 同一文档内同键出现两次: 仅一条落库, 后者覆盖
    let bytes = build_single_sheet(vec![
        product_row("B", "C", "Cisco", "KEY-1", "first", "100.00", "10", "90.00"),
        product_row("B", "C", "Cisco", "KEY-2", "other", "50.00", "5", "45.00"),
        product_row("B", "C", "Cisco", "KEY-1", "second", "200.00", "20", "160.00"),
    ]);

    let report = api.import_from_document(&bytes).await.unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.imported_rows, 3); // 3 次 upsert
    assert_eq!(report.skipped_rows, 0);

    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 2);

    let key1 = page.items.iter().find(|i| i.part_key == "KEY-1").unwrap();
    assert_eq!(key1.item_description, "second");
    assert_eq!(key1.list_price, Decimal::from_str("200.00").unwrap());
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    let bytes = build_single_sheet(vec![
        product_row("B", "C", "Cisco", "KEY-1", "d1", "100.00", "10", "90.00"),
        product_row("B", "C", "Juniper", "KEY-2", "d2", "50.00", "5", "45.00"),
    ]);

    api.import_from_document(&bytes).await.unwrap();
    let first = api.list_page(1, 10, None, None, false).unwrap();

    api.import_from_document(&bytes).await.unwrap();
    let second = api.list_page(1, 10, None, None, false).unwrap();

    assert_eq!(first.total_matched, second.total_matched);
    for (a, b) in first.items.iter().zip(second.items.iter()) {
        // 代理主键与字段值均不变（updated_at 除外）
        assert_eq!(a.id, b.id);
        assert_eq!(a.part_key, b.part_key);
        assert_eq!(a.item_description, b.item_description);
        assert_eq!(a.list_price, b.list_price);
        assert_eq!(a.created_at, b.created_at);
    }
}

#[tokio::test]
async fn test_second_import_updates_mutable_fields_in_place() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    let v1 = build_single_sheet(vec![product_row(
        "B", "C", "Cisco", "KEY-1", "old", "100.00", "10", "90.00",
    )]);
    let v2 = build_single_sheet(vec![product_row(
        "B2", "C2", "Cisco", "KEY-1", "new", "120.00", "15", "102.00",
    )]);

    api.import_from_document(&v1).await.unwrap();
    let before = api.list_page(1, 10, None, None, false).unwrap().items[0].clone();

    api.import_from_document(&v2).await.unwrap();
    let page = api.list_page(1, 10, None, None, false).unwrap();

    assert_eq!(page.total_matched, 1);
    let after = &page.items[0];
    assert_eq!(after.id, before.id);
    assert_eq!(after.part_key, "KEY-1");
    assert_eq!(after.band, "B2");
    assert_eq!(after.item_description, "new");
    assert_eq!(after.list_price, Decimal::from_str("120.00").unwrap());
}

#[tokio::test]
async fn test_rows_with_empty_key_contribute_nothing() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    // 键列为空, 其余单元格有值: 必须静默跳过
    let bytes = build_single_sheet(vec![
        product_row("B", "C", "Cisco", "", "ghost", "100.00", "10", "90.00"),
        product_row("B", "C", "Cisco", "KEY-1", "real", "50.00", "5", "45.00"),
    ]);

    let report = api.import_from_document(&bytes).await.unwrap();
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.imported_rows, 1);

    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 1);
    assert_eq!(page.items[0].part_key, "KEY-1");
}

#[tokio::test]
async fn test_malformed_numeric_aborts_batch_but_keeps_committed_batches() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();

    // 批大小 2: 第 1 批(前两行)提交, 第 2 批(坏行)失败
    let config = ImportConfig {
        batch_size: 2,
        ..Default::default()
    };
    let api = create_api(&db_path, config);

    let bytes = build_single_sheet(vec![
        product_row("B", "C", "Cisco", "KEY-1", "d", "100.00", "10", "90.00"),
        product_row("B", "C", "Cisco", "KEY-2", "d", "50.00", "5", "45.00"),
        product_row("B", "C", "Cisco", "KEY-3", "d", "abc", "5", "45.00"),
    ]);

    let err = api.import_from_document(&bytes).await.unwrap_err();
    match err {
        ApiError::Import(ImportError::MalformedNumericValue { row, field, value }) => {
            assert_eq!(row, 5); // 数据第 3 行 = 绝对第 5 行
            assert_eq!(field, "list_price");
            assert_eq!(value, "abc");
        }
        other => panic!("意外的错误类型: {other}"),
    }

    // 已提交批次保持持久化, 失败批一行不落地
    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 2);
    assert!(page.items.iter().all(|i| i.part_key != "KEY-3"));
}

#[tokio::test]
async fn test_multi_sheet_import_caps_at_three_sheets() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    let bytes = build_workbook(&[
        vec![product_row("B", "C", "M", "S1-K", "d", "1.00", "1", "1.00")],
        vec![product_row("B", "C", "M", "S2-K", "d", "1.00", "1", "1.00")],
        vec![product_row("B", "C", "M", "S3-K", "d", "1.00", "1", "1.00")],
        vec![product_row("B", "C", "M", "S4-K", "d", "1.00", "1", "1.00")],
    ]);

    let report = api.import_from_document(&bytes).await.unwrap();
    assert_eq!(report.sheets_processed, 3);

    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 3);
    assert!(page.items.iter().all(|i| i.part_key != "S4-K"));
}

#[tokio::test]
async fn test_precancelled_import_launches_no_work() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    let bytes = build_single_sheet(vec![product_row(
        "B", "C", "Cisco", "KEY-1", "d", "100.00", "10", "90.00",
    )]);

    let cancel = Arc::new(AtomicBool::new(true));
    let report = api.import_with_cancel(&bytes, cancel).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.imported_rows, 0);

    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 0);
}

#[tokio::test]
async fn test_cancellation_preserves_committed_batches() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    // 先正常导入一批
    let bytes = build_single_sheet(vec![product_row(
        "B", "C", "Cisco", "KEY-1", "d", "100.00", "10", "90.00",
    )]);
    api.import_from_document(&bytes).await.unwrap();

    // 第二次导入被取消: 已有数据不受影响
    let more = build_single_sheet(vec![product_row(
        "B", "C", "Cisco", "KEY-2", "d", "50.00", "5", "45.00",
    )]);
    let cancel = Arc::new(AtomicBool::new(true));
    let report = api.import_with_cancel(&more, cancel).await.unwrap();
    assert!(report.cancelled);

    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 1);
    assert_eq!(page.items[0].part_key, "KEY-1");
}

// 在首批提交后翻转取消标志的测试仓储: 模拟导入进行中途收到取消请求
struct CancelAfterFirstCommitRepo {
    inner: CatalogImportRepositoryImpl,
    cancel: Arc<AtomicBool>,
}

#[async_trait]
impl CatalogImportRepository for CancelAfterFirstCommitRepo {
    async fn upsert_batch(&self, candidates: Vec<ImportCandidate>) -> RepositoryResult<usize> {
        let upserted = self.inner.upsert_batch(candidates).await?;
        self.cancel.store(true, Ordering::Relaxed);
        Ok(upserted)
    }

    async fn insert_import_report(&self, report: &ImportReport) -> RepositoryResult<()> {
        self.inner.insert_import_report(report).await
    }

    async fn find_by_part_key(&self, part_key: &str) -> RepositoryResult<Option<CatalogItem>> {
        self.inner.find_by_part_key(part_key).await
    }

    async fn count_all(&self) -> RepositoryResult<usize> {
        self.inner.count_all().await
    }
}

#[tokio::test]
async fn test_cancellation_mid_import_keeps_committed_batch_only() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();

    let conn = db::open_and_init(&db_path).unwrap();
    let cancel = Arc::new(AtomicBool::new(false));
    let repo = CancelAfterFirstCommitRepo {
        inner: CatalogImportRepositoryImpl::new(Arc::new(Mutex::new(conn))),
        cancel: Arc::clone(&cancel),
    };

    // batch_size=1: 第 1 行单独成批提交, 提交完成后标志翻转, 后续行不再派发
    let config = ImportConfig {
        batch_size: 1,
        ..ImportConfig::default()
    };
    let pipeline = ImportPipeline::new(Arc::new(repo), config);

    let bytes = build_single_sheet(vec![
        product_row("B", "C", "Cisco", "KEY-1", "d1", "100.00", "10", "90.00"),
        product_row("B", "C", "Cisco", "KEY-2", "d2", "50.00", "5", "45.00"),
        product_row("B", "C", "Cisco", "KEY-3", "d3", "30.00", "3", "27.00"),
    ]);

    let report = pipeline.import_with_cancel(&bytes, cancel).await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.imported_rows, 1);
    assert_eq!(report.total_rows, 1);

    // 首批已持久化, 取消后的行未落库
    let api = create_api(&db_path, ImportConfig::default());
    let page = api.list_page(1, 10, None, None, false).unwrap();
    assert_eq!(page.total_matched, 1);
    assert_eq!(page.items[0].part_key, "KEY-1");
}

#[tokio::test]
async fn test_empty_document_rejected() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path, ImportConfig::default());

    let err = api.import_from_document(&[]).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
