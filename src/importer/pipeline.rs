// ==========================================
// 价格目录导入系统 - 导入管道
// ==========================================
// 流程: 工作簿解析 → 行解析(有界并发) → 分批事务提交
// ==========================================
// 并发模型:
// - 行解析/数值规整任务在 Semaphore(worker_limit) 下并发执行
// - 每累计 batch_size 个任务为一批: 等待全部完成后以单事务提交
// - 提交点是同步屏障: 下一批不会在本批落地前启动
// - upsert 原子性由存储层 ON CONFLICT 保证, 无应用级全局锁
// ==========================================
// 失败策略:
// - 批内任何行解析失败 → 本批事务不提交, 错误上抛
// - 已提交的前序批次保持持久化（逐批原子, 非端到端原子）
// ==========================================

use crate::config::ImportConfig;
use crate::domain::{ImportCandidate, ImportReport};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_parser::RowParser;
use crate::importer::workbook_parser::WorkbookParser;
use crate::repository::CatalogImportRepository;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

type RowTask = JoinHandle<ImportResult<Option<ImportCandidate>>>;

// ==========================================
// ImportPipeline - 导入管道
// ==========================================
pub struct ImportPipeline<R: CatalogImportRepository> {
    repo: Arc<R>,
    config: ImportConfig,
}

impl<R: CatalogImportRepository + 'static> ImportPipeline<R> {
    pub fn new(repo: Arc<R>, config: ImportConfig) -> Self {
        Self { repo, config }
    }

    /// 从 xlsx 字节流导入（无取消信号）
    pub async fn import_from_bytes(&self, bytes: &[u8]) -> ImportResult<ImportReport> {
        self.import_with_cancel(bytes, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// 从 xlsx 字节流导入, 携带协作式取消信号
    ///
    /// 取消语义（行粒度检查）:
    /// - 不再启动新的行处理任务
    /// - 已启动的任务等待完成并随本批提交（不丢已做的工作）
    /// - 已提交批次不受影响
    #[instrument(skip(self, bytes, cancel), fields(batch_id))]
    pub async fn import_with_cancel(
        &self,
        bytes: &[u8],
        cancel: Arc<AtomicBool>,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, size_bytes = bytes.len(), "开始导入价格目录");

        // === 步骤 1: 解析工作簿（最多 max_sheets 个 sheet）===
        let sheets = WorkbookParser::parse_bytes(bytes, self.config.max_sheets)?;
        info!(sheets = sheets.len(), "工作簿解析完成");

        let semaphore = Arc::new(Semaphore::new(self.config.worker_limit));
        let mut report = ImportReport::new(batch_id.clone());

        // === 步骤 2: 逐 sheet 分批处理 ===
        'sheets: for sheet in sheets {
            debug!(sheet = %sheet.name, rows = sheet.rows.len(), "开始处理 sheet");
            let mut tasks: Vec<RowTask> = Vec::new();

            for row in sheet.rows {
                // 表头/保留行不进入解析
                if row.row_number < self.config.data_start_row {
                    continue;
                }

                // 行粒度取消检查: 停止启动新任务
                if cancel.load(Ordering::Relaxed) {
                    warn!(batch_id = %batch_id, row = row.row_number, "导入被取消, 停止派发新任务");
                    report.cancelled = true;
                    self.flush_chunk(&mut tasks, &mut report).await?;
                    break 'sheets;
                }

                report.total_rows += 1;
                tasks.push(self.spawn_row_task(row.cells, row.row_number, &semaphore));

                // 达到批量阈值: 等待本批全部完成并单事务提交
                if tasks.len() >= self.config.batch_size {
                    self.flush_chunk(&mut tasks, &mut report).await?;
                }
            }

            // sheet 末尾的残余批
            self.flush_chunk(&mut tasks, &mut report).await?;
            report.sheets_processed += 1;
            debug!(sheet = %sheet.name, "sheet 处理完成");
        }

        report.elapsed = start_time.elapsed();

        // === 步骤 3: 记录批次汇总 ===
        self.repo.insert_import_report(&report).await?;

        info!(
            batch_id = %batch_id,
            total = report.total_rows,
            imported = report.imported_rows,
            skipped = report.skipped_rows,
            sheets = report.sheets_processed,
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "价格目录导入完成"
        );

        Ok(report)
    }

    /// 派发单行解析任务（Semaphore 限流）
    fn spawn_row_task(
        &self,
        cells: Vec<String>,
        row_number: usize,
        semaphore: &Arc<Semaphore>,
    ) -> RowTask {
        let semaphore = Arc::clone(semaphore);
        tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ImportError::Internal(e.to_string()))?;
            RowParser::parse_row(&cells, row_number)
        })
    }

    /// 等待一批任务完成并以单事务提交
    ///
    /// 批内首个行级错误使整批提交被跳过并上抛
    async fn flush_chunk(
        &self,
        tasks: &mut Vec<RowTask>,
        report: &mut ImportReport,
    ) -> ImportResult<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let chunk_size = tasks.len();
        let results = join_all(tasks.drain(..)).await;

        // 保持行序收集候选: 同批内重复键"后者覆盖"
        let mut candidates = Vec::with_capacity(chunk_size);
        for result in results {
            let parsed = result.map_err(|e| ImportError::WorkerPanicked(e.to_string()))??;
            match parsed {
                Some(candidate) => candidates.push(candidate),
                None => report.skipped_rows += 1,
            }
        }

        if candidates.is_empty() {
            debug!(chunk = chunk_size, "本批无有效行, 跳过提交");
            return Ok(());
        }

        let upserted = self.repo.upsert_batch(candidates).await?;
        report.imported_rows += upserted;

        debug!(
            chunk = chunk_size,
            upserted = upserted,
            "批次提交完成"
        );

        Ok(())
    }
}
