// ==========================================
// 价格目录导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供 catalog_item / import_batch 建表入口
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 约束：
/// - part_key 携带 UNIQUE 约束，是 upsert 的天然键
/// - 价格字段以规范小数文本存储（不使用浮点列）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS catalog_item (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            band TEXT NOT NULL,
            category_code TEXT NOT NULL,
            manufacturer TEXT NOT NULL,
            part_key TEXT NOT NULL UNIQUE,
            item_description TEXT NOT NULL,
            list_price TEXT NOT NULL,
            min_discount TEXT NOT NULL,
            discount_price TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            total_rows INTEGER NOT NULL,
            imported_rows INTEGER NOT NULL,
            skipped_rows INTEGER NOT NULL,
            sheets_processed INTEGER NOT NULL,
            cancelled INTEGER NOT NULL DEFAULT 0,
            elapsed_ms INTEGER,
            summary_json TEXT,
            imported_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// 打开连接并确保 schema 就绪（CLI 与测试共用入口）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
