// ==========================================
// 价格目录导入系统 - CLI 主入口
// ==========================================
// 用法:
//   price-catalog import <file.xlsx>
//   price-catalog list [--page N] [--page-size N] [--search 词] [--sort 列] [--desc]
//   price-catalog export <out.xlsx> [--search 词]
// 数据库路径: 环境变量 PRICE_CATALOG_DB（默认 catalog.db）
// ==========================================

use std::sync::{Arc, Mutex};

use price_catalog::{db, logging, CatalogApi, ImportConfig};

fn usage() -> ! {
    eprintln!("用法:");
    eprintln!("  price-catalog import <file.xlsx>");
    eprintln!("  price-catalog list [--page N] [--page-size N] [--search 词] [--sort 列] [--desc]");
    eprintln!("  price-catalog export <out.xlsx> [--search 词]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", price_catalog::APP_NAME);
    tracing::info!("系统版本: {}", price_catalog::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::var("PRICE_CATALOG_DB").unwrap_or_else(|_| "catalog.db".to_string());
    tracing::info!("使用数据库: {}", db_path);

    let conn = db::open_and_init(&db_path)?;
    let api = CatalogApi::new(Arc::new(Mutex::new(conn)), ImportConfig::default());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut args = args.iter();

    match args.next().map(|s| s.as_str()) {
        Some("import") => {
            let Some(file) = args.next() else { usage() };
            let bytes = std::fs::read(file)?;
            let report = api.import_from_document(&bytes).await?;
            println!(
                "导入完成: batch={} 总行数={} 导入={} 跳过={} sheet数={} 耗时={}ms",
                report.batch_id,
                report.total_rows,
                report.imported_rows,
                report.skipped_rows,
                report.sheets_processed,
                report.elapsed.as_millis()
            );
        }
        Some("list") => {
            let mut page = 1usize;
            let mut page_size = 20usize;
            let mut search = None;
            let mut sort_column = None;
            let mut descending = false;

            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--page" => page = args.next().map(|v| v.parse()).transpose()?.unwrap_or(1),
                    "--page-size" => {
                        page_size = args.next().map(|v| v.parse()).transpose()?.unwrap_or(20)
                    }
                    "--search" => search = args.next().cloned(),
                    "--sort" => sort_column = args.next().cloned(),
                    "--desc" => descending = true,
                    _ => usage(),
                }
            }

            let result = api.list_page(page, page_size, search, sort_column, descending)?;
            println!("匹配总数: {}", result.total_matched);
            for item in &result.items {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    item.part_key, item.manufacturer, item.band, item.list_price, item.discount_price
                );
            }
        }
        Some("export") => {
            let Some(out) = args.next() else { usage() };
            let mut search = None;
            while let Some(flag) = args.next() {
                match flag.as_str() {
                    "--search" => search = args.next().cloned(),
                    _ => usage(),
                }
            }

            let bytes = api.export_to_document(search.as_deref())?;
            std::fs::write(out, &bytes)?;
            println!("导出完成: {} 字节 → {}", bytes.len(), out);
        }
        _ => usage(),
    }

    Ok(())
}
