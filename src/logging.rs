// ==========================================
// 价格目录导入系统 - 日志初始化
// ==========================================
// 导入管道与查询引擎的关键日志都带结构化字段
// （batch_id / total / imported / cancelled 等），
// 这里统一配置 tracing 订阅器与级别过滤
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化全局日志订阅器（进程入口调用一次）
///
/// 级别由 RUST_LOG 控制，未设置时整体 info。
/// 排查单次导入时通常用 RUST_LOG=price_catalog=debug，
/// 可以看到逐批提交的 chunk / upserted 明细。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 测试用日志初始化
///
/// 固定 debug 级别并接入测试捕获输出;
/// try_init 允许同一测试进程内多个用例重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
