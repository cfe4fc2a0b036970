// ==========================================
// 价格目录导入系统 - 导入配置
// ==========================================
// 职责: 导入管道的可调参数（批大小 / 并发上限 / 表结构约定）
// 来源: 默认值或 JSON 配置文件
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认批量提交阈值（每批累计多少个 upsert 后统一提交）
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// 默认行处理并发上限
pub const DEFAULT_WORKER_LIMIT: usize = 8;

/// 单次导入最多处理的 sheet 数
pub const DEFAULT_MAX_SHEETS: usize = 3;

/// 数据起始行（1 基；第 1-2 行为表头/保留行）
pub const DEFAULT_DATA_START_ROW: usize = 3;

/// 导入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 批量提交阈值
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// 行处理并发上限（Semaphore 许可数）
    #[serde(default = "default_worker_limit")]
    pub worker_limit: usize,

    /// 单次导入最多处理的 sheet 数
    #[serde(default = "default_max_sheets")]
    pub max_sheets: usize,

    /// 数据起始行（1 基）
    #[serde(default = "default_data_start_row")]
    pub data_start_row: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_worker_limit() -> usize {
    DEFAULT_WORKER_LIMIT
}

fn default_max_sheets() -> usize {
    DEFAULT_MAX_SHEETS
}

fn default_data_start_row() -> usize {
    DEFAULT_DATA_START_ROW
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_limit: DEFAULT_WORKER_LIMIT,
            max_sheets: DEFAULT_MAX_SHEETS,
            data_start_row: DEFAULT_DATA_START_ROW,
        }
    }
}

impl ImportConfig {
    /// 从 JSON 文件加载配置（缺失字段回退默认值）
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ImportConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置合法性
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("batch_size 必须大于 0");
        }
        if self.worker_limit == 0 {
            anyhow::bail!("worker_limit 必须大于 0");
        }
        if self.max_sheets == 0 {
            anyhow::bail!("max_sheets 必须大于 0");
        }
        if self.data_start_row == 0 {
            anyhow::bail!("data_start_row 为 1 基行号，必须大于 0");
        }
        Ok(())
    }
}
