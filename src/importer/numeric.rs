// ==========================================
// 价格目录导入系统 - 数值规整器
// ==========================================
// 职责: 剥离货币符号/千分位/百分号等格式噪音，解析为定点小数
// 已知脆弱点: 括号负数记法（"(100)"）中的括号被剥离而非转为负号
// ==========================================

use crate::importer::error::ImportError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 数值规整器
///
/// 算法: 保留 ASCII 数字、小数点、负号，其余字符全部剔除，
/// 剩余文本按定点小数解析；解析失败时报 MalformedNumericValue，
/// 错误中携带原始文本。
pub struct NumericNormalizer;

impl NumericNormalizer {
    /// 规整并解析一个数值单元格
    ///
    /// # 参数
    /// - raw: 原始单元格文本
    /// - row: 1 基行号（错误上下文）
    /// - field: 字段名（错误上下文）
    ///
    /// # 示例
    /// - "$1,234.56" → 1234.56
    /// - "12.5%"     → 12.5
    /// - " -3.00 "   → -3.00
    /// - "abc"       → Err(MalformedNumericValue)
    pub fn normalize(raw: &str, row: usize, field: &'static str) -> Result<Decimal, ImportError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        if cleaned.is_empty() {
            return Err(ImportError::MalformedNumericValue {
                row,
                field,
                value: raw.to_string(),
            });
        }

        Decimal::from_str(&cleaned).map_err(|_| ImportError::MalformedNumericValue {
            row,
            field,
            value: raw.to_string(),
        })
    }
}
