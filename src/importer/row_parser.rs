// ==========================================
// 价格目录导入系统 - 行解析器
// ==========================================
// 职责: 单行单元格文本 → ImportCandidate（或跳过/报错）
// 纯转换，无副作用
// ==========================================
// 列布局（1 基）:
//   1=索引(忽略) 2=band 3=category_code 4=manufacturer
//   5=part_key 6=item_description 7=list_price 8=min_discount 9=discount_price
// ==========================================

use crate::domain::ImportCandidate;
use crate::importer::error::ImportResult;
use crate::importer::numeric::NumericNormalizer;

// 1 基列号
const COL_BAND: usize = 2;
const COL_CATEGORY_CODE: usize = 3;
const COL_MANUFACTURER: usize = 4;
const COL_PART_KEY: usize = 5;
const COL_ITEM_DESCRIPTION: usize = 6;
const COL_LIST_PRICE: usize = 7;
const COL_MIN_DISCOUNT: usize = 8;
const COL_DISCOUNT_PRICE: usize = 9;

/// 行解析器
pub struct RowParser;

impl RowParser {
    /// 解析一行数据
    ///
    /// # 参数
    /// - cells: 绝对列对齐的单元格文本（cells[0] 即第 1 列）
    /// - row_number: 1 基行号（第 1-2 行为表头，调用方不应传入）
    ///
    /// # 返回
    /// - Ok(None): part_key 为空，静默跳过（合法的空行结果，不是错误）
    /// - Ok(Some(candidate)): 解析成功
    /// - Err(MalformedNumericValue): 数值字段无法解析
    pub fn parse_row(cells: &[String], row_number: usize) -> ImportResult<Option<ImportCandidate>> {
        let part_key = Self::cell(cells, COL_PART_KEY);
        if part_key.trim().is_empty() {
            return Ok(None);
        }

        let candidate = ImportCandidate {
            band: Self::cell(cells, COL_BAND),
            category_code: Self::cell(cells, COL_CATEGORY_CODE),
            manufacturer: Self::cell(cells, COL_MANUFACTURER),
            part_key: part_key.trim().to_string(),
            item_description: Self::cell(cells, COL_ITEM_DESCRIPTION),
            list_price: NumericNormalizer::normalize(
                &Self::cell(cells, COL_LIST_PRICE),
                row_number,
                "list_price",
            )?,
            min_discount: NumericNormalizer::normalize(
                &Self::cell(cells, COL_MIN_DISCOUNT),
                row_number,
                "min_discount",
            )?,
            discount_price: NumericNormalizer::normalize(
                &Self::cell(cells, COL_DISCOUNT_PRICE),
                row_number,
                "discount_price",
            )?,
            row_number,
        };

        Ok(Some(candidate))
    }

    /// 按 1 基列号取单元格（行尾缺失的单元格视为空文本）
    fn cell(cells: &[String], col: usize) -> String {
        cells.get(col - 1).cloned().unwrap_or_default()
    }
}
