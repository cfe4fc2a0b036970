// ==========================================
// 价格目录导入系统 - 目录导出器
// ==========================================
// 职责: 过滤后的目录条目 → xlsx 内存字节流
// 布局与导入约定一致(可直接回导):
//   第 1 行 标题 / 第 2 行 列名 / 第 3 行起数据
//   第 1 列 序号(导入时忽略), 第 2-9 列为八个数据字段
// 价格按规范小数文本写出, 回导解析无精度损失
// ==========================================

use crate::domain::CatalogItem;
use rust_xlsxwriter::{Workbook, Worksheet};
use thiserror::Error;
use tracing::debug;

/// 导出列号（0 基）
mod cols {
    pub const INDEX: u16 = 0;
    pub const BAND: u16 = 1;
    pub const CATEGORY_CODE: u16 = 2;
    pub const MANUFACTURER: u16 = 3;
    pub const PART_KEY: u16 = 4;
    pub const ITEM_DESCRIPTION: u16 = 5;
    pub const LIST_PRICE: u16 = 6;
    pub const MIN_DISCOUNT: u16 = 7;
    pub const DISCOUNT_PRICE: u16 = 8;
}

/// 数据起始行（0 基; 第 1-2 行为标题/列名）
const DATA_START_ROW: u32 = 2;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Excel 写出失败: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

// ==========================================
// CatalogExporter
// ==========================================
pub struct CatalogExporter;

impl CatalogExporter {
    /// 序列化条目集合为 xlsx 字节流
    pub fn to_document(items: &[CatalogItem]) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Catalog")?;

        Self::write_header(worksheet)?;

        for (i, item) in items.iter().enumerate() {
            Self::write_item(worksheet, DATA_START_ROW + i as u32, i + 1, item)?;
        }

        let bytes = workbook.save_to_buffer()?;
        debug!(items = items.len(), size_bytes = bytes.len(), "目录导出完成");
        Ok(bytes)
    }

    fn write_header(ws: &mut Worksheet) -> Result<(), ExportError> {
        // 第 1 行: 标题行（导入侧保留行）
        ws.write_string(0, cols::INDEX, "Price Catalog")?;

        // 第 2 行: 列名行
        ws.write_string(1, cols::INDEX, "#")?;
        ws.write_string(1, cols::BAND, "Band")?;
        ws.write_string(1, cols::CATEGORY_CODE, "CategoryCode")?;
        ws.write_string(1, cols::MANUFACTURER, "Manufacturer")?;
        ws.write_string(1, cols::PART_KEY, "PartKey")?;
        ws.write_string(1, cols::ITEM_DESCRIPTION, "ItemDescription")?;
        ws.write_string(1, cols::LIST_PRICE, "ListPrice")?;
        ws.write_string(1, cols::MIN_DISCOUNT, "MinDiscount")?;
        ws.write_string(1, cols::DISCOUNT_PRICE, "DiscountPrice")?;
        Ok(())
    }

    fn write_item(
        ws: &mut Worksheet,
        row: u32,
        index: usize,
        item: &CatalogItem,
    ) -> Result<(), ExportError> {
        ws.write_number(row, cols::INDEX, index as f64)?;
        ws.write_string(row, cols::BAND, &item.band)?;
        ws.write_string(row, cols::CATEGORY_CODE, &item.category_code)?;
        ws.write_string(row, cols::MANUFACTURER, &item.manufacturer)?;
        ws.write_string(row, cols::PART_KEY, &item.part_key)?;
        ws.write_string(row, cols::ITEM_DESCRIPTION, &item.item_description)?;
        ws.write_string(row, cols::LIST_PRICE, &item.list_price.to_string())?;
        ws.write_string(row, cols::MIN_DISCOUNT, &item.min_discount.to_string())?;
        ws.write_string(row, cols::DISCOUNT_PRICE, &item.discount_price.to_string())?;
        Ok(())
    }
}
