// ==========================================
// 价格目录导入系统 - 工作簿解析器
// ==========================================
// 职责: 从内存字节流解码 xlsx，产出最多 3 个 sheet 的单元格文本
// 注意: calamine 的 Range 以非空边界为锚点，这里按绝对行列补齐，
//       保证"第 3 行开始、第 5 列为键"的布局约定不被空白边界破坏
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{Reader, Xlsx};
use std::io::Cursor;

// ==========================================
// SheetRow / ParsedSheet - 解析产物
// ==========================================

/// 单行单元格文本（绝对定位）
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// 1 基绝对行号
    pub row_number: usize,
    /// 1 基绝对列对齐的单元格文本（cells[0] 即第 1 列）
    pub cells: Vec<String>,
}

/// 单个 sheet 的解析结果
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub name: String,
    pub rows: Vec<SheetRow>,
}

// ==========================================
// WorkbookParser - xlsx 字节流解析
// ==========================================
pub struct WorkbookParser;

impl WorkbookParser {
    /// 解析 xlsx 字节流，返回前 max_sheets 个 sheet
    ///
    /// # 返回
    /// - Ok(Vec<ParsedSheet>): 按工作簿内顺序排列
    /// - Err(WorkbookParse / EmptyWorkbook)
    pub fn parse_bytes(bytes: &[u8], max_sheets: usize) -> ImportResult<Vec<ParsedSheet>> {
        let cursor = Cursor::new(bytes.to_vec());
        let mut workbook: Xlsx<_> =
            Xlsx::new(cursor).map_err(|e| ImportError::WorkbookParse(e.to_string()))?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(ImportError::EmptyWorkbook);
        }

        let mut sheets = Vec::new();
        for sheet_name in sheet_names.into_iter().take(max_sheets) {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::WorkbookParse(e.to_string()))?;

            // Range 锚点: (起始行, 起始列)，0 基
            let (start_row, start_col) = range.start().unwrap_or((0, 0));

            let mut rows = Vec::new();
            for (i, data_row) in range.rows().enumerate() {
                // 左侧空白列补齐，保持绝对列号
                let mut cells: Vec<String> = vec![String::new(); start_col as usize];
                cells.extend(
                    data_row
                        .iter()
                        .map(|cell| cell.to_string().trim().to_string()),
                );

                rows.push(SheetRow {
                    row_number: start_row as usize + i + 1,
                    cells,
                });
            }

            sheets.push(ParsedSheet {
                name: sheet_name,
                rows,
            });
        }

        Ok(sheets)
    }
}
