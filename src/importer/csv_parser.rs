// ==========================================
// 零件库 BOM 导入器 - 通用 CSV 解析器
// ==========================================
// 规则:
// - 整个负载交给同一个 csv 读取器，引号内的换行属于单元格
// - 表头按 ',' 拆分，只得到一列时整体改用 ';'
// - 数据行只拆出一列且与表头列数不一致时，改用另一分隔符重拆该行
// - 列名小写，按 '_' 拆分为嵌套路径（part_mpnr → part.mpnr）
// - 数字形态的值转为数字（保留原文），空值剪除
// ==========================================

use crate::importer::bom_importer_trait::RecordParser;
use crate::importer::error::ImportError;
use crate::importer::record::{ImportRecord, RecordValue, SourceRecord};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

pub struct CsvRecordParser;

impl CsvRecordParser {
    /// 按指定分隔符读取全部行（支持双引号转义与跨行单元格）
    fn read_rows(data: &str, delimiter: u8) -> Result<Vec<StringRecord>, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(data.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?);
        }
        Ok(rows)
    }

    /// 按指定分隔符重拆单个单元格
    fn split_cell(cell: &str, delimiter: u8) -> Result<Vec<String>, ImportError> {
        match Self::read_rows(cell, delimiter)?.first() {
            Some(record) => Ok(record.iter().map(|v| v.to_string()).collect()),
            None => Ok(Vec::new()),
        }
    }

    fn is_blank(row: &StringRecord) -> bool {
        row.iter().all(|cell| cell.trim().is_empty())
    }

    /// 行起始的物理行号（从 1 开始）
    fn line_of(row: &StringRecord) -> u64 {
        row.position().map(|p| p.line()).unwrap_or(0)
    }

    /// 表头列 → 嵌套路径段
    fn header_path(column: &str) -> Vec<String> {
        column
            .trim()
            .to_lowercase()
            .split('_')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_string())
            .collect()
    }

    fn build_record(header: &[Vec<String>], values: &[String]) -> ImportRecord {
        let mut record = ImportRecord::new();
        for (path, raw) in header.iter().zip(values.iter()) {
            if path.is_empty() {
                continue;
            }
            let segments: Vec<&str> = path.iter().map(String::as_str).collect();
            record.insert_path(&segments, RecordValue::from_csv_cell(raw));
        }
        record.prune_empty()
    }
}

impl RecordParser for CsvRecordParser {
    fn parse(&self, data: &str) -> Result<Vec<SourceRecord>, ImportError> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);

        let mut delimiter = b',';
        let mut rows = Self::read_rows(data, delimiter)?;
        // 跳过表头前的空行
        let mut header_at = match rows.iter().position(|row| !Self::is_blank(row)) {
            Some(at) => at,
            None => return Ok(Vec::new()),
        };
        if rows[header_at].len() == 1 {
            delimiter = b';';
            rows = Self::read_rows(data, delimiter)?;
            header_at = match rows.iter().position(|row| !Self::is_blank(row)) {
                Some(at) => at,
                None => return Ok(Vec::new()),
            };
        }
        let fallback = if delimiter == b',' { b';' } else { b',' };

        let header_row = &rows[header_at];
        let header_line = Self::line_of(header_row);
        let header: Vec<Vec<String>> = header_row.iter().map(Self::header_path).collect();
        debug!(columns = header.len(), delimiter = %(delimiter as char), "CSV 表头解析完成");

        let mut records = Vec::new();
        for row in &rows[header_at + 1..] {
            // 空行不产出记录，但保留行位置
            if Self::is_blank(row) {
                continue;
            }

            let mut values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            if values.len() == 1 && header.len() != 1 {
                values = Self::split_cell(&values[0], fallback)?;
            }

            let index = Self::line_of(row).saturating_sub(header_line + 1) as usize;
            records.push(SourceRecord {
                index,
                value: RecordValue::Map(Self::build_record(&header, &values)),
            });
        }

        Ok(records)
    }
}
