// ==========================================
// 零件库 BOM 导入器 - KiCad Pcbnew BOM 解析器
// ==========================================
// 格式: ';' 分隔，首行为表头（表头文字随语言变化，解析按列位置）
// 列布局:
// - 6 列: Id;Designator;Package;Quantity;Designation;Supplier and ref
// - 5 列: Designator;Package;Designation;Quantity;Supplier and ref
// 红线: 必填列缺失或数量非法时整体拒绝
// ==========================================

use crate::importer::error::ImportError;
use csv::{ReaderBuilder, StringRecord};

// ==========================================
// KicadRow - 单行 BOM 数据
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct KicadRow {
    pub index: usize, // 数据行位置（从 0 开始，不含表头）
    pub line: u64,    // 源文件行号（用于消息）
    pub designator: String,
    pub package: String,
    pub quantity: f64,
    pub designation: String,
    pub supplier_and_ref: String,
}

impl KicadRow {
    /// 条目名称: "<Designation> (<Package>)"
    pub fn entry_name(&self) -> String {
        format!("{} ({})", self.designation, self.package)
    }
}

// ==========================================
// KicadRowError - 行级结构错误
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum KicadRowError {
    FieldMissing {
        index: usize,
        line: u64,
        field: &'static str,
    },
    QuantityInvalid {
        index: usize,
        line: u64,
        value: String,
    },
}

/// 列位置（按布局）
struct ColumnLayout {
    designator: usize,
    package: usize,
    quantity: usize,
    designation: usize,
    supplier_and_ref: usize,
}

const FULL_LAYOUT: ColumnLayout = ColumnLayout {
    designator: 1,
    package: 2,
    quantity: 3,
    designation: 4,
    supplier_and_ref: 5,
};

const COMPACT_LAYOUT: ColumnLayout = ColumnLayout {
    designator: 0,
    package: 1,
    designation: 2,
    quantity: 3,
    supplier_and_ref: 4,
};

pub struct KicadPcbParser;

impl KicadPcbParser {
    /// 解析全部数据行
    ///
    /// # 返回
    /// - Ok(Ok(rows)): 全部行合法
    /// - Ok(Err(e)): 首个结构错误（调用方转为单条违规）
    /// - Err: CSV 读取失败
    pub fn parse(&self, data: &str) -> Result<Result<Vec<KicadRow>, KicadRowError>, ImportError> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(b';')
            .from_reader(data.as_bytes());

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            // 表头为第 1 行
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);

            match Self::parse_row(index, line, &record) {
                Ok(row) => rows.push(row),
                Err(e) => return Ok(Err(e)),
            }
        }

        Ok(Ok(rows))
    }

    fn parse_row(index: usize, line: u64, record: &StringRecord) -> Result<KicadRow, KicadRowError> {
        // 6 列以上（含导出时的尾部分隔符）按完整布局；恰好 5 列按紧凑布局
        let layout = if record.len() == 5 {
            &COMPACT_LAYOUT
        } else {
            &FULL_LAYOUT
        };

        let field = |position: usize, name: &'static str| {
            record
                .get(position)
                .map(|v| v.trim().to_string())
                .ok_or(KicadRowError::FieldMissing { index, line, field: name })
        };

        let designator = field(layout.designator, "Designator")?;
        let package = field(layout.package, "Package")?;
        let raw_quantity = field(layout.quantity, "Quantity")?;
        let designation = field(layout.designation, "Designation")?;
        let supplier_and_ref = record
            .get(layout.supplier_and_ref)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let quantity = raw_quantity
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite() && *q > 0.0)
            .ok_or_else(|| KicadRowError::QuantityInvalid {
                index,
                line,
                value: raw_quantity.clone(),
            })?;

        Ok(KicadRow {
            index,
            line,
            designator,
            package,
            quantity,
            designation,
            supplier_and_ref,
        })
    }
}
