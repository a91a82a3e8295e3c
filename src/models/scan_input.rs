use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use super::context::ScanContext;
use super::item::SaleUnit;

/// 商品查询结果 (字段可能缺失)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductData {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub unit_price: Option<BigDecimal>,
    pub sale_unit_type: Option<String>,
    pub weight_unit: Option<String>,
    /// 起始数量，缺省为 1
    pub quantity: Option<i64>,
    pub supplier: Option<String>,
    pub site: Option<String>,
    pub notes: Option<String>,
}

/// 销售场景输入: 商品ID、名称、单价均为必填
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesScanInput {
    pub barcode: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub sale_unit: SaleUnit,
    pub quantity: Option<i64>,
}

/// 盘点 / 收货 / 调拨共用的输入，缺失字段使用默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockScanInput {
    pub barcode: String,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub unit_price: Option<BigDecimal>,
    pub sale_unit: SaleUnit,
    pub quantity: Option<i64>,
    pub notes: Option<String>,
}

/// 按业务场景区分的扫码输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "context", rename_all = "lowercase")]
pub enum ScanInput {
    Sales(SalesScanInput),
    Inventory(StockScanInput),
    Reception {
        #[serde(flatten)]
        line: StockScanInput,
        supplier: Option<String>,
    },
    Transfer {
        #[serde(flatten)]
        line: StockScanInput,
        site: Option<String>,
    },
}

impl ScanInput {
    /// 将商品查询结果转换为对应场景的输入
    ///
    /// 销售场景缺失的必填字段在这里以空值占位，由校验器拒绝
    pub fn from_product(context: ScanContext, barcode: &str, product: ProductData) -> Self {
        let sale_unit = SaleUnit::from_tags(product.sale_unit_type, product.weight_unit);
        let line = StockScanInput {
            barcode: barcode.to_string(),
            product_id: product.product_id,
            product_name: product.product_name,
            unit_price: product.unit_price,
            sale_unit,
            quantity: product.quantity,
            notes: product.notes,
        };

        match context {
            ScanContext::Sales => ScanInput::Sales(SalesScanInput {
                barcode: line.barcode,
                product_id: line.product_id.unwrap_or_default(),
                product_name: line.product_name.unwrap_or_default(),
                unit_price: line.unit_price.unwrap_or_else(BigDecimal::zero),
                sale_unit: line.sale_unit,
                quantity: line.quantity,
            }),
            ScanContext::Inventory => ScanInput::Inventory(line),
            ScanContext::Reception => ScanInput::Reception {
                line,
                supplier: product.supplier,
            },
            ScanContext::Transfer => ScanInput::Transfer {
                line,
                site: product.site,
            },
        }
    }

    pub fn context(&self) -> ScanContext {
        match self {
            ScanInput::Sales(_) => ScanContext::Sales,
            ScanInput::Inventory(_) => ScanContext::Inventory,
            ScanInput::Reception { .. } => ScanContext::Reception,
            ScanInput::Transfer { .. } => ScanContext::Transfer,
        }
    }

    pub fn raw_barcode(&self) -> &str {
        match self {
            ScanInput::Sales(input) => &input.barcode,
            ScanInput::Inventory(line)
            | ScanInput::Reception { line, .. }
            | ScanInput::Transfer { line, .. } => &line.barcode,
        }
    }
}

/// 通过校验后的扫码记录
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedScan {
    pub barcode: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub unit_price: BigDecimal,
    pub quantity: u32,
    pub sale_unit: SaleUnit,
    pub supplier: Option<String>,
    pub site: Option<String>,
    pub notes: Option<String>,
}

impl NormalizedScan {
    pub fn is_weight_typed(&self) -> bool {
        self.sale_unit.is_weight_typed()
    }
}
