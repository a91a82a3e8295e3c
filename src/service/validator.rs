use bigdecimal::{BigDecimal, Zero};

use crate::error::ScanRejection;
use crate::models::{NormalizedScan, SaleUnit, ScanContext, ScanInput};

/// 业务场景校验策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextPolicy {
    pub requires_product_id: bool,
    pub requires_product_name: bool,
    pub requires_positive_price: bool,
}

impl ContextPolicy {
    /// 策略表: 只有收银场景要求完整商品数据，防止录入零价/虚假销售
    pub const fn for_context(context: ScanContext) -> Self {
        match context {
            ScanContext::Sales => Self {
                requires_product_id: true,
                requires_product_name: true,
                requires_positive_price: true,
            },
            ScanContext::Inventory | ScanContext::Reception | ScanContext::Transfer => Self {
                requires_product_id: false,
                requires_product_name: false,
                requires_positive_price: false,
            },
        }
    }
}

/// 条码规范化: 只去除首尾空白
pub fn normalize_barcode(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// 场景校验器
#[derive(Debug, Clone)]
pub struct ContextValidator {
    context: ScanContext,
    policy: ContextPolicy,
    placeholder_name: String,
}

impl ContextValidator {
    pub fn new(context: ScanContext, placeholder_name: impl Into<String>) -> Self {
        Self {
            context,
            policy: ContextPolicy::for_context(context),
            placeholder_name: placeholder_name.into(),
        }
    }

    pub fn context(&self) -> ScanContext {
        self.context
    }

    /// 校验输入并补全默认值
    pub fn validate(&self, input: ScanInput) -> Result<NormalizedScan, ScanRejection> {
        if input.context() != self.context {
            return Err(ScanRejection::ContextMismatch {
                expected: self.context,
                actual: input.context(),
            });
        }

        let barcode = normalize_barcode(input.raw_barcode())
            .ok_or(ScanRejection::EmptyBarcode)?
            .to_string();

        let (line, supplier, site) = match input {
            ScanInput::Sales(sales) => {
                return self.validate_fields(
                    barcode,
                    Some(sales.product_id),
                    Some(sales.product_name),
                    Some(sales.unit_price),
                    sales.sale_unit,
                    sales.quantity,
                    Extras::default(),
                );
            }
            ScanInput::Inventory(line) => (line, None, None),
            ScanInput::Reception { line, supplier } => (line, supplier, None),
            ScanInput::Transfer { line, site } => (line, None, site),
        };

        self.validate_fields(
            barcode,
            line.product_id,
            line.product_name,
            line.unit_price,
            line.sale_unit,
            line.quantity,
            Extras {
                supplier,
                site,
                notes: line.notes,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_fields(
        &self,
        barcode: String,
        product_id: Option<String>,
        product_name: Option<String>,
        unit_price: Option<BigDecimal>,
        sale_unit: SaleUnit,
        quantity: Option<i64>,
        extras: Extras,
    ) -> Result<NormalizedScan, ScanRejection> {
        let product_id = product_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if self.policy.requires_product_id && product_id.is_none() {
            return Err(ScanRejection::MissingProductId {
                context: self.context,
            });
        }

        let product_name = product_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let product_name = match product_name {
            Some(name) => name,
            None if self.policy.requires_product_name => {
                return Err(ScanRejection::MissingProductName {
                    context: self.context,
                })
            }
            None => self.placeholder_name.clone(),
        };

        let unit_price = unit_price.unwrap_or_else(BigDecimal::zero);
        if self.policy.requires_positive_price && unit_price <= BigDecimal::zero() {
            return Err(ScanRejection::NonPositivePrice {
                context: self.context,
            });
        }
        if unit_price < BigDecimal::zero() {
            return Err(ScanRejection::NegativePrice { price: unit_price });
        }

        let quantity = match quantity {
            None => 1,
            Some(q) if q <= 0 => return Err(ScanRejection::InvalidQuantity { quantity: q }),
            Some(q) => u32::try_from(q).map_err(|_| ScanRejection::QuantityTooLarge { quantity: q })?,
        };

        Ok(NormalizedScan {
            barcode,
            product_id,
            product_name,
            unit_price,
            quantity,
            sale_unit,
            supplier: extras.supplier,
            site: extras.site,
            notes: extras.notes,
        })
    }
}

#[derive(Debug, Default)]
struct Extras {
    supplier: Option<String>,
    site: Option<String>,
    notes: Option<String>,
}
