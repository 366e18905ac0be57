use serde::{Deserialize, Serialize};

use packflow_inventory::SkuName;

/// Daily consumption of one SKU by one finished product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDemand {
    pub product: String,
    pub sku: SkuName,
    pub daily_sales_rate: f64,
}

/// Forecast requirements for one SKU at a given DOI goal / safety buffer.
///
/// Produced by the forecast service; derived, never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub sku: SkuName,
    pub recommended_order_qty: f64,
    pub forecasted_units_needed: f64,
    pub current_inventory: i64,
    /// Every product consuming this SKU.
    #[serde(default)]
    pub demand: Vec<ProductDemand>,
}

impl ForecastRecord {
    /// Sum of the consuming products' daily sales (0 when nothing consumes the SKU).
    pub fn daily_sales_rate(&self) -> f64 {
        self.demand
            .iter()
            .map(|d| d.daily_sales_rate)
            .filter(|r| r.is_finite() && *r > 0.0)
            .sum()
    }
}
