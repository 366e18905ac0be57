use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use packflow_inventory::{CapacityUsage, InventoryItem, SkuName};

use crate::params::{DoiGoal, SafetyBufferRatio, TieBreak};
use crate::record::ForecastRecord;

/// DOI reported for SKUs that have stock but no sales velocity (sorts last).
pub const DOI_NO_VELOCITY: i64 = 999;

/// Order suggestion for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1-based urgency rank (1 = lowest DOI).
    pub rank: usize,
    pub sku: SkuName,
    pub supplier: String,
    pub units_per_pallet: i64,
    pub warehouse_quantity: i64,
    pub supplier_quantity: i64,
    pub max_warehouse_capacity: i64,
    pub daily_sales_rate: f64,
    pub current_doi: i64,
    pub forecasted_units_needed: f64,
    pub recommended_order_qty: i64,
    pub pallets: i64,
    pub inventory_percentage_after_order: CapacityUsage,
}

/// Ranked recommendations plus the parameters they were computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub doi_goal: DoiGoal,
    pub safety_buffer: SafetyBufferRatio,
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationSet {
    pub fn get(&self, sku: &SkuName) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| &r.sku == sku)
    }

    /// Recommendations for one supplier, keeping rank order.
    pub fn for_supplier<'a>(
        &'a self,
        supplier: &'a str,
    ) -> impl Iterator<Item = &'a Recommendation> {
        self.recommendations.iter().filter(move |r| r.supplier == supplier)
    }
}

/// Turns inventory + forecast snapshots into DOI-ranked order recommendations.
///
/// Model:
/// - `daily_sales_rate` is the sum over every product consuming the SKU.
/// - `current_doi = round(on_hand / rate)`; with no velocity, stocked SKUs get
///   [`DOI_NO_VELOCITY`] and empty SKUs get 0 (potential stockout blind spot).
/// - `recommended_order_qty` is the forecast value rounded, never negative.
/// - Output is sorted ascending by DOI; ties follow [`TieBreak`].
#[derive(Debug, Clone, Default)]
pub struct ForecastRecommender {
    doi_goal: DoiGoal,
    safety_buffer: SafetyBufferRatio,
    tie_break: TieBreak,
}

impl ForecastRecommender {
    pub fn new(doi_goal: DoiGoal, safety_buffer: SafetyBufferRatio) -> Self {
        Self {
            doi_goal,
            safety_buffer,
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn doi_goal(&self) -> DoiGoal {
        self.doi_goal
    }

    pub fn safety_buffer(&self) -> SafetyBufferRatio {
        self.safety_buffer
    }

    pub fn recommend(
        &self,
        inventory: &[InventoryItem],
        forecast: &[ForecastRecord],
    ) -> RecommendationSet {
        // First record wins if the forecast repeats a SKU.
        let mut by_sku: HashMap<&SkuName, &ForecastRecord> = HashMap::with_capacity(forecast.len());
        for record in forecast {
            by_sku.entry(&record.sku).or_insert(record);
        }

        let mut recommendations: Vec<Recommendation> = inventory
            .iter()
            .map(|item| recommend_item(item, by_sku.get(item.sku()).copied()))
            .collect();

        // `sort_by` is stable, so equal DOIs keep input order.
        match self.tie_break {
            TieBreak::InputOrder => recommendations.sort_by_key(|r| r.current_doi),
            TieBreak::SkuName => recommendations
                .sort_by(|a, b| a.current_doi.cmp(&b.current_doi).then_with(|| a.sku.cmp(&b.sku))),
        }

        for (idx, r) in recommendations.iter_mut().enumerate() {
            r.rank = idx + 1;
        }

        RecommendationSet {
            doi_goal: self.doi_goal,
            safety_buffer: self.safety_buffer,
            recommendations,
        }
    }
}

fn recommend_item(item: &InventoryItem, record: Option<&ForecastRecord>) -> Recommendation {
    let on_hand = item.warehouse_quantity();
    let daily_sales_rate = record.map(ForecastRecord::daily_sales_rate).unwrap_or(0.0);
    let recommended_order_qty = record
        .map(|r| rounded_quantity(r.recommended_order_qty))
        .unwrap_or(0);

    Recommendation {
        rank: 0,
        sku: item.sku().clone(),
        supplier: item.supplier().to_string(),
        units_per_pallet: item.units_per_pallet(),
        warehouse_quantity: on_hand,
        supplier_quantity: item.supplier_quantity(),
        max_warehouse_capacity: item.max_warehouse_capacity(),
        daily_sales_rate,
        current_doi: days_of_inventory(on_hand, daily_sales_rate),
        forecasted_units_needed: record.map(|r| r.forecasted_units_needed).unwrap_or(0.0),
        recommended_order_qty,
        pallets: item.pallets_for(recommended_order_qty),
        inventory_percentage_after_order: item.usage_after(recommended_order_qty),
    }
}

/// Days of inventory at the current sales velocity.
pub fn days_of_inventory(on_hand: i64, daily_sales_rate: f64) -> i64 {
    if daily_sales_rate > 0.0 {
        (on_hand as f64 / daily_sales_rate).round() as i64
    } else if on_hand > 0 {
        DOI_NO_VELOCITY
    } else {
        0
    }
}

fn rounded_quantity(value: f64) -> i64 {
    if value.is_finite() && value > 0.0 {
        value.round() as i64
    } else {
        0
    }
}
