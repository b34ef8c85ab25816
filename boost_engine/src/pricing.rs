//! Order pricing.
//!
//! Prices are a pure function of the kind of service requested (a rank-to-rank climb or a flat service) and the order
//! priority. All arithmetic is carried out in integer cents, so `total_price == base_price + platform_fee` always holds
//! exactly.
use bm_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{NewOrder, OrderPriority};

pub const DEFAULT_RANK_BOOST_BASE: i64 = 5_000;
pub const DEFAULT_FLAT_SERVICE_BASE: i64 = 2_500;
pub const DEFAULT_PLATFORM_FEE_PERCENT: i64 = 15;

/// The tunable parameters of the price calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Base price of a boost between two ranks.
    pub rank_boost_base: Money,
    /// Base price of any other service.
    pub flat_service_base: Money,
    /// The platform's cut, in whole percent of the (priority-adjusted) base price.
    pub platform_fee_percent: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            rank_boost_base: Money::from(DEFAULT_RANK_BOOST_BASE),
            flat_service_base: Money::from(DEFAULT_FLAT_SERVICE_BASE),
            platform_fee_percent: DEFAULT_PLATFORM_FEE_PERCENT,
        }
    }
}

/// The information a price quote depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub rank_boost: bool,
    #[serde(default)]
    pub priority: OrderPriority,
}

impl From<&NewOrder> for QuoteRequest {
    fn from(order: &NewOrder) -> Self {
        Self { rank_boost: order.is_rank_boost(), priority: order.priority }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub service_cost: Money,
    pub priority_fee: Money,
    pub platform_fee_percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCalculation {
    pub base_price: Money,
    pub platform_fee: Money,
    pub total_price: Money,
    pub breakdown: Breakdown,
}

/// The priority surcharge, in percent of the service cost.
pub fn priority_multiplier_percent(priority: OrderPriority) -> i64 {
    match priority {
        OrderPriority::Low | OrderPriority::Normal => 100,
        OrderPriority::High => 120,
        OrderPriority::Urgent => 150,
    }
}

impl PricingPolicy {
    pub fn quote(&self, request: QuoteRequest) -> PriceCalculation {
        let service_cost = if request.rank_boost { self.rank_boost_base } else { self.flat_service_base };
        let base_price = service_cost.scale_percent(priority_multiplier_percent(request.priority));
        let platform_fee = base_price.scale_percent(self.platform_fee_percent);
        let total_price = base_price + platform_fee;
        PriceCalculation {
            base_price,
            platform_fee,
            total_price,
            breakdown: Breakdown {
                service_cost,
                priority_fee: base_price - service_cost,
                platform_fee_percentage: self.platform_fee_percent,
            },
        }
    }

    pub fn quote_order(&self, order: &NewOrder) -> PriceCalculation {
        self.quote(QuoteRequest::from(order))
    }
}
