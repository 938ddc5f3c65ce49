use mongodb::bson::oid::ObjectId;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::booking::BookingMode;
use super::price_modifier::{AmountType, ModifierKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLineItem {
    pub label: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub amount: Decimal,
}

/// A `BASE_PRICE` or `BASE_MOD` modifier folded into the per-unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseAdjustment {
    #[serde(with = "super::object_id")]
    pub modifier_id: ObjectId,
    pub name: String,
    pub kind: ModifierKind,
    pub amount_type: AmountType,
    pub unit_price_before: Decimal,
    pub unit_price_after: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierLineItem {
    #[serde(with = "super::object_id")]
    pub modifier_id: ObjectId,
    pub name: String,
    pub kind: ModifierKind,
    pub amount_type: AmountType,
    pub applied_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub booking_mode: BookingMode,
    pub currency: String,
    pub nights: u32,
    pub guest_count: u32,
    pub stored_base_price: Decimal,
    pub effective_base_price: Decimal,
    pub base_adjustments: Vec<BaseAdjustment>,
    pub base_line_items: Vec<BaseLineItem>,
    pub modifier_line_items: Vec<ModifierLineItem>,
    /// Unrounded sum of every line item
    pub subtotal: Decimal,
    /// `subtotal` floored at zero and rounded half-to-even to currency precision
    pub total: Decimal,
}

impl PriceBreakdown {
    pub fn base_amount(&self) -> Decimal {
        self.base_line_items.iter().map(|item| item.amount).sum()
    }

    pub fn modifier_amount(&self) -> Decimal {
        self.modifier_line_items
            .iter()
            .map(|item| item.applied_amount)
            .sum()
    }

    /// Total in the currency's minor unit (cents for USD), as a payment gateway expects it.
    pub fn total_minor_units(&self) -> Option<i64> {
        let exponent = currency_exponent(&self.currency);
        (self.total * Decimal::from(10_i64.pow(exponent))).to_i64()
    }
}

/// Number of decimal places the currency is charged in.
pub fn currency_exponent(currency: &str) -> u32 {
    match currency.to_ascii_uppercase().as_str() {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
        _ => 2,
    }
}
