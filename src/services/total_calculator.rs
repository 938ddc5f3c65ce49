use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    booking::{BookableInstance, BookingMode},
    breakdown::{currency_exponent, BaseAdjustment, BaseLineItem, ModifierLineItem, PriceBreakdown},
    price_modifier::{AmountType, ModifierKind, PriceModifier},
};
use crate::services::pricing_error::PricingError;

/// Everything the calculator needs to know about the booking besides its modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalRequest {
    pub base_price: Decimal,
    pub nights: u32,
    pub guest_count: u32,
    pub booking_mode: BookingMode,
    /// Fixed-mode instances priced per night *and* per guest
    pub per_guest: bool,
    pub currency: String,
}

impl TotalRequest {
    pub fn for_instance(instance: &BookableInstance, nights: u32, guest_count: u32) -> Self {
        Self {
            base_price: instance.base_price,
            nights,
            guest_count,
            booking_mode: instance.booking_type,
            per_guest: instance.per_guest_pricing,
            currency: instance.currency.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TotalCalculator {
    /// Reject quotes where more than one `BASE_PRICE` override applies instead of chaining them
    pub strict_base_overrides: bool,
}

impl Default for TotalCalculator {
    fn default() -> Self {
        Self {
            strict_base_overrides: true,
        }
    }
}

impl TotalCalculator {
    pub fn new(strict_base_overrides: bool) -> Self {
        Self {
            strict_base_overrides,
        }
    }

    /// Combine the base price with the applicable modifiers into an itemized breakdown.
    ///
    /// Base modifiers (`BASE_PRICE`, then `BASE_MOD`) rewrite the per-unit price first.
    /// Every other modifier is then resolved against the running total and added to it
    /// immediately, so percentages compound on earlier adjustments. Only the final
    /// total is rounded.
    pub fn compute_total(
        &self,
        request: &TotalRequest,
        modifiers: &[PriceModifier],
    ) -> Result<PriceBreakdown, PricingError> {
        if request.nights == 0 {
            return Err(PricingError::InvalidBookingContext(
                "number of nights must be positive".to_string(),
            ));
        }
        if request.guest_count == 0 {
            return Err(PricingError::InvalidBookingContext(
                "guest count must be positive".to_string(),
            ));
        }

        self.check_currencies(request, modifiers)?;

        let (mut base_modifiers, mut adjustments): (Vec<&PriceModifier>, Vec<&PriceModifier>) =
            modifiers.iter().partition(|modifier| modifier.kind.adjusts_base());
        base_modifiers.sort_by_key(|modifier| modifier.kind.precedence());
        adjustments.sort_by_key(|modifier| modifier.kind.precedence());

        if self.strict_base_overrides {
            let overrides: Vec<String> = base_modifiers
                .iter()
                .filter(|modifier| modifier.kind == ModifierKind::BasePrice)
                .map(|modifier| modifier.id.to_hex())
                .collect();
            if overrides.len() > 1 {
                return Err(PricingError::AmbiguousBaseOverride {
                    modifier_ids: overrides,
                });
            }
        }

        let mut unit_price = request.base_price;
        let mut base_adjustments = Vec::with_capacity(base_modifiers.len());
        for modifier in base_modifiers {
            let adjusted = modifier
                .resolve_unit_price(unit_price)
                .ok_or_else(|| out_of_range(modifier))?;
            base_adjustments.push(BaseAdjustment {
                modifier_id: modifier.id,
                name: modifier.name.clone(),
                kind: modifier.kind,
                amount_type: modifier.amount_type,
                unit_price_before: unit_price,
                unit_price_after: adjusted,
            });
            unit_price = adjusted;
        }

        let base_line_items = base_line_items(request, unit_price)?;
        let mut running_total = base_line_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.amount))
            .ok_or_else(|| {
                PricingError::AmountOutOfRange("base amount exceeds the supported range".to_string())
            })?;

        let mut modifier_line_items = Vec::with_capacity(adjustments.len());
        for modifier in adjustments {
            let applied_amount = modifier
                .resolve_against(running_total)
                .ok_or_else(|| out_of_range(modifier))?;
            running_total = running_total
                .checked_add(applied_amount)
                .ok_or_else(|| out_of_range(modifier))?;
            modifier_line_items.push(ModifierLineItem {
                modifier_id: modifier.id,
                name: modifier.name.clone(),
                kind: modifier.kind,
                amount_type: modifier.amount_type,
                applied_amount,
            });
        }

        let total = round_total(running_total, &request.currency);

        log::debug!(
            "Computed {:?} total {} {} from unit price {} ({} base adjustments, {} modifiers)",
            request.booking_mode,
            total,
            request.currency,
            unit_price,
            base_adjustments.len(),
            modifier_line_items.len()
        );

        Ok(PriceBreakdown {
            booking_mode: request.booking_mode,
            currency: request.currency.clone(),
            nights: request.nights,
            guest_count: request.guest_count,
            stored_base_price: request.base_price,
            effective_base_price: unit_price,
            base_adjustments,
            base_line_items,
            modifier_line_items,
            subtotal: running_total,
            total,
        })
    }

    fn check_currencies(
        &self,
        request: &TotalRequest,
        modifiers: &[PriceModifier],
    ) -> Result<(), PricingError> {
        // Percentages carry no currency
        match modifiers.iter().find(|modifier| {
            modifier.amount_type == AmountType::Fixed
                && !modifier.currency.eq_ignore_ascii_case(&request.currency)
        }) {
            Some(modifier) => Err(PricingError::CurrencyMismatch {
                expected: request.currency.clone(),
                found: modifier.currency.clone(),
                modifier_id: modifier.id.to_hex(),
            }),
            None => Ok(()),
        }
    }
}

fn out_of_range(modifier: &PriceModifier) -> PricingError {
    PricingError::AmountOutOfRange(format!(
        "applying modifier {} ({}) exceeds the supported range",
        modifier.id, modifier.name
    ))
}

fn base_line_items(request: &TotalRequest, unit_price: Decimal) -> Result<Vec<BaseLineItem>, PricingError> {
    let nights = request.nights;
    let guests = request.guest_count;

    let (label, quantity) = match request.booking_mode {
        BookingMode::Fixed if request.per_guest => (
            format!("{} nights × {} guests", nights, guests),
            nights.checked_mul(guests),
        ),
        BookingMode::Fixed => (format!("{} nights", nights), Some(nights)),
        // Nights are informational only for per-person modes
        BookingMode::Flexible | BookingMode::Open => (format!("{} guests", guests), Some(guests)),
    };

    let quantity = quantity.ok_or_else(|| {
        PricingError::AmountOutOfRange(format!("{} exceeds the supported quantity", label))
    })?;
    let amount = unit_price.checked_mul(Decimal::from(quantity)).ok_or_else(|| {
        PricingError::AmountOutOfRange(format!("{} at {} exceeds the supported range", label, unit_price))
    })?;

    Ok(vec![BaseLineItem {
        label,
        unit_price,
        quantity,
        amount,
    }])
}

/// Floor at zero, then round half-to-even to the currency's precision.
/// The result always carries exactly that many decimal places.
pub fn round_total(amount: Decimal, currency: &str) -> Decimal {
    let exponent = currency_exponent(currency);
    let mut rounded = amount
        .max(Decimal::ZERO)
        .round_dp_with_strategy(exponent, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(exponent);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price_modifier::ScopeRef;
    use mongodb::bson::oid::ObjectId;
    use rust_decimal_macros::dec;

    fn modifier(name: &str, kind: ModifierKind, amount_type: AmountType, value: Decimal) -> PriceModifier {
        PriceModifier {
            id: ObjectId::new(),
            name: name.to_string(),
            description: String::new(),
            kind,
            amount_type,
            value,
            currency: "USD".to_string(),
            date_range: None,
            guest_range: None,
            room_type: "all".to_string(),
            scope: ScopeRef::Property(ObjectId::new()),
        }
    }

    fn request(mode: BookingMode, base_price: Decimal, nights: u32, guests: u32) -> TotalRequest {
        TotalRequest {
            base_price,
            nights,
            guest_count: guests,
            booking_mode: mode,
            per_guest: false,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_no_modifier_baseline() {
        let calculator = TotalCalculator::default();

        let fixed = calculator
            .compute_total(&request(BookingMode::Fixed, dec!(120), 4, 3), &[])
            .unwrap();
        assert_eq!(fixed.total, dec!(480));

        let mut per_guest = request(BookingMode::Fixed, dec!(120), 4, 3);
        per_guest.per_guest = true;
        let per_guest = calculator.compute_total(&per_guest, &[]).unwrap();
        assert_eq!(per_guest.total, dec!(1440));
        assert_eq!(per_guest.base_line_items[0].quantity, 12);

        let flexible = calculator
            .compute_total(&request(BookingMode::Flexible, dec!(120), 4, 3), &[])
            .unwrap();
        assert_eq!(flexible.total, dec!(360));

        let open = calculator
            .compute_total(&request(BookingMode::Open, dec!(120), 9, 2), &[])
            .unwrap();
        assert_eq!(open.total, dec!(240));
    }

    #[test]
    fn test_fixed_scenario_fee_then_tax() {
        let modifiers = vec![
            modifier("Tax", ModifierKind::Tax, AmountType::Percent, dec!(8)),
            modifier("Cleaning fee", ModifierKind::Fee, AmountType::Fixed, dec!(50)),
        ];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Fixed, dec!(100), 3, 2), &modifiers)
            .unwrap();

        assert_eq!(breakdown.base_amount(), dec!(300));
        assert_eq!(breakdown.modifier_line_items[0].name, "Cleaning fee");
        assert_eq!(breakdown.modifier_line_items[0].applied_amount, dec!(50));
        assert_eq!(breakdown.modifier_line_items[1].applied_amount, dec!(28));
        assert_eq!(breakdown.total, dec!(378.00));
        assert_eq!(breakdown.total.to_string(), "378.00");
        assert_eq!(breakdown.total_minor_units(), Some(37800));
    }

    #[test]
    fn test_flexible_scenario_discount() {
        let modifiers = vec![modifier(
            "Early bird",
            ModifierKind::Discount,
            AmountType::Percent,
            dec!(15),
        )];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Flexible, dec!(200), 3, 3), &modifiers)
            .unwrap();

        assert_eq!(breakdown.base_amount(), dec!(600));
        assert_eq!(breakdown.modifier_line_items[0].applied_amount, dec!(-90));
        assert_eq!(breakdown.total, dec!(510.00));
    }

    #[test]
    fn test_percentages_compound_on_running_total() {
        let modifiers = vec![
            modifier("Service", ModifierKind::Fee, AmountType::Percent, dec!(10)),
            modifier("Resort", ModifierKind::Fee, AmountType::Percent, dec!(10)),
        ];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Flexible, dec!(100), 1, 1), &modifiers)
            .unwrap();

        assert_eq!(breakdown.total, dec!(121));
        assert_eq!(breakdown.modifier_line_items[1].applied_amount, dec!(11));
    }

    #[test]
    fn test_total_floored_at_zero() {
        let modifiers = vec![modifier(
            "Comp stay",
            ModifierKind::Discount,
            AmountType::Fixed,
            dec!(500),
        )];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Fixed, dec!(100), 2, 1), &modifiers)
            .unwrap();

        assert_eq!(breakdown.subtotal, dec!(-300));
        assert_eq!(breakdown.total, Decimal::ZERO);
        assert_eq!(breakdown.total.to_string(), "0.00");
        assert!(!breakdown.total.is_sign_negative());
    }

    #[test]
    fn test_rounding_is_half_to_even_at_the_end() {
        assert_eq!(round_total(dec!(33.335), "USD"), dec!(33.34));
        assert_eq!(round_total(dec!(33.345), "USD"), dec!(33.34));
        assert_eq!(round_total(dec!(0.125), "USD"), dec!(0.12));
        assert_eq!(round_total(dec!(0.135), "USD"), dec!(0.14));
        assert_eq!(round_total(dec!(1234.5), "JPY"), dec!(1234));
        assert_eq!(round_total(dec!(33.335), "USD").to_string(), "33.34");

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Flexible, dec!(33.335), 1, 1), &[])
            .unwrap();
        assert_eq!(breakdown.subtotal, dec!(33.335));
        assert_eq!(breakdown.total, dec!(33.34));
    }

    #[test]
    fn test_intermediate_values_keep_precision() {
        // 3 x 10.005 = 30.015, +10% = 33.0165
        let modifiers = vec![modifier("Tax", ModifierKind::Tax, AmountType::Percent, dec!(10))];
        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Flexible, dec!(10.005), 1, 3), &modifiers)
            .unwrap();

        assert_eq!(breakdown.modifier_line_items[0].applied_amount, dec!(3.0015));
        assert_eq!(breakdown.subtotal, dec!(33.0165));
        assert_eq!(breakdown.total, dec!(33.02));
    }

    #[test]
    fn test_base_mod_adjusts_unit_price() {
        let modifiers = vec![
            modifier("Fee", ModifierKind::Fee, AmountType::Fixed, dec!(25)),
            modifier("High season", ModifierKind::BaseMod, AmountType::Percent, dec!(20)),
        ];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Fixed, dec!(150), 2, 2), &modifiers)
            .unwrap();

        // +20% on the nightly rate, not 20% of it
        assert_eq!(breakdown.effective_base_price, dec!(180));
        assert_eq!(breakdown.base_adjustments.len(), 1);
        assert_eq!(breakdown.base_adjustments[0].unit_price_before, dec!(150));
        assert_eq!(breakdown.base_adjustments[0].unit_price_after, dec!(180));
        assert_eq!(breakdown.base_amount(), dec!(360));
        assert_eq!(breakdown.modifier_line_items.len(), 1);
        assert_eq!(breakdown.total, dec!(385));
    }

    #[test]
    fn test_base_price_applies_before_base_mod() {
        let modifiers = vec![
            modifier("Holiday", ModifierKind::BaseMod, AmountType::Percent, dec!(50)),
            modifier("Summer rate", ModifierKind::BasePrice, AmountType::Fixed, dec!(180)),
        ];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Flexible, dec!(100), 3, 1), &modifiers)
            .unwrap();

        assert_eq!(breakdown.base_adjustments[0].name, "Summer rate");
        assert_eq!(breakdown.effective_base_price, dec!(270));
        assert_eq!(breakdown.total, dec!(270));
    }

    #[test]
    fn test_multiple_base_overrides() {
        let modifiers = vec![
            modifier("Summer rate", ModifierKind::BasePrice, AmountType::Fixed, dec!(180)),
            modifier("Promo rate", ModifierKind::BasePrice, AmountType::Percent, dec!(50)),
        ];
        let request = request(BookingMode::Flexible, dec!(100), 3, 1);

        let strict = TotalCalculator::default().compute_total(&request, &modifiers);
        match strict {
            Err(PricingError::AmbiguousBaseOverride { modifier_ids }) => {
                assert_eq!(modifier_ids.len(), 2)
            }
            other => panic!("expected ambiguous override, got {:?}", other),
        }

        let chained = TotalCalculator::new(false)
            .compute_total(&request, &modifiers)
            .unwrap();
        // 180, then +50%
        assert_eq!(chained.effective_base_price, dec!(270));
    }

    #[test]
    fn test_multiple_base_mods_chain() {
        let modifiers = vec![
            modifier("Weekend", ModifierKind::BaseMod, AmountType::Percent, dec!(10)),
            modifier("Peak", ModifierKind::BaseMod, AmountType::Percent, dec!(20)),
        ];

        let breakdown = TotalCalculator::default()
            .compute_total(&request(BookingMode::Open, dec!(100), 2, 1), &modifiers)
            .unwrap();
        assert_eq!(breakdown.effective_base_price, dec!(132));
    }

    #[test]
    fn test_per_guest_quantity_overflow_is_an_error() {
        let mut request = request(BookingMode::Fixed, dec!(100), 100_000, 50_000);
        request.per_guest = true;

        let result = TotalCalculator::default().compute_total(&request, &[]);
        assert!(matches!(result, Err(PricingError::AmountOutOfRange(_))));
    }

    #[test]
    fn test_base_amount_overflow_is_an_error() {
        let request = request(
            BookingMode::Fixed,
            Decimal::from_i128_with_scale(79_000_000_000_000_000_000_000_000, 0),
            10_000,
            1,
        );

        let result = TotalCalculator::default().compute_total(&request, &[]);
        assert!(matches!(result, Err(PricingError::AmountOutOfRange(_))));
    }

    #[test]
    fn test_modifier_overflow_is_an_error() {
        let request = request(BookingMode::Flexible, dec!(1000000), 1, 1);

        let surcharge = modifier("Surge", ModifierKind::Fee, AmountType::Percent, Decimal::MAX);
        let result = TotalCalculator::default().compute_total(&request, &[surcharge]);
        assert!(matches!(result, Err(PricingError::AmountOutOfRange(_))));

        let fees = vec![
            modifier("Fee", ModifierKind::Fee, AmountType::Fixed, Decimal::MAX),
            modifier("Tax", ModifierKind::Tax, AmountType::Fixed, Decimal::MAX),
        ];
        let result = TotalCalculator::default().compute_total(&request, &fees);
        assert!(matches!(result, Err(PricingError::AmountOutOfRange(_))));
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let calculator = TotalCalculator::default();
        assert!(matches!(
            calculator.compute_total(&request(BookingMode::Fixed, dec!(100), 0, 2), &[]),
            Err(PricingError::InvalidBookingContext(_))
        ));
        assert!(matches!(
            calculator.compute_total(&request(BookingMode::Open, dec!(100), 2, 0), &[]),
            Err(PricingError::InvalidBookingContext(_))
        ));
    }

    #[test]
    fn test_currency_mismatch_on_fixed_amounts() {
        let mut fee = modifier("Fee", ModifierKind::Fee, AmountType::Fixed, dec!(20));
        fee.currency = "EUR".to_string();
        let result = TotalCalculator::default()
            .compute_total(&request(BookingMode::Fixed, dec!(100), 1, 1), &[fee]);
        assert!(matches!(result, Err(PricingError::CurrencyMismatch { .. })));

        let mut tax = modifier("Tax", ModifierKind::Tax, AmountType::Percent, dec!(5));
        tax.currency = "EUR".to_string();
        let result = TotalCalculator::default()
            .compute_total(&request(BookingMode::Fixed, dec!(100), 1, 1), &[tax]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_idempotent() {
        let modifiers = vec![
            modifier("Tax", ModifierKind::Tax, AmountType::Percent, dec!(7.5)),
            modifier("Discount", ModifierKind::Discount, AmountType::Fixed, dec!(12.5)),
        ];
        let calculator = TotalCalculator::default();
        let request = request(BookingMode::Fixed, dec!(99.99), 3, 2);

        let first = calculator.compute_total(&request, &modifiers).unwrap();
        let second = calculator.compute_total(&request, &modifiers).unwrap();
        assert_eq!(first, second);
    }
}
