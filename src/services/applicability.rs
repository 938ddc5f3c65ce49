use crate::models::{
    booking::BookingContext,
    price_modifier::{ModifierKind, PriceModifier},
};

/// Whether `modifier` matches the date range, guest count and room type of `context`.
///
/// A date-scoped modifier applies in full as soon as a single night of the stay
/// falls inside its range; it is not pro-rated by overlapping nights.
pub fn is_applicable(modifier: &PriceModifier, context: &BookingContext) -> bool {
    let dates_match = modifier
        .date_range
        .map_or(true, |range| {
            range.overlaps_stay(context.check_in_date, context.check_out_date)
        });

    let guests_match = modifier
        .guest_range
        .map_or(true, |range| range.contains(context.guest_count));

    let room_matches =
        modifier.applies_to_all_rooms() || modifier.room_type == context.room_type();

    dates_match && guests_match && room_matches
}

/// Applicable adjustment modifiers, in application order:
/// `BASE_MOD`, `DISCOUNT`, `FEE`, `TAX`, `ADDON`.
///
/// `BASE_PRICE` modifiers are left out; see [`base_overrides`]. The sort is
/// stable, so modifiers of the same kind keep the order they were fetched in.
pub fn filter_applicable(modifiers: &[PriceModifier], context: &BookingContext) -> Vec<PriceModifier> {
    let mut applicable: Vec<PriceModifier> = modifiers
        .iter()
        .filter(|modifier| modifier.kind != ModifierKind::BasePrice)
        .filter(|modifier| is_applicable(modifier, context))
        .cloned()
        .collect();

    applicable.sort_by_key(|modifier| modifier.kind.precedence());
    applicable
}

/// Applicable `BASE_PRICE` modifiers, in fetch order.
pub fn base_overrides(modifiers: &[PriceModifier], context: &BookingContext) -> Vec<PriceModifier> {
    modifiers
        .iter()
        .filter(|modifier| modifier.kind == ModifierKind::BasePrice)
        .filter(|modifier| is_applicable(modifier, context))
        .cloned()
        .collect()
}
