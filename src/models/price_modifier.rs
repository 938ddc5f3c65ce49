use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Room-type tag that matches every room.
pub const ALL_ROOMS: &str = "all";

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierKind {
    BasePrice,
    Discount,
    Fee,
    Tax,
    Addon,
    BaseMod,
}

impl ModifierKind {
    /// Position in the application order. `BASE_PRICE` sorts ahead of everything
    /// because it replaces the stored price before `BASE_MOD` adjusts it.
    pub fn precedence(&self) -> u8 {
        match self {
            ModifierKind::BasePrice => 0,
            ModifierKind::BaseMod => 1,
            ModifierKind::Discount => 2,
            ModifierKind::Fee => 3,
            ModifierKind::Tax => 4,
            ModifierKind::Addon => 5,
        }
    }

    /// Whether the modifier acts on the per-unit price rather than the running total.
    pub fn adjusts_base(&self) -> bool {
        matches!(self, ModifierKind::BasePrice | ModifierKind::BaseMod)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmountType {
    Fixed,
    Percent,
}

/// Inclusive calendar range a modifier is limited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// True when any night of the stay `[check_in, check_out)` falls inside the range.
    pub fn overlaps_stay(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        check_in <= self.end && check_out > self.start
    }
}

/// Inclusive guest-count bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRange {
    pub min: u32,
    pub max: u32,
}

impl GuestRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, guests: u32) -> bool {
        (self.min..=self.max).contains(&guests)
    }
}

/// The single entity a modifier is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope_type", content = "scope_id", rename_all = "snake_case")]
pub enum ScopeRef {
    Host(ObjectId),
    Property(ObjectId),
    Program(ObjectId),
    Retreat(ObjectId),
    ProgramInstance(ObjectId),
    RetreatInstance(ObjectId),
}

impl ScopeRef {
    pub fn scope_type(&self) -> &str {
        match self {
            ScopeRef::Host(_) => "host",
            ScopeRef::Property(_) => "property",
            ScopeRef::Program(_) => "program",
            ScopeRef::Retreat(_) => "retreat",
            ScopeRef::ProgramInstance(_) => "program_instance",
            ScopeRef::RetreatInstance(_) => "retreat_instance",
        }
    }

    pub fn scope_id(&self) -> ObjectId {
        match self {
            ScopeRef::Host(id)
            | ScopeRef::Property(id)
            | ScopeRef::Program(id)
            | ScopeRef::Retreat(id)
            | ScopeRef::ProgramInstance(id)
            | ScopeRef::RetreatInstance(id) => *id,
        }
    }
}

fn default_room_type() -> String {
    ALL_ROOMS.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceModifier {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ModifierKind,
    pub amount_type: AmountType,
    pub value: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_range: Option<GuestRange>,
    #[serde(default = "default_room_type")]
    pub room_type: String,
    pub scope: ScopeRef,
}

impl PriceModifier {
    pub fn applies_to_all_rooms(&self) -> bool {
        self.room_type.eq_ignore_ascii_case(ALL_ROOMS)
    }

    /// Non-negative size of the adjustment. Stored values are expected to be
    /// non-negative already; the direction always comes from `kind`.
    pub fn magnitude(&self) -> Decimal {
        self.value.abs()
    }

    /// Resolve the currency amount this modifier adds to `running_total`.
    /// Only meaningful for kinds that act on the running total. `None` when the
    /// amount does not fit in a `Decimal`.
    pub fn resolve_against(&self, running_total: Decimal) -> Option<Decimal> {
        let amount = match self.amount_type {
            AmountType::Fixed => self.magnitude(),
            AmountType::Percent => percent_of(running_total, self.magnitude())?,
        };

        match self.kind {
            ModifierKind::Discount => Some(-amount),
            _ => Some(amount),
        }
    }

    /// Resolve the new per-unit price this base modifier produces. A fixed
    /// value replaces the price; a percentage raises it by that many points.
    pub fn resolve_unit_price(&self, unit_price: Decimal) -> Option<Decimal> {
        match self.amount_type {
            AmountType::Fixed => Some(self.magnitude()),
            AmountType::Percent => {
                unit_price.checked_add(percent_of(unit_price, self.magnitude())?)
            }
        }
    }
}

fn percent_of(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}
