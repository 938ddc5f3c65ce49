use actix_web::{web, App};
use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use retreat_pricing_api::{
    models::{
        booking::{BookableInstance, BookingMode, InstanceParent},
        price_modifier::{AmountType, ModifierKind, PriceModifier, ScopeRef},
    },
    routes,
    services::{
        pricing_service::{PricingConfig, PricingService},
        store::memory::MemoryStore,
    },
};

pub const FIXED_INSTANCE_ID: &str = "65a1b2c3d4e5f60718293a01";
pub const FLEXIBLE_INSTANCE_ID: &str = "65a1b2c3d4e5f60718293a02";
pub const OPEN_INSTANCE_ID: &str = "65a1b2c3d4e5f60718293a03";

pub struct TestApp {
    pub store: MemoryStore,
    pub config: PricingConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(seeded_store())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            store,
            config: PricingConfig::default(),
        }
    }

    pub fn create_app(&self) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.store.clone()))
            .app_data(web::Data::new(PricingService::with_config(self.config.clone())))
            .configure(routes::configure::<MemoryStore>)
    }
}

pub fn oid(hex: &str) -> ObjectId {
    ObjectId::parse_str(hex).unwrap()
}

pub fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

pub fn instance(id: &str, mode: BookingMode, base_price: Decimal) -> BookableInstance {
    BookableInstance {
        id: oid(id),
        parent: InstanceParent::Retreat(ObjectId::new()),
        property_id: ObjectId::new(),
        host_id: ObjectId::new(),
        base_price,
        currency: "USD".to_string(),
        min_guests: 1,
        max_guests: 6,
        duration_nights: None,
        min_nights: None,
        max_nights: None,
        start_date: None,
        end_date: None,
        booking_type: mode,
        per_guest_pricing: false,
    }
}

pub fn modifier(
    name: &str,
    scope: ScopeRef,
    kind: ModifierKind,
    amount_type: AmountType,
    value: Decimal,
) -> PriceModifier {
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
        scope,
    }
}

/// Three instances, one per booking mode:
/// - fixed: $100/night for 3 nights, property cleaning fee $50, host tax 8%
/// - flexible: $200/person, 15% discount on the instance itself
/// - open: $90/person for 2-7 nights in June, two competing base price overrides
pub fn seeded_store() -> MemoryStore {
    let mut fixed = instance(FIXED_INSTANCE_ID, BookingMode::Fixed, dec!(100));
    fixed.duration_nights = Some(3);
    let fixed_chain = fixed.scope_chain();

    let flexible = instance(FLEXIBLE_INSTANCE_ID, BookingMode::Flexible, dec!(200));
    let flexible_chain = flexible.scope_chain();

    let mut open = instance(OPEN_INSTANCE_ID, BookingMode::Open, dec!(90));
    open.min_nights = Some(2);
    open.max_nights = Some(7);
    open.start_date = Some(date(6, 1));
    open.end_date = Some(date(6, 30));
    let open_chain = open.scope_chain();

    MemoryStore::new()
        .with_instance(fixed)
        .with_instance(flexible)
        .with_instance(open)
        .with_modifier(modifier(
            "Cleaning fee",
            fixed_chain[2],
            ModifierKind::Fee,
            AmountType::Fixed,
            dec!(50),
        ))
        .with_modifier(modifier(
            "Lodging tax",
            fixed_chain[3],
            ModifierKind::Tax,
            AmountType::Percent,
            dec!(8),
        ))
        .with_modifier(modifier(
            "Early bird",
            flexible_chain[0],
            ModifierKind::Discount,
            AmountType::Percent,
            dec!(15),
        ))
        .with_modifier(modifier(
            "Summer rate",
            open_chain[1],
            ModifierKind::BasePrice,
            AmountType::Fixed,
            dec!(110),
        ))
        .with_modifier(modifier(
            "Host promo rate",
            open_chain[3],
            ModifierKind::BasePrice,
            AmountType::Percent,
            dec!(10),
        ))
}
