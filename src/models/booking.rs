use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price_modifier::{ScopeRef, ALL_ROOMS, DEFAULT_CURRENCY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingMode {
    /// Preset duration, movable start date
    Fixed,
    /// Per-person pricing on a dated instance
    Flexible,
    /// Free start and end within the instance bounds
    Open,
}

/// The retreat or program an instance is an occurrence of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "parent_type", content = "parent_id", rename_all = "snake_case")]
pub enum InstanceParent {
    Retreat(ObjectId),
    Program(ObjectId),
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_min_guests() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookableInstance {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub parent: InstanceParent,
    pub property_id: ObjectId,
    pub host_id: ObjectId,
    pub base_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_min_guests")]
    pub min_guests: u32,
    pub max_guests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub booking_type: BookingMode,
    #[serde(default)]
    pub per_guest_pricing: bool,
}

impl BookableInstance {
    /// Ownership chain from the instance up to the host. Modifiers may hang off any level.
    pub fn scope_chain(&self) -> Vec<ScopeRef> {
        let (instance, parent) = match self.parent {
            InstanceParent::Retreat(id) => {
                (ScopeRef::RetreatInstance(self.id), ScopeRef::Retreat(id))
            }
            InstanceParent::Program(id) => {
                (ScopeRef::ProgramInstance(self.id), ScopeRef::Program(id))
            }
        };

        vec![
            instance,
            parent,
            ScopeRef::Property(self.property_id),
            ScopeRef::Host(self.host_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingContext {
    #[serde(with = "super::object_id")]
    pub instance_id: ObjectId,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guest_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

impl BookingContext {
    /// Room tag the guest asked for, `"all"` when unspecified.
    pub fn room_type(&self) -> &str {
        self.room_type.as_deref().unwrap_or(ALL_ROOMS)
    }

    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }

    /// Checks that hold regardless of which instance is being booked.
    pub fn validate(&self) -> Result<u32, String> {
        if self.check_out_date <= self.check_in_date {
            return Err(format!(
                "check-out date {} must be after check-in date {}",
                self.check_out_date, self.check_in_date
            ));
        }
        if self.guest_count < 1 {
            return Err("guest count must be at least 1".to_string());
        }

        u32::try_from(self.nights()).map_err(|_| "stay is too long".to_string())
    }

    /// Validate the context against the instance being booked, returning the night count.
    pub fn validate_against(&self, instance: &BookableInstance) -> Result<u32, String> {
        if self.instance_id != instance.id {
            return Err(format!(
                "context refers to instance {} but instance {} was supplied",
                self.instance_id, instance.id
            ));
        }

        let nights = self.validate()?;

        if self.guest_count < instance.min_guests || self.guest_count > instance.max_guests {
            return Err(format!(
                "guest count {} is outside the allowed range {}-{}",
                self.guest_count, instance.min_guests, instance.max_guests
            ));
        }

        match instance.booking_type {
            BookingMode::Fixed => {
                if let Some(duration) = instance.duration_nights {
                    if nights != duration {
                        return Err(format!(
                            "this booking lasts exactly {} nights, got {}",
                            duration, nights
                        ));
                    }
                }
            }
            BookingMode::Open => {
                if let Some(min) = instance.min_nights {
                    if nights < min {
                        return Err(format!("stay must be at least {} nights, got {}", min, nights));
                    }
                }
                if let Some(max) = instance.max_nights {
                    if nights > max {
                        return Err(format!("stay must be at most {} nights, got {}", max, nights));
                    }
                }
                self.check_window(instance)?;
            }
            BookingMode::Flexible => self.check_window(instance)?,
        }

        Ok(nights)
    }

    fn check_window(&self, instance: &BookableInstance) -> Result<(), String> {
        if let Some(start) = instance.start_date {
            if self.check_in_date < start {
                return Err(format!(
                    "check-in {} is before the instance opens on {}",
                    self.check_in_date, start
                ));
            }
        }
        if let Some(end) = instance.end_date {
            if self.check_out_date > end {
                return Err(format!(
                    "check-out {} is after the instance closes on {}",
                    self.check_out_date, end
                ));
            }
        }
        Ok(())
    }
}
