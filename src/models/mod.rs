pub mod booking;
pub mod breakdown;
pub mod object_id;
pub mod price_modifier;
