//! Booking context accumulated across turns
//!
//! Recognized slots are typed fields. Keys the caller sends that the flow
//! does not know about are kept in `extra` and echoed back untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::reference::BookingReference;

/// Closed set of slot keys the booking flow reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    City,
    Outlet,
    ReservationText,
    PartySize,
    Contact,
    BookingConfirmed,
    BookingReference,
}

impl ContextKey {
    pub const ALL: [ContextKey; 7] = [
        ContextKey::City,
        ContextKey::Outlet,
        ContextKey::ReservationText,
        ContextKey::PartySize,
        ContextKey::Contact,
        ContextKey::BookingConfirmed,
        ContextKey::BookingReference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::City => "city",
            ContextKey::Outlet => "outlet",
            ContextKey::ReservationText => "reservation_text",
            ContextKey::PartySize => "party_size",
            ContextKey::Contact => "contact",
            ContextKey::BookingConfirmed => "booking_confirmed",
            ContextKey::BookingReference => "booking_reference",
        }
    }
}

/// Typed booking slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingContext {
    /// City id from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Outlet id, scoped to `city`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
    /// Message that carried the date and time, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
    /// Message that carried the phone number, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_reference: Option<BookingReference>,
    /// Caller keys outside the booking slots
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BookingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_outlet(mut self, outlet: impl Into<String>) -> Self {
        self.outlet = Some(outlet.into());
        self
    }

    pub fn is_set(&self, key: ContextKey) -> bool {
        match key {
            ContextKey::City => self.city.is_some(),
            ContextKey::Outlet => self.outlet.is_some(),
            ContextKey::ReservationText => self.reservation_text.is_some(),
            ContextKey::PartySize => self.party_size.is_some(),
            ContextKey::Contact => self.contact.is_some(),
            ContextKey::BookingConfirmed => self.booking_confirmed.is_some(),
            ContextKey::BookingReference => self.booking_reference.is_some(),
        }
    }

    /// Slot keys currently holding a value
    pub fn filled_keys(&self) -> BTreeSet<ContextKey> {
        ContextKey::ALL
            .iter()
            .copied()
            .filter(|key| self.is_set(*key))
            .collect()
    }

    /// Drop everything collected after the city step. `city` and `extra` survive.
    pub fn clear_booking_slots(&mut self) {
        self.outlet = None;
        self.reservation_text = None;
        self.party_size = None;
        self.contact = None;
        self.booking_confirmed = None;
        self.booking_reference = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_round_trip() {
        let raw = json!({
            "city": "delhi",
            "party_size": 4,
            "source": "web",
            "campaign": {"id": 7}
        });
        let ctx: BookingContext = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(ctx.city.as_deref(), Some("delhi"));
        assert_eq!(ctx.party_size, Some(4));
        assert_eq!(ctx.extra.len(), 2);
        assert_eq!(serde_json::to_value(&ctx).unwrap(), raw);
    }

    #[test]
    fn test_empty_context_serializes_to_empty_object() {
        let value = serde_json::to_value(BookingContext::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_wrong_slot_type_is_rejected() {
        let raw = json!({"party_size": "four"});
        assert!(serde_json::from_value::<BookingContext>(raw).is_err());
    }

    #[test]
    fn test_filled_keys_and_clear() {
        let mut ctx = BookingContext::new().with_city("delhi").with_outlet("janakpuri");
        ctx.contact = Some("9876543210".into());
        ctx.extra.insert("lang".into(), json!("en"));
        assert_eq!(
            ctx.filled_keys().into_iter().collect::<Vec<_>>(),
            vec![ContextKey::City, ContextKey::Outlet, ContextKey::Contact]
        );

        ctx.clear_booking_slots();
        assert_eq!(ctx.filled_keys().len(), 1);
        assert!(ctx.is_set(ContextKey::City));
        assert!(ctx.extra.contains_key("lang"));
    }
}
