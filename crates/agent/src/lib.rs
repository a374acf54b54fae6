//! Reservation conversation engine
//!
//! Features:
//! - Keyword slot extraction (city, outlet, date/time, party size, phone)
//! - Booking summary formatting
//! - State machine from greeting to confirmed booking
//! - Booking reference generation

pub mod confirmation;
pub mod flow;
pub mod reference;
pub mod responses;
pub mod slots;

pub use confirmation::format_confirmation;
pub use flow::BookingFlow;
pub use reference::{
    generator_for, CounterReferenceGenerator, RandomReferenceGenerator, ReferenceGenerator,
};
pub use slots::{ReservationSignals, SlotExtractor, DEFAULT_PARTY_SIZE, MIN_PHONE_DIGITS};
