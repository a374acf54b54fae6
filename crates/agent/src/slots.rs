//! Slot extraction for booking messages
//!
//! Deterministic keyword and substring checks. City and outlet keywords come
//! from the catalog; date, time and number vocabularies are fixed.

use std::sync::Arc;

use bbq_assistant_config::{CityCatalog, CityEntry, OutletEntry};
use bbq_assistant_core::BookingContext;

/// Party size assumed when a message carries a number we cannot read
pub const DEFAULT_PARTY_SIZE: u32 = 2;

/// Digit characters needed to count as a phone number
pub const MIN_PHONE_DIGITS: usize = 10;

const TOKEN_PUNCTUATION: &[char] = &[',', '.', ':', ';', '!', '?'];

/// Independent signals checked at the reservation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReservationSignals {
    pub has_date: bool,
    pub has_time: bool,
    pub has_number: bool,
}

impl ReservationSignals {
    /// Date and time both present
    pub fn is_complete(&self) -> bool {
        self.has_date && self.has_time
    }
}

/// Slot extractor for the booking flow
pub struct SlotExtractor {
    catalog: Arc<CityCatalog>,
    /// Words that mark a date
    date_words: Vec<&'static str>,
    /// Lowercase markers that mark a time (a raw ':' also counts)
    time_markers: Vec<&'static str>,
    /// Spelled-out party sizes
    number_words: Vec<(&'static str, u32)>,
}

impl SlotExtractor {
    pub fn new(catalog: Arc<CityCatalog>) -> Self {
        Self {
            catalog,
            date_words: Self::build_date_words(),
            time_markers: Self::build_time_markers(),
            number_words: Self::build_number_words(),
        }
    }

    fn build_date_words() -> Vec<&'static str> {
        vec![
            "today",
            "tomorrow",
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
            "sunday",
        ]
    }

    fn build_time_markers() -> Vec<&'static str> {
        vec!["am", "pm", "noon", "night", "evening", "lunch", "dinner"]
    }

    fn build_number_words() -> Vec<(&'static str, u32)> {
        vec![
            ("one", 1),
            ("two", 2),
            ("three", 3),
            ("four", 4),
            ("five", 5),
            ("six", 6),
            ("seven", 7),
            ("eight", 8),
            ("nine", 9),
            ("ten", 10),
        ]
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    /// First catalog city with a keyword in the message
    pub fn extract_city(&self, message: &str) -> Option<&CityEntry> {
        let lower = message.to_lowercase();
        self.catalog
            .cities
            .iter()
            .find(|city| city.keywords.iter().any(|kw| lower.contains(kw.as_str())))
    }

    /// First outlet of the context's city with a keyword in the message.
    ///
    /// Always `None` while the context has no known city.
    pub fn extract_outlet(&self, message: &str, context: &BookingContext) -> Option<&OutletEntry> {
        let city = self.catalog.city(context.city.as_deref()?)?;
        let lower = message.to_lowercase();
        city.outlets
            .iter()
            .find(|outlet| outlet.keywords.iter().any(|kw| lower.contains(kw.as_str())))
    }

    pub fn has_date(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.date_words.iter().any(|w| lower.contains(w))
    }

    pub fn has_time(&self, message: &str) -> bool {
        if message.contains(':') {
            return true;
        }
        let lower = message.to_lowercase();
        self.time_markers.iter().any(|m| lower.contains(m))
    }

    /// True when the message holds any digit 1-9. A lone '0' does not count.
    pub fn has_number(message: &str) -> bool {
        message.chars().any(|c| ('1'..='9').contains(&c))
    }

    pub fn reservation_signals(&self, message: &str) -> ReservationSignals {
        ReservationSignals {
            has_date: self.has_date(message),
            has_time: self.has_time(message),
            has_number: Self::has_number(message),
        }
    }

    /// Party size from the first positive integer token, then the first
    /// number word, else [`DEFAULT_PARTY_SIZE`].
    pub fn extract_party_size(&self, message: &str) -> u32 {
        let lower = message.to_lowercase();
        let tokens: Vec<&str> = lower
            .split_whitespace()
            .map(|t| t.trim_matches(TOKEN_PUNCTUATION))
            .collect();

        if let Some(n) = tokens
            .iter()
            .filter_map(|t| t.parse::<u32>().ok())
            .find(|n| *n >= 1)
        {
            return n;
        }

        tokens
            .iter()
            .find_map(|t| {
                self.number_words
                    .iter()
                    .find(|(word, _)| word == t)
                    .map(|(_, n)| *n)
            })
            .unwrap_or(DEFAULT_PARTY_SIZE)
    }

    /// At least [`MIN_PHONE_DIGITS`] ASCII digits anywhere in the message
    pub fn has_phone_number(message: &str) -> bool {
        message.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SlotExtractor {
        SlotExtractor::new(Arc::new(CityCatalog::default()))
    }

    #[test]
    fn test_city_extraction() {
        let ex = extractor();
        assert_eq!(ex.extract_city("Delhi please").unwrap().id, "delhi");
        assert_eq!(ex.extract_city("BENGALURU").unwrap().id, "bangalore");
        assert_eq!(ex.extract_city("somewhere in bangalore").unwrap().id, "bangalore");
        assert!(ex.extract_city("Mumbai").is_none());
    }

    #[test]
    fn test_city_tie_break_follows_catalog_order() {
        let ex = extractor();
        assert_eq!(ex.extract_city("bangalore or delhi").unwrap().id, "delhi");
    }

    #[test]
    fn test_outlet_extraction_requires_city() {
        let ex = extractor();
        let ctx = BookingContext::new();
        assert!(ex.extract_outlet("Connaught Place", &ctx).is_none());

        let ctx = BookingContext::new().with_city("delhi");
        assert_eq!(ex.extract_outlet("Connaught Place", &ctx).unwrap().id, "connaught_place");
        assert_eq!(ex.extract_outlet("near CP", &ctx).unwrap().id, "connaught_place");
        assert_eq!(ex.extract_outlet("vasant kunj", &ctx).unwrap().id, "vasant_kunj");
        assert!(ex.extract_outlet("koramangala", &ctx).is_none());

        let ctx = BookingContext::new().with_city("bangalore");
        assert_eq!(ex.extract_outlet("Jayanagar side", &ctx).unwrap().id, "jp_nagar");
        assert_eq!(ex.extract_outlet("electronic city", &ctx).unwrap().id, "electronic_city");

        let ctx = BookingContext::new().with_city("chennai");
        assert!(ex.extract_outlet("anything", &ctx).is_none());
    }

    #[test]
    fn test_date_and_time_signals() {
        let ex = extractor();
        assert!(ex.has_date("Tomorrow works"));
        assert!(ex.has_date("next FRIDAY"));
        assert!(!ex.has_date("next week"));

        assert!(ex.has_time("at 7:30"));
        assert!(ex.has_time("7PM"));
        assert!(ex.has_time("for dinner"));
        assert!(!ex.has_time("sometime soon"));

        let signals = ex.reservation_signals("tomorrow at 7pm for 4 people");
        assert!(signals.is_complete());
        assert!(signals.has_number);
    }

    #[test]
    fn test_number_signal_ignores_zero() {
        assert!(SlotExtractor::has_number("table for 4"));
        assert!(SlotExtractor::has_number("10 guests"));
        assert!(!SlotExtractor::has_number("0 guests"));
        assert!(!SlotExtractor::has_number("four guests"));
    }

    #[test]
    fn test_party_size_extraction() {
        let ex = extractor();
        assert_eq!(ex.extract_party_size("tomorrow at 7pm for 4 people"), 4);
        assert_eq!(ex.extract_party_size("we are 6, tomorrow at 8pm"), 6);
        assert_eq!(ex.extract_party_size("Friday 7:30 for five"), 5);
        assert_eq!(ex.extract_party_size("Friday 7:30 for Three"), 3);
        assert_eq!(ex.extract_party_size("today 9pm"), DEFAULT_PARTY_SIZE);
        assert_eq!(ex.extract_party_size("0 or 3 people"), 3);
    }

    #[test]
    fn test_phone_detection_boundary() {
        assert!(SlotExtractor::has_phone_number("9876543210"));
        assert!(SlotExtractor::has_phone_number("call 98765 43210"));
        assert!(SlotExtractor::has_phone_number("+91-98-76-54-32-10"));
        assert!(!SlotExtractor::has_phone_number("987654321"));
        assert!(!SlotExtractor::has_phone_number("my number is secret"));
    }
}
