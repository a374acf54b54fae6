//! Prompt texts for the booking flow

use bbq_assistant_config::{CityCatalog, CityEntry, OutletEntry};
use bbq_assistant_core::BookingReference;

pub const ASK_CONTACT: &str =
    "Great! Could you please provide your contact number so we can confirm your reservation?";

pub const ASK_PARTY_AND_CONTACT: &str = "How many people will be dining? Please provide your \
     contact number as well so we can confirm your reservation.";

pub const ASK_DATE_TIME: &str = "I need both a date and time for your reservation. For example, \
     'tomorrow at 7:30 PM' or 'Friday at noon'. When would you like to visit?";

pub const ASK_PHONE: &str =
    "I need your contact number to confirm the reservation. Please provide a valid phone number.";

pub const CONFIRM_REPROMPT: &str =
    "I didn't catch that. Could you please confirm if the reservation details are correct?";

/// Reply for a state name the flow does not know
pub const WELCOME_FALLBACK: &str = "Welcome to Barbeque Nation. How may I assist you today?";

pub const CLOSING: &str = "Thank you for booking with Barbeque Nation. We look forward to \
     serving you. Is there anything else I can help you with?";

pub fn booking_intent(catalog: &CityCatalog) -> String {
    format!(
        "Great! I can help you with a reservation. Which city would you like to book in - {}?",
        catalog.city_names("or")
    )
}

pub fn info_intent(catalog: &CityCatalog) -> String {
    format!(
        "I'd be happy to provide information about our outlets. Which city are you interested in - {}?",
        catalog.city_names("or")
    )
}

pub fn welcome(catalog: &CityCatalog) -> String {
    format!(
        "Welcome to Barbeque Nation! I can help you with bookings or information about our \
         outlets. Which city are you interested in - {}?",
        catalog.city_names("or")
    )
}

/// Outlet list for a chosen city; `enthusiastic` adds the greeting-step prefix
pub fn city_selected(city: &CityEntry, enthusiastic: bool) -> String {
    format!(
        "{}We have several outlets in {}. Which one are you interested in? We have outlets in {}.",
        if enthusiastic { "Great! " } else { "" },
        city.display_name,
        city.outlet_names()
    )
}

pub fn city_reprompt(catalog: &CityCatalog) -> String {
    format!(
        "I'm sorry, I didn't catch which city you're interested in. We have outlets in {}. \
         Which city would you like to select?",
        catalog.city_names("and")
    )
}

pub fn city_required(catalog: &CityCatalog) -> String {
    format!(
        "Let's start by selecting a city. We have outlets in {}. Which city would you prefer?",
        catalog.city_names("and")
    )
}

pub fn outlet_selected(outlet: &OutletEntry) -> String {
    let note = if outlet.selection_note.is_empty() {
        format!("Great choice! {} outlet.", outlet.display_name)
    } else {
        outlet.selection_note.clone()
    };
    format!(
        "{} When would you like to make your reservation? Please let me know the date and time.",
        note
    )
}

pub fn outlet_reprompt(city: &CityEntry) -> String {
    format!(
        "I'm sorry, I didn't catch which outlet you're interested in. In {}, we have outlets in {}. \
         Which one would you like to select?",
        city.display_name,
        city.outlet_names()
    )
}

pub fn booking_confirmed(reference: &BookingReference) -> String {
    format!(
        "Your reservation has been confirmed! Your booking reference is {}. We look forward to \
         serving you. Is there anything else I can help you with?",
        reference
    )
}

pub fn restart(catalog: &CityCatalog) -> String {
    format!(
        "I'll help you update your reservation. Let's start over. Which city would you like to book in - {}?",
        catalog.city_names("or")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_driven_prompts() {
        let catalog = CityCatalog::default();
        assert_eq!(
            booking_intent(&catalog),
            "Great! I can help you with a reservation. Which city would you like to book in - Delhi or Bangalore?"
        );
        assert_eq!(
            city_reprompt(&catalog),
            "I'm sorry, I didn't catch which city you're interested in. We have outlets in Delhi \
             and Bangalore. Which city would you like to select?"
        );

        let delhi = catalog.city("delhi").unwrap();
        assert_eq!(
            city_selected(delhi, true),
            "Great! We have several outlets in Delhi. Which one are you interested in? We have \
             outlets in Connaught Place, Vasant Kunj, and Janakpuri."
        );
        assert!(city_selected(delhi, false).starts_with("We have several outlets in Delhi."));
    }

    #[test]
    fn test_outlet_note_fallback() {
        let mut outlet = CityCatalog::default().cities[0].outlets[2].clone();
        assert!(outlet_selected(&outlet).starts_with("Perfect! Janakpuri outlet is located in Unity Mall. When"));
        outlet.selection_note.clear();
        assert!(outlet_selected(&outlet).starts_with("Great choice! Janakpuri outlet. When"));
    }
}
