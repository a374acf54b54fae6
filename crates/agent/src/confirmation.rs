//! Booking summary shown before confirmation

use bbq_assistant_core::BookingContext;

/// Summarize the collected slots. Missing slots render as empty strings.
pub fn format_confirmation(context: &BookingContext) -> String {
    let outlet = title_case(&context.outlet.as_deref().unwrap_or_default().replace('_', " "));
    let city = title_case(context.city.as_deref().unwrap_or_default());
    format!(
        "Please confirm your reservation details: {} outlet in {}, {}. Contact: {}. Is this correct?",
        outlet,
        city,
        context.reservation_text.as_deref().unwrap_or_default(),
        context.contact.as_deref().unwrap_or_default(),
    )
}

/// Upper-case the first letter of every space-separated word
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
