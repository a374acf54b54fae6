//! Booking walkthroughs and state machine invariants

use std::sync::Arc;

use regex::Regex;

use bbq_assistant_agent::BookingFlow;
use bbq_assistant_config::CityCatalog;
use bbq_assistant_core::{BookingContext, ConversationState, ContextKey, TurnInput};

const SAMPLE_MESSAGES: &[&str] = &[
    "",
    "hello",
    "I want to book a table",
    "tell me more",
    "Delhi",
    "Bengaluru please",
    "Connaught Place please",
    "koramangala",
    "tomorrow at 7pm for 4 people",
    "friday dinner",
    "0 guests",
    "9876543210",
    "987654321",
    "yes that's correct",
    "no, change it",
    "maybe",
    "!!!",
];

fn flow() -> BookingFlow {
    BookingFlow::new(Arc::new(CityCatalog::default()))
}

fn contexts() -> Vec<BookingContext> {
    let mut full = BookingContext::new().with_city("bangalore").with_outlet("jp_nagar");
    full.reservation_text = Some("today 8pm".into());
    full.party_size = Some(3);
    full.contact = Some("9876543210".into());
    vec![
        BookingContext::new(),
        BookingContext::new().with_city("delhi"),
        BookingContext::new().with_city("atlantis"),
        full,
    ]
}

#[test]
fn test_every_transition_is_allowed() {
    let flow = flow();
    for state in ConversationState::ALL {
        for message in SAMPLE_MESSAGES {
            for mut ctx in contexts() {
                let t = flow.step(state, message, &mut ctx);
                assert!(
                    state.can_transition_to(t.next),
                    "{} -> {} on {:?}",
                    state,
                    t.next,
                    message
                );
                assert!(!t.response.is_empty());
                if t.finished {
                    assert_eq!(t.next, ConversationState::End);
                }
            }
        }
    }
}

#[test]
fn test_end_absorbs_everything() {
    let flow = flow();
    for message in SAMPLE_MESSAGES {
        let mut ctx = BookingContext::new();
        let t = flow.step(ConversationState::End, message, &mut ctx);
        assert_eq!(t.next, ConversationState::End);
        assert!(t.finished);
        assert_eq!(
            t.response,
            "Thank you for booking with Barbeque Nation. We look forward to serving you. \
             Is there anything else I can help you with?"
        );
        assert!(ctx.filled_keys().is_empty());
    }
}

#[test]
fn test_reprompts_are_idempotent() {
    let flow = flow();
    let cases = [
        (ConversationState::City, "somewhere nice", BookingContext::new()),
        (ConversationState::Outlet, "the big one", BookingContext::new().with_city("delhi")),
        (ConversationState::Reservation, "soon please", BookingContext::new().with_city("delhi")),
        (ConversationState::Contact, "call me at 12345", BookingContext::new().with_city("delhi")),
    ];

    for (state, message, ctx) in cases {
        let mut current = ctx.clone();
        for _ in 0..3 {
            let t = flow.step(state, message, &mut current);
            assert_eq!(t.next, state);
            assert_eq!(current.filled_keys(), ctx.filled_keys());
        }
    }
}

#[test]
fn test_bangalore_aliases_normalize() {
    let flow = flow();
    for message in ["Bangalore", "bengaluru", "BENGALURU it is", "in bangalore"] {
        for state in [ConversationState::Greeting, ConversationState::City] {
            let mut ctx = BookingContext::new();
            flow.step(state, message, &mut ctx);
            assert_eq!(ctx.city.as_deref(), Some("bangalore"), "{} in {}", message, state);
        }
    }
}

#[test]
fn test_outlet_never_set_without_city() {
    let flow = flow();
    for state in ConversationState::ALL {
        for message in ["Connaught Place", "cp", "koramangala", "jp nagar", "vasant kunj"] {
            let mut ctx = BookingContext::new();
            flow.step(state, message, &mut ctx);
            assert!(ctx.outlet.is_none(), "{} set outlet from {:?}", state, message);
        }
    }
}

#[test]
fn test_reference_format() {
    let pattern = Regex::new(r"^BBQ\d{6}$").unwrap();
    let flow = flow();
    for _ in 0..50 {
        let mut ctx = BookingContext::new();
        flow.step(ConversationState::Confirmation, "confirm", &mut ctx);
        let reference = ctx.booking_reference.expect("reference set").to_string();
        assert!(pattern.is_match(&reference), "{}", reference);
    }
}

#[test]
fn test_phone_boundary() {
    let flow = flow();
    let mut ctx = BookingContext::new();
    let t = flow.step(ConversationState::Contact, "98 76 54 32 10", &mut ctx);
    assert_eq!(t.next, ConversationState::Confirmation);

    let mut ctx = BookingContext::new();
    let t = flow.step(ConversationState::Contact, "98 76 54 32 1", &mut ctx);
    assert_eq!(t.next, ConversationState::Contact);
    assert!(ctx.contact.is_none());
}

#[test]
fn test_full_booking_walkthrough() {
    let flow = flow();
    let mut ctx = BookingContext::new();

    // Greeting -> City
    let t = flow.step(ConversationState::Greeting, "I want to book a table", &mut ctx);
    assert_eq!(t.next, ConversationState::City);
    assert!(t.response.contains("Delhi or Bangalore"));

    // City -> Outlet
    let t = flow.step(t.next, "Delhi", &mut ctx);
    assert_eq!(t.next, ConversationState::Outlet);
    assert_eq!(ctx.city.as_deref(), Some("delhi"));
    for outlet in ["Connaught Place", "Vasant Kunj", "Janakpuri"] {
        assert!(t.response.contains(outlet));
    }

    // Outlet -> Reservation
    let t = flow.step(t.next, "Connaught Place please", &mut ctx);
    assert_eq!(t.next, ConversationState::Reservation);
    assert_eq!(ctx.outlet.as_deref(), Some("connaught_place"));

    // Reservation -> Contact
    let t = flow.step(t.next, "tomorrow at 7pm for 4 people", &mut ctx);
    assert_eq!(t.next, ConversationState::Contact);
    assert_eq!(ctx.reservation_text.as_deref(), Some("tomorrow at 7pm for 4 people"));
    assert_eq!(ctx.party_size, Some(4));

    // Contact -> Confirmation
    let t = flow.step(t.next, "9876543210", &mut ctx);
    assert_eq!(t.next, ConversationState::Confirmation);
    assert_eq!(
        t.response,
        "Please confirm your reservation details: Connaught Place outlet in Delhi, \
         tomorrow at 7pm for 4 people. Contact: 9876543210. Is this correct?"
    );

    // Confirmation -> End
    let t = flow.step(t.next, "yes that's correct", &mut ctx);
    assert_eq!(t.next, ConversationState::End);
    assert!(t.finished);
    assert_eq!(ctx.booking_confirmed, Some(true));
    let reference = ctx.booking_reference.expect("reference set").to_string();
    assert!(Regex::new(r"^BBQ\d{6}$").unwrap().is_match(&reference));
    assert!(t.response.contains(&reference));

    assert_eq!(ctx.filled_keys().len(), ContextKey::ALL.len());
}

#[test]
fn test_restart_then_rebook() {
    let flow = flow();
    let mut ctx = BookingContext::new().with_city("delhi").with_outlet("janakpuri");
    ctx.reservation_text = Some("today 9pm".into());
    ctx.contact = Some("9876543210".into());

    let t = flow.step(ConversationState::Confirmation, "no that's wrong", &mut ctx);
    assert_eq!(t.next, ConversationState::City);
    assert!(!t.finished);

    let t = flow.step(t.next, "Bengaluru", &mut ctx);
    let t = flow.step(t.next, "Koramangala", &mut ctx);
    let t = flow.step(t.next, "saturday lunch", &mut ctx);
    let t = flow.step(t.next, "my number is 99887 76655", &mut ctx);
    assert_eq!(t.next, ConversationState::Confirmation);
    assert!(t.response.contains("Koramangala outlet in Bangalore, saturday lunch"));
    assert!(ctx.party_size.is_none());
}

#[test]
fn test_run_turn_defaults_to_greeting() {
    let input: TurnInput = serde_json::from_value(serde_json::json!({
        "message": "Delhi",
        "context": {"utm": "ad"}
    }))
    .unwrap();
    let outcome = flow().run_turn(input);
    assert_eq!(outcome.next_state, ConversationState::Outlet);
    assert!(outcome.response.starts_with("Great! We have several outlets in Delhi."));
    assert_eq!(outcome.context.extra["utm"], "ad");
}
