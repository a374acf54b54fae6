//! Conversation states and turn types for the booking flow

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::context::BookingContext;
use crate::error::Error;

/// Booking conversation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Opening turn, intent not yet known
    #[default]
    Greeting,
    /// Waiting for a city
    City,
    /// Waiting for an outlet within the selected city
    Outlet,
    /// Waiting for a date and time
    Reservation,
    /// Waiting for a phone number
    Contact,
    /// Waiting for the customer to accept or reject the summary
    Confirmation,
    /// Booking finished; absorbing
    End,
}

/// Transitions the booking flow may take out of each state.
static STATE_TRANSITIONS: Lazy<HashMap<ConversationState, &'static [ConversationState]>> =
    Lazy::new(|| {
        use ConversationState::*;
        let mut map = HashMap::new();
        map.insert(Greeting, &[Greeting, City, Outlet] as &[_]);
        map.insert(City, &[City, Outlet] as &[_]);
        map.insert(Outlet, &[Outlet, City, Reservation] as &[_]);
        map.insert(Reservation, &[Reservation, Contact] as &[_]);
        map.insert(Contact, &[Contact, Confirmation] as &[_]);
        map.insert(Confirmation, &[Confirmation, End, City] as &[_]);
        map.insert(End, &[End] as &[_]);
        map
    });

impl ConversationState {
    /// Every state, in flow order
    pub const ALL: [ConversationState; 7] = [
        ConversationState::Greeting,
        ConversationState::City,
        ConversationState::Outlet,
        ConversationState::Reservation,
        ConversationState::Contact,
        ConversationState::Confirmation,
        ConversationState::End,
    ];

    /// Wire name used in requests and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Greeting => "greeting",
            ConversationState::City => "city",
            ConversationState::Outlet => "outlet",
            ConversationState::Reservation => "reservation",
            ConversationState::Contact => "contact",
            ConversationState::Confirmation => "confirmation",
            ConversationState::End => "end",
        }
    }

    /// Parse a caller-supplied state. Empty input is Greeting; unknown names are `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            return Some(ConversationState::Greeting);
        }
        value.parse().ok()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationState::End)
    }

    /// States reachable in one turn from this one
    pub fn allowed_transitions(&self) -> &'static [ConversationState] {
        STATE_TRANSITIONS.get(self).copied().unwrap_or(&[])
    }

    pub fn can_transition_to(&self, target: ConversationState) -> bool {
        self.allowed_transitions().contains(&target)
    }
}

impl FromStr for ConversationState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying one message to one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ConversationState,
    pub response: String,
    pub finished: bool,
}

impl Transition {
    pub fn to(next: ConversationState, response: impl Into<String>) -> Self {
        Self {
            next,
            response: response.into(),
            finished: false,
        }
    }

    /// Mark the conversation as finished
    pub fn finished(mut self) -> Self {
        self.finished = true;
        self
    }
}

/// Input half of a turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnInput {
    #[serde(default)]
    pub state: ConversationState,
    pub message: String,
    #[serde(default)]
    pub context: BookingContext,
}

impl TurnInput {
    pub fn new(state: ConversationState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            context: BookingContext::default(),
        }
    }

    pub fn with_context(mut self, context: BookingContext) -> Self {
        self.context = context;
        self
    }
}

/// Output half of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub next_state: ConversationState,
    pub response: String,
    pub context: BookingContext,
    pub finished: bool,
}
