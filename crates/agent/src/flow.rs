//! Booking state machine
//!
//! [`BookingFlow::step`] applies one message to one state and may write slots
//! into the context. It never fails: unrecognized input re-prompts in the
//! same state or an adjacent one. Checks within a state run in a fixed order
//! and the first hit wins.

use std::sync::Arc;

use bbq_assistant_config::{BookingConfig, CityCatalog, ConfigError, RestartPolicy};
use bbq_assistant_core::{BookingContext, ConversationState, Transition, TurnInput, TurnOutcome};

use crate::confirmation::format_confirmation;
use crate::reference::{generator_for, CounterReferenceGenerator, ReferenceGenerator};
use crate::responses;
use crate::slots::SlotExtractor;

const BOOKING_WORDS: &[&str] = &["book", "reserv"];
const INFO_WORDS: &[&str] = &["info", "know", "detail", "tell"];
const AFFIRMATIVE_WORDS: &[&str] = &["yes", "confirm", "correct", "right"];
const NEGATIVE_WORDS: &[&str] = &["no", "change", "wrong", "incorrect"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Reservation conversation engine
pub struct BookingFlow {
    extractor: SlotExtractor,
    references: Arc<dyn ReferenceGenerator>,
    restart_policy: RestartPolicy,
}

impl BookingFlow {
    pub fn new(catalog: Arc<CityCatalog>) -> Self {
        Self {
            extractor: SlotExtractor::new(catalog),
            references: Arc::new(CounterReferenceGenerator::new()),
            restart_policy: RestartPolicy::default(),
        }
    }

    /// Build from settings, loading the catalog file if one is configured
    pub fn from_config(config: &BookingConfig) -> Result<Self, ConfigError> {
        let catalog = Arc::new(config.load_catalog()?);
        Ok(Self::new(catalog)
            .with_reference_generator(generator_for(config.reference_strategy))
            .with_restart_policy(config.restart_policy))
    }

    pub fn with_reference_generator(mut self, generator: Arc<dyn ReferenceGenerator>) -> Self {
        self.references = generator;
        self
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    pub fn catalog(&self) -> &CityCatalog {
        self.extractor.catalog()
    }

    pub fn extractor(&self) -> &SlotExtractor {
        &self.extractor
    }

    /// Run one full turn, taking and returning owned context
    pub fn run_turn(&self, input: TurnInput) -> TurnOutcome {
        let mut context = input.context;
        let transition = self.step(input.state, &input.message, &mut context);
        TurnOutcome {
            next_state: transition.next,
            response: transition.response,
            context,
            finished: transition.finished,
        }
    }

    /// Run a turn from a caller-supplied state name. Unknown names get the
    /// welcome line and Greeting back, with the context untouched.
    pub fn run_named_turn(
        &self,
        state: &str,
        message: impl Into<String>,
        context: BookingContext,
    ) -> TurnOutcome {
        match ConversationState::from_wire(state) {
            Some(state) => self.run_turn(TurnInput::new(state, message).with_context(context)),
            None => {
                tracing::debug!(state, "Unrecognized conversation state");
                TurnOutcome {
                    next_state: ConversationState::Greeting,
                    response: responses::WELCOME_FALLBACK.to_string(),
                    context,
                    finished: false,
                }
            }
        }
    }

    /// Apply `message` in `state`, updating `context` in place
    pub fn step(
        &self,
        state: ConversationState,
        message: &str,
        context: &mut BookingContext,
    ) -> Transition {
        let transition = match state {
            ConversationState::Greeting => self.on_greeting(message, context),
            ConversationState::City => self.on_city(message, context),
            ConversationState::Outlet => self.on_outlet(message, context),
            ConversationState::Reservation => self.on_reservation(message, context),
            ConversationState::Contact => self.on_contact(message, context),
            ConversationState::Confirmation => self.on_confirmation(message, context),
            ConversationState::End => Transition::to(ConversationState::End, responses::CLOSING).finished(),
        };

        tracing::debug!(
            from = %state,
            to = %transition.next,
            finished = transition.finished,
            "Booking flow step"
        );
        transition
    }

    fn on_greeting(&self, message: &str, context: &mut BookingContext) -> Transition {
        let lower = message.to_lowercase();
        let catalog = self.catalog();

        if contains_any(&lower, BOOKING_WORDS) {
            return Transition::to(ConversationState::City, responses::booking_intent(catalog));
        }
        if contains_any(&lower, INFO_WORDS) {
            return Transition::to(ConversationState::City, responses::info_intent(catalog));
        }
        if let Some(city) = self.extractor.extract_city(message) {
            context.city = Some(city.id.clone());
            return Transition::to(ConversationState::Outlet, responses::city_selected(city, true));
        }
        Transition::to(ConversationState::City, responses::welcome(catalog))
    }

    fn on_city(&self, message: &str, context: &mut BookingContext) -> Transition {
        match self.extractor.extract_city(message) {
            Some(city) => {
                context.city = Some(city.id.clone());
                Transition::to(ConversationState::Outlet, responses::city_selected(city, false))
            }
            None => Transition::to(ConversationState::City, responses::city_reprompt(self.catalog())),
        }
    }

    fn on_outlet(&self, message: &str, context: &mut BookingContext) -> Transition {
        let city = match context.city.as_deref().and_then(|id| self.catalog().city(id)) {
            Some(city) => city,
            None => {
                return Transition::to(
                    ConversationState::City,
                    responses::city_required(self.catalog()),
                )
            }
        };

        match self.extractor.extract_outlet(message, context) {
            Some(outlet) => {
                let response = responses::outlet_selected(outlet);
                context.outlet = Some(outlet.id.clone());
                Transition::to(ConversationState::Reservation, response)
            }
            None => Transition::to(ConversationState::Outlet, responses::outlet_reprompt(city)),
        }
    }

    fn on_reservation(&self, message: &str, context: &mut BookingContext) -> Transition {
        let signals = self.extractor.reservation_signals(message);
        if !signals.is_complete() {
            return Transition::to(ConversationState::Reservation, responses::ASK_DATE_TIME);
        }

        context.reservation_text = Some(message.to_string());
        if signals.has_number {
            context.party_size = Some(self.extractor.extract_party_size(message));
            Transition::to(ConversationState::Contact, responses::ASK_CONTACT)
        } else {
            Transition::to(ConversationState::Contact, responses::ASK_PARTY_AND_CONTACT)
        }
    }

    fn on_contact(&self, message: &str, context: &mut BookingContext) -> Transition {
        if !SlotExtractor::has_phone_number(message) {
            return Transition::to(ConversationState::Contact, responses::ASK_PHONE);
        }
        context.contact = Some(message.to_string());
        Transition::to(ConversationState::Confirmation, format_confirmation(context))
    }

    fn on_confirmation(&self, message: &str, context: &mut BookingContext) -> Transition {
        let lower = message.to_lowercase();

        if contains_any(&lower, AFFIRMATIVE_WORDS) {
            let reference = self.references.next_reference();
            context.booking_confirmed = Some(true);
            context.booking_reference = Some(reference);
            tracing::info!(reference = %reference, city = ?context.city, outlet = ?context.outlet, "Booking confirmed");
            return Transition::to(ConversationState::End, responses::booking_confirmed(&reference))
                .finished();
        }

        if contains_any(&lower, NEGATIVE_WORDS) {
            if self.restart_policy == RestartPolicy::ClearBookingSlots {
                context.clear_booking_slots();
            }
            return Transition::to(ConversationState::City, responses::restart(self.catalog()));
        }

        Transition::to(
            ConversationState::Confirmation,
            format!("{} {}", responses::CONFIRM_REPROMPT, format_confirmation(context)),
        )
    }
}
