//! Booking reference generation
//!
//! References are handed out by a shared generator. The counter strategy
//! cannot repeat within one process until the 6-digit space wraps.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bbq_assistant_config::ReferenceStrategy;
use bbq_assistant_core::{BookingReference, REFERENCE_SPACE};

pub trait ReferenceGenerator: Send + Sync {
    fn next_reference(&self) -> BookingReference;
}

/// Monotonic counter starting at a random offset
pub struct CounterReferenceGenerator {
    next: AtomicU64,
}

impl CounterReferenceGenerator {
    pub fn new() -> Self {
        Self::starting_at(rand::thread_rng().gen_range(0..REFERENCE_SPACE))
    }

    pub fn starting_at(start: u32) -> Self {
        Self {
            next: AtomicU64::new(u64::from(start)),
        }
    }
}

impl Default for CounterReferenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceGenerator for CounterReferenceGenerator {
    fn next_reference(&self) -> BookingReference {
        BookingReference::from_number(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Independent uniform draw per booking
#[derive(Default)]
pub struct RandomReferenceGenerator;

impl ReferenceGenerator for RandomReferenceGenerator {
    fn next_reference(&self) -> BookingReference {
        BookingReference::from_number(u64::from(rand::thread_rng().gen_range(0..REFERENCE_SPACE)))
    }
}

pub fn generator_for(strategy: ReferenceStrategy) -> Arc<dyn ReferenceGenerator> {
    match strategy {
        ReferenceStrategy::Counter => Arc::new(CounterReferenceGenerator::new()),
        ReferenceStrategy::Random => Arc::new(RandomReferenceGenerator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_counter_is_sequential_and_wraps() {
        let gen = CounterReferenceGenerator::starting_at(999_998);
        assert_eq!(gen.next_reference().to_string(), "BBQ999998");
        assert_eq!(gen.next_reference().to_string(), "BBQ999999");
        assert_eq!(gen.next_reference().to_string(), "BBQ000000");
    }

    #[test]
    fn test_counter_unique_across_threads() {
        let gen = Arc::new(CounterReferenceGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = gen.clone();
                std::thread::spawn(move || {
                    (0..500).map(|_| gen.next_reference()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for reference in handle.join().unwrap() {
                assert!(seen.insert(reference), "duplicate reference {}", reference);
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn test_random_stays_in_range() {
        let gen = RandomReferenceGenerator;
        for _ in 0..100 {
            assert!(gen.next_reference().number() < REFERENCE_SPACE);
        }
    }
}
