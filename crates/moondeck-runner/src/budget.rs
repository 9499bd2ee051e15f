//! Retry budget shared by the bounded watchdogs.

/// Bounded patience for a single watchdog invocation.
///
/// Starts at a fixed value and is drawn down by every unsuccessful poll,
/// possibly by fractional amounts. Watchdogs reset it when they observe
/// progress. Exhaustion (remaining <= 0) is what turns a watchdog into a
/// timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryBudget {
    initial: f64,
    remaining: f64,
}

impl RetryBudget {
    /// Creates a full budget of `initial` retries.
    #[must_use]
    pub fn new(initial: u32) -> Self {
        let initial = f64::from(initial);
        Self {
            initial,
            remaining: initial,
        }
    }

    /// Restores the budget to its initial value.
    pub fn reset(&mut self) {
        self.remaining = self.initial;
    }

    /// Draws `amount` from the budget.
    ///
    /// Returns true while there is budget left.
    pub fn consume(&mut self, amount: f64) -> bool {
        self.remaining -= amount;
        self.remaining > 0.0
    }

    #[cfg(test)]
    pub(crate) fn remaining(&self) -> f64 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausts_after_initial_polls() {
        let mut budget = RetryBudget::new(3);
        assert!(budget.consume(1.0));
        assert!(budget.consume(1.0));
        assert!(!budget.consume(1.0));
    }

    #[test]
    fn test_fractional_consumption() {
        let mut budget = RetryBudget::new(1);
        assert!(budget.consume(0.25));
        assert!(budget.consume(0.25));
        assert!(budget.consume(0.25));
        assert!(!budget.consume(0.25));
        assert_eq!(budget.remaining(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut budget = RetryBudget::new(15);
        budget.consume(10.0);
        budget.reset();
        assert_eq!(budget.remaining(), 15.0);
    }
}
