//! Running state carried from one schedule period to the next

/// Balance and installment state during schedule generation
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Current period (1-indexed, 0 before the first advance)
    pub period: u32,

    /// Outstanding balance at the start of the current period
    pub balance: f64,

    /// Fixed installment, set once amortization begins
    pub base_payment: Option<f64>,
}

impl AmortizationState {
    pub fn new(principal: f64) -> Self {
        Self {
            period: 0,
            balance: principal,
            base_payment: None,
        }
    }

    /// Move to the next period
    pub fn advance_period(&mut self) {
        self.period += 1;
    }

    /// Installment for the amortizing periods.
    ///
    /// Computed on first use from the balance at that moment, so interest
    /// capitalized during a total grace period is spread over the remaining
    /// `periods`.
    pub fn base_payment(&mut self, monthly_rate: f64, periods: u32) -> f64 {
        let balance = self.balance;
        *self
            .base_payment
            .get_or_insert_with(|| annuity_payment(balance, monthly_rate, periods))
    }
}

/// Level payment that repays `balance` over `periods` at `rate` per period
pub fn annuity_payment(balance: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return balance;
    }
    if rate == 0.0 {
        return balance / periods as f64;
    }
    let growth = (1.0 + rate).powf(periods as f64);
    if growth.is_infinite() {
        // Interest-only limit of the annuity
        return balance * rate;
    }
    balance * rate * growth / (growth - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annuity_payment() {
        // 100,000 at 1% over 12 periods
        let payment = annuity_payment(100_000.0, 0.01, 12);
        assert_relative_eq!(payment, 8884.878867834166, max_relative = 1e-10);
    }

    #[test]
    fn test_zero_rate_annuity() {
        assert_eq!(annuity_payment(1200.0, 0.0, 12), 100.0);
    }

    #[test]
    fn test_very_long_term_stays_finite() {
        let payment = annuity_payment(100_000.0, 0.01, u32::MAX);
        assert_relative_eq!(payment, 1_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_base_payment_fixed_once() {
        let mut state = AmortizationState::new(10_000.0);
        let first = state.base_payment(0.01, 10);
        state.balance = 5_000.0;
        assert_eq!(state.base_payment(0.01, 10), first);
    }
}
