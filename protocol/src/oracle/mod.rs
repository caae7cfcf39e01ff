//! # Price Oracle
//!
//! Admission control needs a rough USD value for an investor's native
//! holdings. The oracle contract is deliberately tiny: native amount in,
//! estimated stablecoin value out. There is no error channel; an oracle
//! that cannot produce a price must answer zero, which makes the native
//! balance count for nothing rather than for too much.

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::config::DEFAULT_NATIVE_USD_RATE;

/// Converts native-currency amounts into estimated stablecoin value.
pub trait PriceOracle: Send + Sync {
    /// Estimated stablecoin value of `native_amount`.
    fn exchange_native_for_stable(&self, native_amount: Decimal) -> Decimal;
}

/// Oracle with an operator-set rate. Used on sandbox networks, where there
/// is no market to ask, and in tests.
#[derive(Debug)]
pub struct FixedRateOracle {
    /// USD per native unit.
    rate: RwLock<Decimal>,
}

impl FixedRateOracle {
    pub fn new(rate: Decimal) -> Self {
        Self {
            rate: RwLock::new(rate.max(Decimal::ZERO)),
        }
    }

    /// Current rate.
    pub fn rate(&self) -> Decimal {
        *self.rate.read()
    }

    /// Replace the rate. Negative rates are stored as zero.
    pub fn set_rate(&self, rate: Decimal) {
        *self.rate.write() = rate.max(Decimal::ZERO);
    }
}

impl Default for FixedRateOracle {
    fn default() -> Self {
        Self::new(DEFAULT_NATIVE_USD_RATE)
    }
}

impl PriceOracle for FixedRateOracle {
    fn exchange_native_for_stable(&self, native_amount: Decimal) -> Decimal {
        if native_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        // Saturate: an unrepresentable value is still "more than any target".
        native_amount
            .checked_mul(self.rate())
            .unwrap_or(Decimal::MAX)
    }
}
