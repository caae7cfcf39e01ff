//! # Investor Admission Control
//!
//! Before an order is accepted the platform checks that the investor could
//! plausibly pay for it. The check is advisory: balances are read, never
//! reserved, so they can change between the check and the order.

use std::sync::Arc;

use rust_decimal::Decimal;

use solarfund_protocol::config::{EngineConfig, NetworkMode};
use solarfund_protocol::ledger::LedgerClient;
use solarfund_protocol::model::Investor;
use solarfund_protocol::oracle::PriceOracle;

/// Decides whether an investor can cover an investment.
pub struct AdmissionControl {
    ledger: Arc<dyn LedgerClient>,
    oracle: Arc<dyn PriceOracle>,
    network: NetworkMode,
    stablecoin: String,
}

impl AdmissionControl {
    /// Build an admission check for the network in `config`.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        oracle: Arc<dyn PriceOracle>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            ledger,
            oracle,
            network: config.network,
            stablecoin: config.stablecoin_code().to_string(),
        }
    }

    /// The stablecoin code this instance queries.
    pub fn stablecoin(&self) -> &str {
        &self.stablecoin
    }

    /// `true` if `investor` may invest `target`.
    ///
    /// Investors who have not accepted the terms are always refused, before
    /// any balance is read. Otherwise the investor qualifies when either
    /// the stablecoin balance alone or the estimated value of the native
    /// balance alone strictly exceeds `target`. The two are not summed.
    ///
    /// A balance that cannot be read counts as zero.
    pub fn can_invest(&self, investor: &Investor, target: Decimal) -> bool {
        if !investor.account.legal {
            tracing::debug!(investor = investor.index(), "admission refused: terms not accepted");
            return false;
        }

        let public_key = investor.account.public_key();
        let stable = self
            .ledger
            .asset_balance(public_key, &self.stablecoin)
            .unwrap_or_else(|e| {
                tracing::warn!(investor = investor.index(), error = %e, asset = %self.stablecoin,
                    "stablecoin balance unavailable, treating as zero");
                Decimal::ZERO
            });
        let native = self.ledger.native_balance(public_key).unwrap_or_else(|e| {
            tracing::warn!(investor = investor.index(), error = %e,
                "native balance unavailable, treating as zero");
            Decimal::ZERO
        });
        let native_value = self.oracle.exchange_native_for_stable(native);

        let admitted = stable > target || native_value > target;
        tracing::debug!(
            investor = investor.index(),
            network = %self.network,
            %target,
            %stable,
            %native_value,
            admitted,
            "admission decision"
        );
        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use rust_decimal_macros::dec;
    use solarfund_protocol::ledger::{AssetCode, AssetSelector};
    use solarfund_protocol::oracle::FixedRateOracle;

    fn sandbox_stable() -> AssetSelector {
        AssetSelector::Custom(AssetCode::new("STABLEUSD", "issuer"))
    }

    fn control(fx: &Fixture, network: NetworkMode) -> AdmissionControl {
        AdmissionControl::new(
            fx.ledger.clone(),
            fx.oracle.clone(),
            &EngineConfig::for_network(network),
        )
    }

    #[test]
    fn stablecoin_follows_network_mode() {
        let fx = Fixture::new();
        assert_eq!(control(&fx, NetworkMode::Sandbox).stablecoin(), "STABLEUSD");
        assert_eq!(control(&fx, NetworkMode::Production).stablecoin(), "USD");
    }

    #[test]
    fn terms_not_accepted_is_refused_without_reading_balances() {
        let fx = Fixture::new();
        let investor = fx.investor(1, false);
        fx.ledger
            .credit(investor.account.public_key(), &sandbox_stable(), dec!(1000000))
            .unwrap();
        assert!(!control(&fx, NetworkMode::Sandbox).can_invest(&investor, dec!(1)));
    }

    #[test]
    fn stable_balance_must_strictly_exceed_target() {
        let fx = Fixture::new();
        let investor = fx.investor(1, true);
        fx.ledger
            .credit(investor.account.public_key(), &sandbox_stable(), dec!(500))
            .unwrap();
        let control = control(&fx, NetworkMode::Sandbox);
        assert!(control.can_invest(&investor, dec!(499.99)));
        assert!(!control.can_invest(&investor, dec!(500)));
    }

    #[test]
    fn native_value_alone_can_qualify() {
        let fx = Fixture::new();
        let investor = fx.investor(1, true);
        fx.ledger
            .credit(investor.account.public_key(), &AssetSelector::Native, dec!(10000))
            .unwrap();
        // 10_000 native at 0.10 is worth 1_000.
        let control = control(&fx, NetworkMode::Sandbox);
        assert!(control.can_invest(&investor, dec!(999)));
        assert!(!control.can_invest(&investor, dec!(1000)));
    }

    #[test]
    fn balances_are_not_summed() {
        let fx = Fixture::new();
        let investor = fx.investor(1, true);
        let pk = investor.account.public_key();
        fx.ledger.credit(pk, &sandbox_stable(), dec!(60)).unwrap();
        fx.ledger.credit(pk, &AssetSelector::Native, dec!(600)).unwrap();
        // 60 stable, 60 worth of native: 120 total, but neither beats 100.
        assert!(!control(&fx, NetworkMode::Sandbox).can_invest(&investor, dec!(100)));
    }

    #[test]
    fn production_mode_ignores_sandbox_stablecoin() {
        let fx = Fixture::new();
        let investor = fx.investor(1, true);
        fx.ledger
            .credit(investor.account.public_key(), &sandbox_stable(), dec!(500))
            .unwrap();
        assert!(!control(&fx, NetworkMode::Production).can_invest(&investor, dec!(100)));
    }

    #[test]
    fn unreadable_balances_count_as_zero() {
        let fx = Fixture::new();
        let investor = fx.investor(1, true);
        fx.ledger
            .credit(investor.account.public_key(), &sandbox_stable(), dec!(500))
            .unwrap();
        fx.ledger.set_offline(true);
        assert!(!control(&fx, NetworkMode::Sandbox).can_invest(&investor, dec!(1)));
    }

    #[test]
    fn oracle_rate_is_respected() {
        let fx = Fixture::new();
        let investor = fx.investor(1, true);
        fx.ledger
            .credit(investor.account.public_key(), &AssetSelector::Native, dec!(100))
            .unwrap();
        let oracle = Arc::new(FixedRateOracle::new(dec!(3)));
        let control = AdmissionControl::new(fx.ledger.clone(), oracle, &EngineConfig::default());
        assert!(control.can_invest(&investor, dec!(299)));
    }
}
