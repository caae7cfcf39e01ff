//! # GuaranteeEngine
//!
//! One handle over every engine operation, wired from an [`EngineConfig`]
//! and the four collaborators. Callers that only need one capability can
//! construct the component directly instead.

use std::sync::Arc;

use rust_decimal::Decimal;

use solarfund_protocol::config::EngineConfig;
use solarfund_protocol::ledger::{AssetSelector, LedgerClient};
use solarfund_protocol::model::{Company, Entity, Investor, PublicInvestor};
use solarfund_protocol::oracle::PriceOracle;
use solarfund_protocol::storage::Repository;
use solarfund_protocol::vault::{CredentialRef, CredentialVault};

use crate::admission::AdmissionControl;
use crate::bookkeeping::InvestorBook;
use crate::error::GuaranteeError;
use crate::escrow::{EscrowReplenisher, ReplenishmentReceipt};
use crate::guarantor::GuarantorRegistry;
use crate::voting::VotingLedger;

/// Facade over the guarantee engine components.
pub struct GuaranteeEngine {
    config: EngineConfig,
    repo: Arc<dyn Repository>,
    guarantors: GuarantorRegistry,
    escrow: EscrowReplenisher,
    admission: AdmissionControl,
    voting: VotingLedger,
    book: InvestorBook,
}

impl GuaranteeEngine {
    /// Validate `config` and wire the components.
    pub fn new(
        config: EngineConfig,
        repo: Arc<dyn Repository>,
        ledger: Arc<dyn LedgerClient>,
        vault: Arc<dyn CredentialVault>,
        oracle: Arc<dyn PriceOracle>,
    ) -> Result<Self, GuaranteeError> {
        config.validate()?;
        tracing::info!(network = %config.network, fee_reserve = %config.fee_reserve,
            stablecoin = config.stablecoin_code(), "guarantee engine ready");

        Ok(Self {
            guarantors: GuarantorRegistry::new(repo.clone()),
            escrow: EscrowReplenisher::new(
                repo.clone(),
                ledger.clone(),
                vault,
                config.fee_reserve,
            ),
            admission: AdmissionControl::new(ledger, oracle, &config),
            voting: VotingLedger::new(repo.clone()),
            book: InvestorBook::new(repo.clone()),
            repo,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- lookups ------------------------------------------------------------

    /// Load an entity, failing with `NotFound` if absent.
    pub fn entity(&self, index: u32) -> Result<Entity, GuaranteeError> {
        self.repo
            .retrieve_entity(index)?
            .ok_or(GuaranteeError::NotFound {
                kind: "entity",
                index,
            })
    }

    /// Load an investor, failing with `NotFound` if absent.
    pub fn investor(&self, index: u32) -> Result<Investor, GuaranteeError> {
        self.repo
            .retrieve_investor(index)?
            .ok_or(GuaranteeError::NotFound {
                kind: "investor",
                index,
            })
    }

    /// Public view of an investor.
    pub fn public_investor(&self, index: u32) -> Result<PublicInvestor, GuaranteeError> {
        Ok(PublicInvestor::from(&self.investor(index)?))
    }

    /// Public views of every investor, in index order.
    pub fn public_investors(&self) -> Result<Vec<PublicInvestor>, GuaranteeError> {
        Ok(self
            .repo
            .retrieve_all_investors()?
            .iter()
            .map(PublicInvestor::from)
            .collect())
    }

    /// Public views of the `limit` investors with the highest reputation.
    /// Equal reputations keep index order.
    pub fn top_reputation_investors(
        &self,
        limit: usize,
    ) -> Result<Vec<PublicInvestor>, GuaranteeError> {
        let mut investors = self.repo.retrieve_all_investors()?;
        investors.sort_by(|a, b| b.account.reputation.cmp(&a.account.reputation));
        Ok(investors
            .iter()
            .take(limit)
            .map(PublicInvestor::from)
            .collect())
    }

    // -- operations ---------------------------------------------------------

    pub fn register_first_loss_guarantee(
        &self,
        entity: &mut Entity,
        credential: CredentialRef,
        amount: Decimal,
    ) -> Result<(), GuaranteeError> {
        self.guarantors
            .register_first_loss_guarantee(entity, credential, amount)
    }

    pub fn replenish(
        &self,
        entity: &Entity,
        project_index: u32,
        asset: &AssetSelector,
        amount: Decimal,
        passphrase: &str,
    ) -> Result<ReplenishmentReceipt, GuaranteeError> {
        self.escrow
            .replenish(entity, project_index, asset, amount, passphrase)
    }

    pub fn replenish_with_asset(
        &self,
        entity: &Entity,
        project_index: u32,
        asset_code: &str,
        issuer: &str,
        amount: Decimal,
        passphrase: &str,
    ) -> Result<ReplenishmentReceipt, GuaranteeError> {
        self.escrow
            .replenish_with_asset(entity, project_index, asset_code, issuer, amount, passphrase)
    }

    pub fn replenish_with_native(
        &self,
        entity: &Entity,
        project_index: u32,
        amount: Decimal,
        passphrase: &str,
    ) -> Result<ReplenishmentReceipt, GuaranteeError> {
        self.escrow
            .replenish_with_native(entity, project_index, amount, passphrase)
    }

    pub fn can_invest(&self, investor: &Investor, target: Decimal) -> bool {
        self.admission.can_invest(investor, target)
    }

    pub fn adjust_voting_balance(
        &self,
        investor: &mut Investor,
        delta: Decimal,
    ) -> Result<Decimal, GuaranteeError> {
        self.voting.adjust_voting_balance(investor, delta)
    }

    pub fn record_investment(
        &self,
        investor: &mut Investor,
        project_index: u32,
        project_asset: &str,
        amount: Decimal,
    ) -> Result<(), GuaranteeError> {
        self.book
            .record_investment(investor, project_index, project_asset, amount)
    }

    pub fn set_company(&self, investor: &mut Investor) -> Result<(), GuaranteeError> {
        self.book.set_company(investor)
    }

    pub fn set_company_details(
        &self,
        investor: &mut Investor,
        company: Company,
    ) -> Result<(), GuaranteeError> {
        self.book.set_company_details(investor, company)
    }
}
