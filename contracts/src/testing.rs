//! Shared fixtures for unit tests.

use std::sync::Arc;

use solarfund_protocol::crypto::SigningSecret;
use solarfund_protocol::ledger::SandboxLedger;
use solarfund_protocol::model::{Account, Entity, Investor, Project, Wallet};
use solarfund_protocol::oracle::FixedRateOracle;
use solarfund_protocol::storage::{Repository, SolarDb};
use solarfund_protocol::vault::{EncryptedSeed, SeedVault};

pub const PASSPHRASE: &str = "sun and sand";

/// One sled instance shared by the repository and the sandbox ledger.
pub struct Fixture {
    pub db: Arc<SolarDb>,
    pub ledger: Arc<SandboxLedger>,
    pub vault: Arc<SeedVault>,
    pub oracle: Arc<FixedRateOracle>,
}

impl Fixture {
    pub fn new() -> Self {
        let db = SolarDb::open_temporary().expect("temp db");
        let ledger = SandboxLedger::open(db.handle().clone()).expect("sandbox ledger");
        Self {
            db: Arc::new(db),
            ledger: Arc::new(ledger),
            vault: Arc::new(SeedVault::new()),
            oracle: Arc::new(FixedRateOracle::default()),
        }
    }

    /// A wallet whose seed is sealed under [`PASSPHRASE`].
    pub fn wallet(&self) -> Wallet {
        let secret = SigningSecret::generate();
        Wallet {
            public_key: secret.public_key_hex(),
            encrypted_seed: self.vault.seal(&secret, PASSPHRASE).expect("seal"),
        }
    }

    pub fn guarantor(&self, index: u32) -> Entity {
        let entity = Entity::guarantor(Account::new(index, "Bright Guarantee", self.wallet()));
        self.db.save_entity(&entity).expect("save entity");
        entity
    }

    pub fn plain_entity(&self, index: u32) -> Entity {
        let entity = Entity::new(Account::new(index, "Panel Contractor", self.wallet()));
        self.db.save_entity(&entity).expect("save entity");
        entity
    }

    pub fn investor(&self, index: u32, legal: bool) -> Investor {
        let mut account = Account::new(index, "Ada Investor", self.wallet());
        account.legal = legal;
        let investor = Investor::new(account);
        self.db.save_investor(&investor).expect("save investor");
        investor
    }

    pub fn project(&self, index: u32) -> Project {
        let project = Project::new(index, SigningSecret::generate().public_key_hex());
        self.db.save_project(&project).expect("save project");
        project
    }
}

/// A wallet record that no passphrase can open.
pub fn unopenable_seed() -> EncryptedSeed {
    EncryptedSeed {
        salt: "00".repeat(16),
        sealed: "ab".repeat(60),
    }
}
