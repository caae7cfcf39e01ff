//! Integration tests across the protocol collaborators.
//!
//! These walk the path a wallet takes through the system: provisioned and
//! sealed, stored with its owner's record, reloaded, unsealed and used to
//! sign a ledger transfer. Repository and sandbox ledger share one sled
//! database, as they do in the operator node.

use rust_decimal_macros::dec;

use solarfund_protocol::config::REPLENISH_MEMO;
use solarfund_protocol::crypto::SigningSecret;
use solarfund_protocol::ledger::{AssetCode, AssetSelector, LedgerClient, LedgerError, SandboxLedger};
use solarfund_protocol::model::{Account, Entity, Project, PublicEntity, Wallet};
use solarfund_protocol::storage::{Repository, SolarDb};
use solarfund_protocol::vault::{CredentialVault, SeedVault, VaultError};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn setup() -> (SolarDb, SandboxLedger) {
    let db = SolarDb::open_temporary().expect("temp db");
    let ledger = SandboxLedger::open(db.handle().clone()).expect("ledger");
    (db, ledger)
}

fn provisioned_guarantor(vault: &SeedVault, index: u32, passphrase: &str) -> Entity {
    let secret = SigningSecret::generate();
    let wallet = Wallet {
        public_key: secret.public_key_hex(),
        encrypted_seed: vault.seal(&secret, passphrase).expect("seal"),
    };
    Entity::guarantor(Account::new(index, "Meridian Sureties", wallet))
}

fn usd() -> AssetSelector {
    AssetSelector::Custom(AssetCode::new("STABLEUSD", "issuer"))
}

// ---------------------------------------------------------------------------
// Wallet lifecycle
// ---------------------------------------------------------------------------

#[test]
fn stored_wallet_unseals_and_signs_a_transfer() {
    let (db, ledger) = setup();
    let vault = SeedVault::new();
    let entity = provisioned_guarantor(&vault, 1, "pw-1");
    let project = Project::new(2, SigningSecret::generate().public_key_hex());
    db.save_entity(&entity).unwrap();
    db.save_project(&project).unwrap();

    let stored = db.retrieve_entity(1).unwrap().expect("entity stored");
    let secret = vault
        .decrypt_seed(&stored.account.wallet.encrypted_seed, "pw-1")
        .unwrap();
    assert_eq!(secret.public_key_hex(), stored.account.wallet.public_key);

    ledger
        .credit(stored.account.public_key(), &usd(), dec!(75))
        .unwrap();
    let receipt = ledger
        .transfer(&usd(), &project.escrow_pubkey, dec!(25), &secret, REPLENISH_MEMO)
        .unwrap();

    assert_eq!(ledger.balance(&project.escrow_pubkey, &usd()).unwrap(), dec!(25));
    assert_eq!(ledger.balance(stored.account.public_key(), &usd()).unwrap(), dec!(50));
    let entry = ledger.find_transaction(&receipt.tx_id).unwrap().unwrap();
    assert_eq!(entry.source, stored.account.wallet.public_key);
}

#[test]
fn one_wallet_cannot_sign_for_another() {
    let (_, ledger) = setup();
    let vault = SeedVault::new();
    let alice = provisioned_guarantor(&vault, 1, "alice");
    let mallory = SigningSecret::generate();

    ledger
        .credit(alice.account.public_key(), &usd(), dec!(100))
        .unwrap();

    // A transfer signed by mallory debits mallory's (empty) wallet, never alice's.
    let err = ledger
        .transfer(&usd(), &mallory.public_key_hex(), dec!(10), &mallory, "x")
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert_eq!(ledger.balance(alice.account.public_key(), &usd()).unwrap(), dec!(100));
}

#[test]
fn sealed_seed_in_the_record_is_useless_without_the_passphrase() {
    let (db, _) = setup();
    let vault = SeedVault::new();
    let entity = provisioned_guarantor(&vault, 1, "correct");
    db.save_entity(&entity).unwrap();

    let stored = db.retrieve_entity(1).unwrap().unwrap();
    assert_eq!(
        vault
            .decrypt_seed(&stored.account.wallet.encrypted_seed, "incorrect")
            .unwrap_err(),
        VaultError::WrongPassphrase
    );
}

#[test]
fn public_view_of_a_stored_entity_carries_no_secrets() {
    let (db, _) = setup();
    let vault = SeedVault::new();
    let entity = provisioned_guarantor(&vault, 4, "pw");
    db.save_entity(&entity).unwrap();

    let view = PublicEntity::from(&db.retrieve_entity(4).unwrap().unwrap());
    let json = serde_json::to_string(&view).unwrap();
    assert!(!json.contains(&entity.account.wallet.encrypted_seed.sealed));
    assert!(json.contains(&entity.account.wallet.public_key));
}
