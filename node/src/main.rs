// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SolarFund Operator Node
//!
//! Entry point for the `solarfund-node` binary. Parses CLI arguments,
//! initializes logging, opens the data directory and runs one
//! guarantee-engine operation.
//!
//! Subcommands:
//!
//! - `init`               — create the data directory and default config
//! - `import`             — load records from a JSON bundle
//! - `faucet`             — credit a sandbox ledger balance
//! - `register-guarantee` — attach a first-loss pledge to a guarantor
//! - `replenish`          — top up a project's escrow from a guarantor
//! - `can-invest`         — run investor admission control
//! - `adjust-votes`       — change an investor's voting balance
//! - `show-investor`      — print an investor's public view
//! - `list-investors`     — print all public investor views, or the top ones
//! - `version`            — print build version information
//!
//! On sandbox networks the ledger is a [`SandboxLedger`] living in the same
//! sled database as the records. No production ledger client is wired into
//! this binary: on production networks the record-only commands work and
//! `faucet`, `replenish` and `can-invest` refuse to run.

mod bundle;
mod cli;
mod logging;
mod settings;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;

use solarfund_contracts::GuaranteeEngine;
use solarfund_protocol::config::{EngineConfig, NetworkMode};
use solarfund_protocol::crypto::SigningSecret;
use solarfund_protocol::ledger::{
    AssetCode, AssetSelector, LedgerClient, LedgerError, SandboxLedger, TransferReceipt,
};
use solarfund_protocol::oracle::FixedRateOracle;
use solarfund_protocol::storage::SolarDb;
use solarfund_protocol::vault::{CredentialRef, SeedVault};

use bundle::ImportBundle;
use cli::{Commands, GlobalArgs, SolarNodeCli};

fn main() -> Result<()> {
    let cli = SolarNodeCli::parse();
    logging::init_logging(logging::DEFAULT_DIRECTIVES, cli.global.log_format);

    match cli.command {
        Commands::Init(args) => init_node(&cli.global, args),
        Commands::Import(args) => import_bundle(&cli.global, args),
        Commands::Faucet(args) => faucet(&cli.global, args),
        Commands::RegisterGuarantee(args) => register_guarantee(&cli.global, args),
        Commands::Replenish(args) => replenish(&cli.global, args),
        Commands::CanInvest(args) => can_invest(&cli.global, args),
        Commands::AdjustVotes(args) => adjust_votes(&cli.global, args),
        Commands::ShowInvestor(args) => show_investor(&cli.global, args),
        Commands::ListInvestors(args) => list_investors(&cli.global, args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Everything a command needs, opened from the data directory.
struct Node {
    config: EngineConfig,
    db: Arc<SolarDb>,
    /// Present on sandbox networks only.
    sandbox: Option<Arc<SandboxLedger>>,
    engine: GuaranteeEngine,
}

impl Node {
    fn open(global: &GlobalArgs) -> Result<Self> {
        let config = settings::load_engine_config(
            &global.data_dir,
            global.config.as_deref(),
            global.network.as_deref(),
        )?;

        let db_path = global.data_dir.join(settings::DB_DIR);
        let db = open_db(&db_path)?;
        let (sandbox, ledger): (Option<Arc<SandboxLedger>>, Arc<dyn LedgerClient>) =
            match config.network {
                NetworkMode::Sandbox => {
                    let sandbox = Arc::new(
                        SandboxLedger::open(db.handle().clone())
                            .context("failed to open sandbox ledger trees")?,
                    );
                    let ledger: Arc<dyn LedgerClient> = sandbox.clone();
                    (Some(sandbox), ledger)
                }
                NetworkMode::Production => {
                    let ledger: Arc<dyn LedgerClient> = Arc::new(UnavailableLedger);
                    (None, ledger)
                }
            };
        let db = Arc::new(db);

        let engine = GuaranteeEngine::new(
            config.clone(),
            db.clone(),
            ledger,
            Arc::new(SeedVault::new()),
            Arc::new(FixedRateOracle::new(config.native_usd_rate)),
        )?;

        Ok(Self {
            config,
            db,
            sandbox,
            engine,
        })
    }

    /// Fails unless the node has a ledger it can query and submit to.
    fn require_ledger(&self) -> Result<()> {
        if self.sandbox.is_none() {
            bail!(
                "no ledger client is configured for the {} network",
                self.config.network
            );
        }
        Ok(())
    }
}

/// Stand-in ledger for networks this binary has no client for. Record-only
/// commands still work; anything touching balances fails.
struct UnavailableLedger;

impl UnavailableLedger {
    fn error() -> LedgerError {
        LedgerError::Unreachable("no ledger client configured".into())
    }
}

impl LedgerClient for UnavailableLedger {
    fn asset_balance(&self, _: &str, _: &str) -> Result<Decimal, LedgerError> {
        Err(Self::error())
    }

    fn native_balance(&self, _: &str) -> Result<Decimal, LedgerError> {
        Err(Self::error())
    }

    fn send_asset(
        &self,
        _: &str,
        _: &str,
        _: &str,
        _: Decimal,
        _: &SigningSecret,
        _: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        Err(Self::error())
    }

    fn send_native(
        &self,
        _: &str,
        _: Decimal,
        _: &SigningSecret,
        _: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        Err(Self::error())
    }
}

fn open_db(path: &Path) -> Result<SolarDb> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create database directory: {}", path.display()))?;
    let db = SolarDb::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "database opened");
    Ok(db)
}

fn selector(asset: Option<String>, issuer: Option<String>) -> AssetSelector {
    match asset {
        Some(code) => AssetSelector::Custom(AssetCode::new(code, issuer.unwrap_or_default())),
        None => AssetSelector::Native,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Creates the data directory, the database and a default config file.
fn init_node(global: &GlobalArgs, args: cli::InitArgs) -> Result<()> {
    let data_dir = &global.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let network = match global.network.as_deref() {
        Some(value) => settings::parse_network(value)?,
        None => NetworkMode::default(),
    };
    let config = EngineConfig::for_network(network);
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| settings::default_config_path(data_dir));
    settings::write_config(&config_path, &config, args.force)?;

    let db_path = data_dir.join(settings::DB_DIR);
    open_db(&db_path)?.flush()?;

    tracing::info!(data_dir = %data_dir.display(), %network, "data directory initialized");
    println!("Node initialized successfully.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Network        : {}", network);
    println!("  Config         : {}", config_path.display());
    Ok(())
}

fn import_bundle(global: &GlobalArgs, args: cli::ImportArgs) -> Result<()> {
    let node = Node::open(global)?;
    let summary = ImportBundle::read(&args.bundle)?.apply(&*node.db)?;
    node.db.flush()?;
    tracing::info!(
        entities = summary.entities,
        investors = summary.investors,
        projects = summary.projects,
        "bundle imported"
    );
    println!(
        "Imported {} entities, {} investors, {} projects.",
        summary.entities, summary.investors, summary.projects
    );
    Ok(())
}

fn faucet(global: &GlobalArgs, args: cli::FaucetArgs) -> Result<()> {
    let node = Node::open(global)?;
    let Some(sandbox) = node.sandbox.as_ref() else {
        bail!("the faucet is only available on sandbox networks");
    };
    let asset = selector(args.asset, None);
    let balance = sandbox
        .credit(&args.public_key, &asset, args.amount)
        .context("faucet credit failed")?;
    node.db.flush()?;
    println!("{} {} balance: {}", args.public_key, asset, balance);
    Ok(())
}

fn register_guarantee(global: &GlobalArgs, args: cli::RegisterGuaranteeArgs) -> Result<()> {
    let node = Node::open(global)?;
    let mut entity = node.engine.entity(args.entity)?;
    node.engine.register_first_loss_guarantee(
        &mut entity,
        CredentialRef::new(args.credential),
        args.amount,
    )?;
    node.db.flush()?;
    println!(
        "Registered first-loss guarantee of {} for entity {}.",
        entity.first_loss_guarantee_amt, args.entity
    );
    Ok(())
}

fn replenish(global: &GlobalArgs, args: cli::ReplenishArgs) -> Result<()> {
    let node = Node::open(global)?;
    node.require_ledger()?;
    let entity = node.engine.entity(args.entity)?;
    let asset = selector(args.asset, args.issuer);
    let receipt = node
        .engine
        .replenish(&entity, args.project, &asset, args.amount, &args.passphrase)
        .with_context(|| {
            format!(
                "replenishment from entity {} to project {} failed",
                args.entity, args.project
            )
        })?;
    node.db.flush()?;
    print_json(&receipt)
}

fn can_invest(global: &GlobalArgs, args: cli::CanInvestArgs) -> Result<()> {
    let node = Node::open(global)?;
    node.require_ledger()?;
    let investor = node.engine.investor(args.investor)?;
    let admitted = node.engine.can_invest(&investor, args.target);
    print_json(&serde_json::json!({
        "investor": args.investor,
        "target": args.target,
        "can_invest": admitted,
    }))
}

fn adjust_votes(global: &GlobalArgs, args: cli::AdjustVotesArgs) -> Result<()> {
    let node = Node::open(global)?;
    let mut investor = node.engine.investor(args.investor)?;
    let balance = node.engine.adjust_voting_balance(&mut investor, args.delta)?;
    node.db.flush()?;
    println!("Investor {} voting balance: {}", args.investor, balance);
    Ok(())
}

fn show_investor(global: &GlobalArgs, args: cli::ShowInvestorArgs) -> Result<()> {
    let node = Node::open(global)?;
    print_json(&node.engine.public_investor(args.investor)?)
}

fn list_investors(global: &GlobalArgs, args: cli::ListInvestorsArgs) -> Result<()> {
    let node = Node::open(global)?;
    let views = match args.top {
        Some(limit) => node.engine.top_reputation_investors(limit)?,
        None => node.engine.public_investors()?,
    };
    print_json(&views)
}

/// Prints version information to stdout.
fn print_version() {
    println!("solarfund-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
