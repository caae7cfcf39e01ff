//! # CLI Interface
//!
//! Defines the command-line argument structure for `solarfund-node` using
//! `clap` derive. Global options select the data directory, network and
//! config file; each subcommand maps to one operator action.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::logging::LogFormat;

/// SolarFund operator node.
///
/// Runs guarantee-engine operations against a local data directory that
/// holds the platform records and, on sandbox networks, the sandbox ledger.
#[derive(Parser, Debug)]
#[command(
    name = "solarfund-node",
    about = "SolarFund guarantee engine operator node",
    version,
    propagate_version = true
)]
pub struct SolarNodeCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Data directory holding the record database and config file.
    #[arg(
        long,
        short = 'd',
        env = "SOLARFUND_DATA_DIR",
        default_value = "./solarfund-data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Engine config file (JSON). Defaults to `config.json` in the data
    /// directory when that file exists.
    #[arg(long, short = 'c', env = "SOLARFUND_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Network override: sandbox (testnet) or production (mainnet).
    #[arg(long, env = "SOLARFUND_NETWORK", global = true)]
    pub network: Option<String>,

    /// Log output format.
    #[arg(long, env = "SOLARFUND_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and write a default config file.
    Init(InitArgs),
    /// Load entity, investor and project records from a JSON bundle.
    Import(ImportArgs),
    /// Credit a sandbox ledger balance. Sandbox networks only.
    Faucet(FaucetArgs),
    /// Register a first-loss guarantee on a guarantor entity.
    RegisterGuarantee(RegisterGuaranteeArgs),
    /// Move guarantor funds into a project's escrow account.
    Replenish(ReplenishArgs),
    /// Check whether an investor can cover an investment.
    CanInvest(CanInvestArgs),
    /// Add to or subtract from an investor's voting balance.
    AdjustVotes(AdjustVotesArgs),
    /// Print the public view of an investor as JSON.
    ShowInvestor(ShowInvestorArgs),
    /// Print public views of all investors, or the top ones by reputation.
    ListInvestors(ListInvestorsArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the bundle file.
    pub bundle: PathBuf,
}

#[derive(Args, Debug)]
pub struct FaucetArgs {
    /// Hex public key to credit.
    pub public_key: String,

    /// Amount to mint.
    pub amount: Decimal,

    /// Issued asset code. Native currency when omitted.
    #[arg(long)]
    pub asset: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegisterGuaranteeArgs {
    /// Guarantor entity index.
    pub entity: u32,

    /// Pledged first-loss amount.
    pub amount: Decimal,

    /// Custody handle backing the pledge.
    #[arg(long, env = "SOLARFUND_CREDENTIAL", hide_env_values = true)]
    pub credential: String,
}

#[derive(Args, Debug)]
pub struct ReplenishArgs {
    /// Guarantor entity index.
    pub entity: u32,

    /// Project index whose escrow receives the funds.
    pub project: u32,

    /// Amount requested.
    pub amount: Decimal,

    /// Issued asset code. Native currency when omitted.
    #[arg(long, requires = "issuer")]
    pub asset: Option<String>,

    /// Issuer public key of `--asset`.
    #[arg(long)]
    pub issuer: Option<String>,

    /// Passphrase that unseals the guarantor's wallet.
    #[arg(long, env = "SOLARFUND_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,
}

#[derive(Args, Debug)]
pub struct CanInvestArgs {
    /// Investor index.
    pub investor: u32,

    /// Investment amount to check.
    pub target: Decimal,
}

#[derive(Args, Debug)]
pub struct AdjustVotesArgs {
    /// Investor index.
    pub investor: u32,

    /// Signed change to the voting balance.
    #[arg(allow_hyphen_values = true)]
    pub delta: Decimal,
}

#[derive(Args, Debug)]
pub struct ShowInvestorArgs {
    /// Investor index.
    pub investor: u32,
}

#[derive(Args, Debug)]
pub struct ListInvestorsArgs {
    /// Only the N investors with the highest reputation.
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        SolarNodeCli::command().debug_assert();
    }

    #[test]
    fn negative_vote_delta_parses() {
        let cli = SolarNodeCli::try_parse_from(["solarfund-node", "adjust-votes", "4", "-2.5"])
            .unwrap();
        match cli.command {
            Commands::AdjustVotes(args) => {
                assert_eq!(args.investor, 4);
                assert_eq!(args.delta, Decimal::new(-25, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn list_investors_top_is_optional() {
        let cli = SolarNodeCli::try_parse_from(["solarfund-node", "list-investors"]).unwrap();
        assert!(matches!(cli.command, Commands::ListInvestors(ListInvestorsArgs { top: None })));

        let cli = SolarNodeCli::try_parse_from(["solarfund-node", "list-investors", "--top", "5"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::ListInvestors(ListInvestorsArgs { top: Some(5) })
        ));
    }

    #[test]
    fn asset_requires_issuer() {
        let result = SolarNodeCli::try_parse_from([
            "solarfund-node",
            "replenish",
            "1",
            "2",
            "10",
            "--asset",
            "STABLEUSD",
            "--passphrase",
            "pw",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = SolarNodeCli::try_parse_from([
            "solarfund-node",
            "can-invest",
            "1",
            "100",
            "--network",
            "production",
            "--data-dir",
            "/tmp/sf",
        ])
        .unwrap();
        assert_eq!(cli.global.network.as_deref(), Some("production"));
        assert_eq!(cli.global.data_dir, PathBuf::from("/tmp/sf"));
    }
}
