use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "att",
    about = "ATT Ledger — arms trade treaty reports and end-user-certificate requests",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Connection profile (TOML)
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Ledger file, overriding the profile
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage ATT reports
    #[command(subcommand)]
    Report(ReportCommand),
    /// Manage end-user-certificate verification requests
    #[command(subcommand)]
    Euc(EucCommand),
    /// Read any stored document
    Get(GetArgs),
    /// Run a rich query: '{"selector": {...}}'
    Query(QueryArgs),
    /// Show the change history of a key
    History(KeyArgs),
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Check whether a report exists
    Exists(KeyArgs),
    /// Create a report
    Create(ValueArgs),
    /// Read a report
    Read(KeyArgs),
    /// Replace a report's value
    Update(ValueArgs),
    /// Delete a report
    Delete(KeyArgs),
}

#[derive(Subcommand)]
pub enum EucCommand {
    /// Check whether a request exists
    Exists(KeyArgs),
    /// File a request: <id> <requestor> <details>
    Create(EucCreateArgs),
    /// Read a request
    Read(KeyArgs),
    /// Overwrite a request with a plain value
    Update(ValueArgs),
    /// Approve a request
    Approve(KeyArgs),
    /// Delete a request
    Delete(KeyArgs),
    /// List requests awaiting approval
    Open,
    /// List requests by approval state
    WithState(StateArgs),
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ValueArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct EucCreateArgs {
    /// Request id, requestor and shipment details
    #[arg(num_args = 0..)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct StateArgs {
    #[arg(action = clap::ArgAction::Set)]
    pub approved: bool,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    /// Print stored bytes without decoding
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    pub query: String,
}
