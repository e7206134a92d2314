use att_core::{
    AssetRepository, ComplianceContract, HistoryRecord, HistoryService, Payload, QueryService,
    RecordValue, ReportContract, ResultRecord, TxId,
};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::cli::*;
use crate::connection::Connection;
use crate::profile::ConnectionProfile;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let profile = ConnectionProfile::resolve(cli.profile.as_deref(), cli.ledger.as_deref())?;
    let connection = Connection::open(&profile)?;
    let out = Output::new(cli.format, connection.profile());

    let result = match cli.command {
        Command::Report(cmd) => cmd_report(&connection, &out, cmd),
        Command::Euc(cmd) => cmd_euc(&connection, &out, cmd),
        Command::Get(args) => cmd_get(&connection, &out, args),
        Command::Query(args) => {
            let records = QueryService::new(connection.ledger()).find_by_query_string(&args.query)?;
            out.results(&records)
        }
        Command::History(args) => {
            let records = HistoryService::new(connection.ledger()).history_of(&args.key)?;
            out.history(&records)
        }
    };

    connection.close();
    result
}

fn cmd_report(connection: &Connection, out: &Output, cmd: ReportCommand) -> anyhow::Result<()> {
    let contract = ReportContract::new(connection.ledger());
    match cmd {
        ReportCommand::Exists(args) => out.exists(&args.key, contract.report_exists(&args.key)?),
        ReportCommand::Create(args) => {
            out.committed("created", &args.key, contract.create_report(&args.key, &args.value)?)
        }
        ReportCommand::Read(args) => out.payload(&args.key, &contract.read_report(&args.key)?),
        ReportCommand::Update(args) => {
            out.committed("updated", &args.key, contract.update_report(&args.key, &args.value)?)
        }
        ReportCommand::Delete(args) => {
            out.committed("deleted", &args.key, contract.delete_report(&args.key)?)
        }
    }
}

fn cmd_euc(connection: &Connection, out: &Output, cmd: EucCommand) -> anyhow::Result<()> {
    let contract = ComplianceContract::new(connection.ledger());
    match cmd {
        EucCommand::Exists(args) => out.exists(&args.key, contract.artifact_exists(&args.key)?),
        EucCommand::Create(args) => {
            let tx_id = contract.create_euc_request(args.args.as_slice())?;
            let key = args.args.first().map(String::as_str).unwrap_or_default();
            out.committed("filed", key, tx_id)
        }
        EucCommand::Read(args) => out.payload(&args.key, &contract.read_euc_request(&args.key)?),
        EucCommand::Update(args) => out.committed(
            "updated",
            &args.key,
            contract.update_euc_request(&args.key, &args.value)?,
        ),
        EucCommand::Approve(args) => {
            out.committed("approved", &args.key, contract.approve_euc_request(&args.key)?)
        }
        EucCommand::Delete(args) => {
            out.committed("deleted", &args.key, contract.delete_euc_request(&args.key)?)
        }
        EucCommand::Open => out.results(&contract.open_euc_requests()?),
        EucCommand::WithState(args) => {
            out.results(&contract.euc_requests_with_state(args.approved)?)
        }
    }
}

fn cmd_get(connection: &Connection, out: &Output, args: GetArgs) -> anyhow::Result<()> {
    let repo = AssetRepository::new(connection.ledger());
    if args.raw {
        let bytes = repo.read_raw(&args.key)?;
        println!("{}", String::from_utf8_lossy(&bytes));
        return Ok(());
    }
    out.payload(&args.key, &repo.read(&args.key)?)
}

struct Output {
    format: OutputFormat,
    signer: String,
}

impl Output {
    fn new(format: OutputFormat, profile: &ConnectionProfile) -> Self {
        Self {
            format,
            signer: format!("{}@{}", profile.identity, profile.channel),
        }
    }

    fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn exists(&self, key: &str, exists: bool) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&json!({"key": key, "exists": exists})),
            OutputFormat::Text => {
                let state = if exists { "exists".green() } else { "does not exist".red() };
                println!("{} {}", key.yellow().bold(), state);
                Ok(())
            }
        }
    }

    fn committed(&self, action: &str, key: &str, tx_id: TxId) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.json(&json!({"key": key, "action": action, "txId": tx_id}))
            }
            OutputFormat::Text => {
                println!("{} {} {}", "✓".green().bold(), key.yellow().bold(), action);
                println!("  Tx: {}", tx_id.to_string().cyan());
                println!("  By: {}", self.signer);
                Ok(())
            }
        }
    }

    fn payload(&self, key: &str, payload: &Payload) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(payload),
            OutputFormat::Text => {
                println!("{}", key.yellow().bold());
                println!("{}", serde_json::to_string_pretty(payload)?);
                Ok(())
            }
        }
    }

    fn results(&self, records: &[ResultRecord]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&records),
            OutputFormat::Text => {
                if records.is_empty() {
                    println!("No matching documents.");
                }
                for record in records {
                    println!("{}  {}", record.key.yellow().bold(), render(&record.record));
                }
                Ok(())
            }
        }
    }

    fn history(&self, records: &[HistoryRecord]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&records),
            OutputFormat::Text => {
                if records.is_empty() {
                    println!("No history.");
                }
                for record in records {
                    let kind = if record.is_delete {
                        "DELETE".red().bold()
                    } else {
                        "WRITE ".green().bold()
                    };
                    println!(
                        "{} {} {}  {}",
                        record.tx_id.short_id().dimmed(),
                        record.timestamp.to_string().cyan(),
                        kind,
                        render(&record.value)
                    );
                }
                Ok(())
            }
        }
    }
}

fn render(value: &RecordValue) -> String {
    match value {
        RecordValue::Json(json) => json.to_string(),
        RecordValue::Raw(text) => format!("{} {}", text, "(not JSON)".dimmed()),
    }
}
