//! ballotbox daemon: drives an election ledger from the command line.
//!
//! Every command opens the ledger, runs one operation and prints its result as
//! JSON on stdout. Logs go to stderr. Rejected calls exit non-zero.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use serde_json::json;

use ballotbox_election::{ElectionCall, SignedCall};
use ballotbox_node::{init_logging, BallotboxNode, LogFormat, NodeConfig};
use ballotbox_types::{CandidateId, Principal};

#[derive(Parser)]
#[command(name = "ballotbox-daemon", about = "Single-administrator election ledger")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOTBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the ledger.
    #[arg(long, env = "BALLOTBOX_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Election administrator (0x followed by 40 hex digits).
    #[arg(long, env = "BALLOTBOX_ADMIN")]
    admin: Option<Principal>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOTBOX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOTBOX_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create a new election owned by --admin, or show the existing one.
    Init,
    /// Register a voter (admin only, Setup phase).
    RegisterVoter {
        #[arg(long)]
        caller: Principal,
        #[arg(long)]
        voter: Principal,
    },
    /// Register a candidate (admin only, Setup phase).
    RegisterCandidate {
        #[arg(long)]
        caller: Principal,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        affiliation: String,
    },
    /// Open voting (admin only).
    Start {
        #[arg(long)]
        caller: Principal,
    },
    /// Close voting (admin only).
    End {
        #[arg(long)]
        caller: Principal,
    },
    /// Cast the caller's vote.
    Vote {
        #[arg(long)]
        caller: Principal,
        #[arg(long)]
        candidate: CandidateId,
    },
    /// Apply every call in a TOML batch file, committing them together.
    Batch {
        #[arg(long)]
        file: PathBuf,
    },
    /// Phase, registry sizes and turnout.
    Status,
    /// All candidates, best first.
    Rankings,
    /// The winner, or the provisional leader while voting is open.
    Winner,
    /// A principal's role and voter record.
    Voter {
        #[arg(long)]
        principal: Principal,
    },
}

/// Layout of a `batch --file` document.
#[derive(Deserialize)]
struct BatchFile {
    #[serde(default)]
    calls: Vec<SignedCall>,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let base = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)?,
        None => NodeConfig::default(),
    };
    Ok(NodeConfig {
        data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
        admin: cli.admin.or(base.admin),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.clone().unwrap_or(base.log_format),
        ..base
    })
}

fn load_batch(path: &Path) -> anyhow::Result<Vec<SignedCall>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    let batch: BatchFile = toml::from_str(&text)
        .with_context(|| format!("parsing batch file {}", path.display()))?;
    Ok(batch.calls)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    // Only `init` may create a ledger; every other command needs one.
    let node = match cli.command {
        Command::Init => BallotboxNode::init(config)?,
        _ => BallotboxNode::open(config)?,
    };
    let svc = node.service();

    let signed = |caller: Principal, call: ElectionCall| SignedCall::new(caller, call);

    let call = match cli.command {
        Command::Init => {
            return print_json(&json!({
                "admin": svc.admin().await,
                "policy": svc.policy().await,
                "status": svc.status().await,
            }));
        }
        Command::RegisterVoter { caller, voter } => {
            signed(caller, ElectionCall::RegisterVoter { voter })
        }
        Command::RegisterCandidate {
            caller,
            name,
            affiliation,
        } => signed(caller, ElectionCall::RegisterCandidate { name, affiliation }),
        Command::Start { caller } => signed(caller, ElectionCall::StartVoting),
        Command::End { caller } => signed(caller, ElectionCall::EndVoting),
        Command::Vote { caller, candidate } => {
            signed(caller, ElectionCall::CastVote { candidate })
        }
        Command::Batch { file } => {
            let calls = load_batch(&file)?;
            let results = svc.submit_batch(calls).await?;
            let rejected = results.iter().filter(|r| r.is_err()).count();
            let report: Vec<_> = results
                .iter()
                .enumerate()
                .map(|(index, result)| match result {
                    Ok(changes) => json!({ "index": index, "ok": true, "changes": changes }),
                    Err(e) => json!({
                        "index": index,
                        "ok": false,
                        "kind": e.kind(),
                        "error": e.to_string(),
                    }),
                })
                .collect();
            print_json(&json!({ "results": report, "rejected": rejected }))?;
            if rejected > 0 {
                anyhow::bail!("{rejected} of {} calls rejected", results.len());
            }
            return Ok(());
        }
        Command::Status => return print_json(&json!(svc.status().await)),
        Command::Rankings => return print_json(&json!(svc.rankings().await)),
        Command::Winner => return print_json(&json!(svc.winner().await)),
        Command::Voter { principal } => {
            return print_json(&json!({
                "principal": principal,
                "role": svc.role_of(&principal).await.as_str(),
                "voter": svc.voter(&principal).await,
            }));
        }
    };

    let operation = call.call.operation();
    let changes = svc
        .submit(call)
        .await
        .with_context(|| format!("{operation} rejected"))?;
    tracing::debug!(%operation, changes = changes.len(), "call applied");
    print_json(&json!({ "operation": operation.as_str(), "changes": changes }))
}
