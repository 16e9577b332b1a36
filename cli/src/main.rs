//! Command-line front end for the advance portal.
//!
//! Every client-facing operation is a subcommand; state persists between
//! invocations through the checkpoint file named in the config. The
//! stand-in notifier writes to the log — wiring a real transport happens
//! outside this binary.

use advance_portal_core_rs::approval::digest;
use advance_portal_core_rs::models::money::{format_cents, parse_cents};
use advance_portal_core_rs::{
    LoggingNotifier, MonthKey, Portal, PortalConfig, RefreshOutcome, Role, Tier,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "advance-portal", about = "Commission advance portal", version)]
struct Cli {
    /// Path to the portal configuration file
    #[arg(long, default_value = "portal.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, ValueEnum)]
enum TierArg {
    Auto,
    DeptHead,
    Md,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Auto => Tier::Auto,
            TierArg::DeptHead => Tier::DeptHead,
            TierArg::Md => Tier::ManagingDirector,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SignerArg {
    DeptHead,
    Md,
}

impl From<SignerArg> for Role {
    fn from(arg: SignerArg) -> Self {
        match arg {
            SignerArg::DeptHead => Role::DeptHead,
            SignerArg::Md => Role::ManagingDirector,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Show how much an agent may request this month
    Eligibility {
        #[arg(long)]
        agent: String,
        /// Month to check, e.g. "Mar 2026" (defaults to the current month)
        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Submit an advance request
    Submit {
        #[arg(long)]
        agent: String,
        /// Amount in currency units, e.g. "5000" or "5000.50"
        #[arg(long)]
        amount: String,
        #[arg(long)]
        month: Option<MonthKey>,
    },

    /// Show an agent's own request history
    History {
        #[arg(long)]
        agent: String,
    },

    /// List every request (payroll credential required)
    List {
        #[arg(long)]
        secret: String,
    },

    /// Show the amount still awaiting decision for a month
    Total {
        #[arg(long)]
        month: MonthKey,
    },

    /// Approve one request under a tier credential (tiered policy)
    Approve {
        #[arg(long)]
        tier: TierArg,
        #[arg(long)]
        id: u64,
        #[arg(long)]
        secret: String,
        /// Origin address recorded in the audit trail
        #[arg(long, default_value = "cli")]
        origin: String,
    },

    /// Reject one request under a tier credential (tiered policy)
    Reject {
        #[arg(long)]
        tier: TierArg,
        #[arg(long)]
        id: u64,
        #[arg(long)]
        secret: String,
        #[arg(long, default_value = "cli")]
        origin: String,
    },

    /// Sign a month's aggregate (dual-sign-off policy)
    Sign {
        #[arg(long)]
        month: MonthKey,
        #[arg(long)]
        role: SignerArg,
        #[arg(long)]
        secret: String,
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Re-import the commission source if it changed
    Import,

    /// Show the approval audit trail
    Audit {
        #[arg(long)]
        secret: String,
    },

    /// Print the SHA-256 digest of a secret, for the config file
    HashSecret {
        secret: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // hash-secret needs no portal state
    if let Command::HashSecret { secret } = &cli.command {
        println!("{}", digest(secret));
        return Ok(());
    }

    let config = PortalConfig::from_toml_path(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let mut portal = Portal::load_or_new(config, Box::new(LoggingNotifier))?;

    match cli.command {
        Command::HashSecret { .. } => unreachable!("handled above"),

        Command::Eligibility { agent, month } => {
            let month = month.unwrap_or_else(MonthKey::current);
            let eligible = portal.eligibility_for(&agent, month)?;
            println!(
                "Agent {} may request up to {} for {}",
                agent,
                format_cents(eligible),
                month
            );
            if portal.has_request_for_month(&agent, month) {
                println!("A fund request for {month} has already been submitted");
            }
        }

        Command::Submit { agent, amount, month } => {
            let month = month.unwrap_or_else(MonthKey::current);
            let cents = parse_cents(&amount).context("parsing amount")?;
            let id = portal.submit_request_for_month(&agent, cents, month)?;
            portal.save_checkpoint()?;
            println!(
                "Request #{} for {} submitted for approval ({})",
                id,
                format_cents(cents),
                month
            );
        }

        Command::History { agent } => {
            let history = portal.my_history(&agent);
            if history.is_empty() {
                println!("No requests found for agent {agent}");
            }
            for request in history {
                println!(
                    "#{}  {}  {}  {:?}",
                    request.id(),
                    request.month(),
                    format_cents(request.requested_amount()),
                    request.status()
                );
            }
        }

        Command::List { secret } => {
            for request in portal.list_all(&secret)? {
                println!(
                    "#{}  {}  {}  {}  {}  {:?}",
                    request.id(),
                    request.agent_code(),
                    request.agent_name(),
                    request.month(),
                    format_cents(request.requested_amount()),
                    request.status()
                );
            }
        }

        Command::Total { month } => {
            println!(
                "Awaiting decision for {}: {}",
                month,
                format_cents(portal.total_requested(month))
            );
        }

        Command::Approve { tier, id, secret, origin } => {
            let entry = portal.approve_tier(tier.into(), id, &secret, &origin)?;
            portal.save_checkpoint()?;
            println!(
                "Request #{} approved ({}) for {}",
                id,
                entry.approval_level(),
                entry.agent_name()
            );
        }

        Command::Reject { tier, id, secret, origin } => {
            let entry = portal.reject_tier(tier.into(), id, &secret, &origin)?;
            portal.save_checkpoint()?;
            println!("Request #{} rejected for {}", id, entry.agent_name());
        }

        Command::Sign { month, role, secret, comment } => {
            let outcome = portal.approve_total(month, role.into(), &secret, &comment)?;
            portal.save_checkpoint()?;
            if outcome.fully_approved {
                println!(
                    "{} fully approved; {} request(s) released",
                    month,
                    outcome.released.len()
                );
            } else {
                println!("Sign-off recorded for {month}; waiting on the second signature");
            }
        }

        Command::Import => {
            match portal.refresh_ledger()? {
                RefreshOutcome::Unchanged => println!("Commission source unchanged"),
                RefreshOutcome::Applied { rows, skipped } => {
                    println!("Imported {rows} commission row(s), skipped {skipped}")
                }
            }
            portal.save_checkpoint()?;
        }

        Command::Audit { secret } => {
            // The audit trail is as sensitive as the full listing
            portal.list_all(&secret)?;
            for entry in portal.audit_log() {
                println!(
                    "{}  #{}  {}  {}  {:?}  from {}",
                    entry.timestamp(),
                    entry.request_id(),
                    entry.agent_name(),
                    entry.approval_level(),
                    entry.action(),
                    entry.origin_address()
                );
            }
        }
    }

    Ok(())
}
