//! CLI argument definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::registry::TicketStatus;

/// Top-level CLI parser for `seqcode`.
#[derive(Debug, Parser)]
#[command(name = "seqcode", version, about = "Issue asset and maintenance-ticket codes")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Issue the next code for an asset category.
    Next {
        /// Asset category, e.g. LAPTOP.
        category: String,
        /// Issue as of this date (YYYY-MM-DD) instead of today.
        #[arg(long)]
        at: Option<NaiveDate>,
        /// Print `{"code": ...}` instead of the bare code.
        #[arg(long)]
        json: bool,
    },
    /// Issue the next maintenance-ticket number.
    TicketNumber {
        /// Issue as of this date (YYYY-MM-DD) instead of today.
        #[arg(long)]
        at: Option<NaiveDate>,
        /// Print `{"code": ...}` instead of the bare code.
        #[arg(long)]
        json: bool,
    },
    /// Show the last code issued for a category.
    Show {
        /// Counter category.
        category: String,
        /// Period key (defaults to the current month).
        #[arg(long)]
        period: Option<String>,
    },
    /// List sequence counters.
    List {
        /// Only this category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Split a code into its period and sequence.
    Parse {
        /// Code to parse, e.g. LAPTOP-2501-0001.
        code: String,
        /// Asset category the code belongs to (inferred when omitted).
        #[arg(long)]
        category: Option<String>,
    },
    /// Register and list assets.
    Asset {
        /// Asset action.
        #[command(subcommand)]
        action: AssetAction,
    },
    /// Open, list and update maintenance tickets.
    Ticket {
        /// Ticket action.
        #[command(subcommand)]
        action: TicketAction,
    },
    /// Show tickets grouped by month.
    Planner {
        /// Only this calendar year.
        #[arg(long)]
        year: Option<i32>,
    },
}

/// `seqcode asset` actions.
#[derive(Debug, Subcommand)]
pub enum AssetAction {
    /// Register an asset under the next code for its type.
    Add {
        /// Asset type (counter category).
        #[arg(long = "type")]
        asset_type: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Idempotency key; resubmitting it returns the first asset.
        #[arg(long)]
        submission: Option<String>,
    },
    /// List registered assets.
    List,
}

/// `seqcode ticket` actions.
#[derive(Debug, Subcommand)]
pub enum TicketAction {
    /// Open a ticket under the next ticket number.
    Open {
        /// Short description of the work.
        #[arg(long)]
        title: String,
        /// Code of the asset the work is for.
        #[arg(long)]
        asset: Option<String>,
        /// Planned date (YYYY-MM-DD).
        #[arg(long)]
        scheduled: Option<NaiveDate>,
        /// Idempotency key; resubmitting it returns the first ticket.
        #[arg(long)]
        submission: Option<String>,
    },
    /// List tickets.
    List,
    /// Change a ticket's status.
    Status {
        /// Ticket number.
        code: String,
        /// New status: open, in_progress or done.
        status: TicketStatus,
    },
}

impl Command {
    /// Date the clock should be pinned to, if the command asked for one.
    #[must_use]
    pub fn pinned_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Next { at, .. } | Self::TicketNumber { at, .. } => *at,
            _ => None,
        }
    }
}
