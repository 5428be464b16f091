//! Command dispatch and handlers.

pub mod asset;
pub mod next;
pub mod parse;
pub mod planner;
pub mod show;
pub mod ticket;

use chrono::{NaiveTime, TimeZone, Utc};

use crate::adapters::fixed::FixedClock;
use crate::cli::Command;
use crate::code::CodeFamily;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::generator::CodeGenerator;
use crate::registry::RecordStore;

/// Dispatch a parsed command to its handler.
///
/// Builds a live context for the configured backend. `--at` pins its clock.
///
/// # Errors
///
/// Returns an error string if the context cannot be built or the selected
/// command handler fails.
pub fn dispatch(command: &Command, config: &Config) -> Result<(), String> {
    // Parsing needs no store.
    if let Command::Parse { code, category } = command {
        return parse::run(config, code, category.as_deref());
    }

    let mut ctx = ServiceContext::live(config)?;
    if let Some(date) = command.pinned_date() {
        let at = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        ctx = ctx.with_clock(Box::new(FixedClock::new(at)));
    }
    dispatch_with_context(command, &ctx, config)
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &Config,
) -> Result<(), String> {
    match command {
        Command::Next { category, json, .. } => next::run_asset(ctx, config, category, *json),
        Command::TicketNumber { json, .. } => next::run_ticket(ctx, config, *json),
        Command::Show { category, period } => show::run(ctx, config, category, period.as_deref()),
        Command::List { category } => show::run_list(ctx, config, category.as_deref()),
        Command::Parse { code, category } => parse::run(config, code, category.as_deref()),
        Command::Asset { action } => asset::run(ctx, config, action),
        Command::Ticket { action } => ticket::run(ctx, config, action),
        Command::Planner { year } => planner::run(ctx, config, *year),
    }
}

/// Generator for asset numbers.
#[must_use]
pub fn asset_generator<'a>(ctx: &'a ServiceContext, config: &Config) -> CodeGenerator<'a> {
    CodeGenerator::new(ctx, CodeFamily::assets(config.width)).with_max_attempts(config.max_attempts)
}

/// Generator for ticket numbers.
#[must_use]
pub fn ticket_generator<'a>(ctx: &'a ServiceContext, config: &Config) -> CodeGenerator<'a> {
    CodeGenerator::new(ctx, CodeFamily::tickets(config.ticket_prefix.clone(), config.width))
        .with_max_attempts(config.max_attempts)
}

/// Record store rooted at the configured store directory.
#[must_use]
pub fn record_store<'a>(ctx: &'a ServiceContext, config: &Config) -> RecordStore<'a> {
    RecordStore::new(
        ctx,
        &config.store_root,
        asset_generator(ctx, config),
        ticket_generator(ctx, config),
    )
}
