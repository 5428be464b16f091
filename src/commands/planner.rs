//! `seqcode planner` command.

use chrono::NaiveDate;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::planner::plan;

/// Execute the `planner` command.
///
/// Prints one section per month with that month's tickets.
///
/// # Errors
///
/// Returns an error string if tickets cannot be loaded.
pub fn run(ctx: &ServiceContext, config: &Config, year: Option<i32>) -> Result<(), String> {
    let tickets = super::record_store(ctx, config).list_tickets().map_err(|e| e.to_string())?;
    let buckets = plan(tickets, year);
    if buckets.is_empty() {
        println!("No tickets planned.");
        return Ok(());
    }

    for bucket in &buckets {
        let label = NaiveDate::from_ymd_opt(bucket.year, bucket.month, 1).map_or_else(
            || format!("{}-{:02}", bucket.year, bucket.month),
            |d| d.format("%B %Y").to_string(),
        );
        println!("== {label} ({} ticket(s))", bucket.tickets.len());
        super::ticket::print_tickets(&bucket.tickets);
        println!();
    }
    Ok(())
}
