//! `seqcode ticket` command.

use crate::cli::TicketAction;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::registry::{NewTicket, Ticket};

/// Execute a `ticket` action.
///
/// # Errors
///
/// Returns an error string if the ticket cannot be opened, listed or updated.
pub fn run(ctx: &ServiceContext, config: &Config, action: &TicketAction) -> Result<(), String> {
    let store = super::record_store(ctx, config);
    match action {
        TicketAction::Open { title, asset, scheduled, submission } => {
            let ticket = store
                .open_ticket(NewTicket {
                    title: title.clone(),
                    asset_code: asset.clone(),
                    scheduled_for: *scheduled,
                    submission_key: submission.clone(),
                })
                .map_err(|e| e.to_string())?;
            println!("{}", ticket.code);
        }
        TicketAction::List => {
            let tickets = store.list_tickets().map_err(|e| e.to_string())?;
            if tickets.is_empty() {
                println!("No tickets found in store.");
                return Ok(());
            }
            print_tickets(&tickets);
            println!("\n{} ticket(s) total.", tickets.len());
        }
        TicketAction::Status { code, status } => {
            let ticket = store.set_ticket_status(code, *status).map_err(|e| e.to_string())?;
            println!("{} is now {}", ticket.code, ticket.status);
        }
    }
    Ok(())
}

/// Prints tickets as an aligned table.
pub(crate) fn print_tickets(tickets: &[Ticket]) {
    let code_width = tickets.iter().map(|t| t.code.len()).max().unwrap_or(4).max(4);
    println!(
        "{:<code_width$}  {:<11}  {:<10}  {:<16}  TITLE",
        "CODE", "STATUS", "SCHEDULED", "ASSET",
    );
    for t in tickets {
        let scheduled = t.scheduled_for.map(|d| d.to_string()).unwrap_or_default();
        let asset = t.asset_code.as_deref().unwrap_or("");
        println!(
            "{:<code_width$}  {:<11}  {scheduled:<10}  {asset:<16}  {}",
            t.code,
            t.status.to_string(),
            t.title,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use crate::registry::TicketStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn open_list_and_close() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let ctx = ServiceContext::in_memory(Box::new(FixedClock::new(now)));
        let config = Config::default();

        let open = TicketAction::Open {
            title: "Printer jam".into(),
            asset: None,
            scheduled: None,
            submission: Some("form-1".into()),
        };
        run(&ctx, &config, &open).unwrap();
        run(&ctx, &config, &open).unwrap();
        run(&ctx, &config, &TicketAction::List).unwrap();
        run(
            &ctx,
            &config,
            &TicketAction::Status { code: "TKT-2503-0001".into(), status: TicketStatus::Done },
        )
        .unwrap();

        let tickets = super::super::record_store(&ctx, &config).list_tickets().unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].status, TicketStatus::Done);
    }

    #[test]
    fn unknown_ticket_status_update_fails() {
        let ctx = ServiceContext::in_memory(Box::new(FixedClock::new(Utc::now())));
        let action =
            TicketAction::Status { code: "TKT-2501-0009".into(), status: TicketStatus::Open };
        assert!(run(&ctx, &Config::default(), &action).is_err());
    }
}
