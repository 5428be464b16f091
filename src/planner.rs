//! Maintenance planner: tickets grouped by calendar month.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::code::{code_order, DEFAULT_SEPARATOR};
use crate::registry::Ticket;

/// Tickets falling in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// Calendar year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Tickets ordered by period and sequence.
    pub tickets: Vec<Ticket>,
}

/// Groups `tickets` by the month they are scheduled for, or created in when
/// unscheduled. Buckets are ascending; `year` keeps only that year.
#[must_use]
pub fn plan(tickets: impl IntoIterator<Item = Ticket>, year: Option<i32>) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), Vec<Ticket>> = BTreeMap::new();
    for ticket in tickets {
        let date = ticket.scheduled_for.unwrap_or_else(|| ticket.created_at.date_naive());
        if year.is_some_and(|y| y != date.year()) {
            continue;
        }
        months.entry((date.year(), date.month())).or_default().push(ticket);
    }

    months
        .into_iter()
        .map(|((year, month), mut tickets)| {
            tickets.sort_by(|a, b| {
                code_order(&a.code, DEFAULT_SEPARATOR).cmp(&code_order(&b.code, DEFAULT_SEPARATOR))
            });
            MonthBucket { year, month, tickets }
        })
        .collect()
}
