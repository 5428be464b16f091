//! `seqcode parse` command.

use crate::code::{CodeFamily, PeriodKey, TICKET_CATEGORY};
use crate::config::Config;

/// Execute the `parse` command.
///
/// Without `--category`, a code starting with the ticket prefix is read as a
/// ticket number and anything else as an asset code whose prefix is its
/// category.
///
/// # Errors
///
/// Returns an error string if the code does not belong to the family.
pub fn run(config: &Config, code: &str, category: Option<&str>) -> Result<(), String> {
    let (category, period, sequence) = decode(config, code, category)
        .ok_or_else(|| format!("{code} is not a code this store issues"))?;
    println!("Category: {category}");
    println!("Period:   {period}");
    println!("Sequence: {sequence}");
    Ok(())
}

fn decode(config: &Config, code: &str, category: Option<&str>) -> Option<(String, PeriodKey, u64)> {
    let tickets = CodeFamily::tickets(config.ticket_prefix.clone(), config.width);
    let assets = CodeFamily::assets(config.width);

    if let Some(c) = category {
        return assets.parse(c, code).map(|(p, s)| (c.to_string(), p, s));
    }
    if let Some((p, s)) = tickets.parse(TICKET_CATEGORY, code) {
        return Some((TICKET_CATEGORY.to_string(), p, s));
    }
    let prefix = code.rsplitn(3, assets.separator).nth(2)?;
    assets.parse(prefix, code).map(|(p, s)| (prefix.to_string(), p, s))
}
