//! `seqcode next` and `seqcode ticket-number` commands.

use std::collections::HashMap;

use crate::api;
use crate::code::TICKET_CATEGORY;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::generator::CodeGenerator;

/// Execute the `next` command: issue an asset code and print it.
///
/// # Errors
///
/// Returns the generic error message if no code was issued.
pub fn run_asset(
    ctx: &ServiceContext,
    config: &Config,
    category: &str,
    json: bool,
) -> Result<(), String> {
    let query = HashMap::from([("category".to_string(), category.to_string())]);
    issue(&super::asset_generator(ctx, config), &query, None, json)
}

/// Execute the `ticket-number` command: issue a ticket number and print it.
///
/// # Errors
///
/// Returns the generic error message if no code was issued.
pub fn run_ticket(ctx: &ServiceContext, config: &Config, json: bool) -> Result<(), String> {
    issue(&super::ticket_generator(ctx, config), &HashMap::new(), Some(TICKET_CATEGORY), json)
}

fn issue(
    generator: &CodeGenerator<'_>,
    query: &HashMap<String, String>,
    default_category: Option<&str>,
    json: bool,
) -> Result<(), String> {
    let response = api::next_code(generator, query, default_category);
    if response.status != 200 {
        return Err(response.body["error"].as_str().unwrap_or("failed to generate code").to_string());
    }
    if json {
        println!("{}", response.body);
    } else if let Some(code) = response.body["code"].as_str() {
        println!("{code}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use crate::code::PeriodKey;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ServiceContext {
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 15, 0, 0).unwrap();
        ServiceContext::in_memory(Box::new(FixedClock::new(now)))
    }

    #[test]
    fn next_advances_the_asset_counter() {
        let ctx = ctx();
        let config = Config::default();
        run_asset(&ctx, &config, "LAPTOP", false).unwrap();
        run_asset(&ctx, &config, "LAPTOP", true).unwrap();

        let gen = super::super::asset_generator(&ctx, &config);
        let last = gen.last_issued("LAPTOP", &PeriodKey::new("2501").unwrap()).unwrap().unwrap();
        assert_eq!(last.formatted_code, "LAPTOP-2501-0002");
    }

    #[test]
    fn ticket_number_uses_configured_prefix() {
        let ctx = ctx();
        let config = Config { ticket_prefix: "MT".into(), ..Config::default() };
        run_ticket(&ctx, &config, false).unwrap();

        let gen = super::super::ticket_generator(&ctx, &config);
        let last = gen.last_issued(TICKET_CATEGORY, &PeriodKey::new("2501").unwrap()).unwrap();
        assert_eq!(last.unwrap().formatted_code, "MT-2501-0001");
    }

    #[test]
    fn invalid_category_reports_generic_message() {
        let ctx = ctx();
        let err = run_asset(&ctx, &Config::default(), "not valid", false).unwrap_err();
        assert!(err.starts_with("invalid request"));
    }
}
