//! `seqcode show` and `seqcode list` commands.

use crate::code::PeriodKey;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::ports::SequenceRecord;

/// Execute the `show` command.
///
/// Prints the last code issued for `category` in `period` (default: the
/// current month).
///
/// # Errors
///
/// Returns an error string if the category or period is invalid or the
/// store cannot be read.
pub fn run(
    ctx: &ServiceContext,
    config: &Config,
    category: &str,
    period: Option<&str>,
) -> Result<(), String> {
    let gen = super::asset_generator(ctx, config);
    let period = match period {
        Some(p) => PeriodKey::new(p).map_err(|e| e.to_string())?,
        None => gen.current_period(),
    };

    match gen.last_issued(category, &period).map_err(|e| e.to_string())? {
        Some(record) => {
            println!("Category: {}", record.category);
            println!("Period:   {}", record.period);
            println!("Last:     {}", record.last_sequence);
            println!("Code:     {}", record.formatted_code);
        }
        None => println!("No codes issued for {category} in {period}."),
    }
    Ok(())
}

/// Execute the `list` command.
///
/// Displays a table of all counters with category, period, last sequence
/// and last code.
///
/// # Errors
///
/// Returns an error string if the store cannot be read.
pub fn run_list(
    ctx: &ServiceContext,
    config: &Config,
    category: Option<&str>,
) -> Result<(), String> {
    let records = super::asset_generator(ctx, config).records(category).map_err(|e| e.to_string())?;
    if records.is_empty() {
        println!("No sequences found in store.");
        return Ok(());
    }
    print_table(&records);
    println!("\n{} sequence(s) total.", records.len());
    Ok(())
}

fn print_table(records: &[SequenceRecord]) {
    let cat_width = records.iter().map(|r| r.category.len()).max().unwrap_or(8).max(8);
    let period_width = records.iter().map(|r| r.period.as_str().len()).max().unwrap_or(6).max(6);
    let last_width =
        records.iter().map(|r| r.last_sequence.to_string().len()).max().unwrap_or(4).max(4);

    println!(
        "{:<cat_width$}  {:<period_width$}  {:>last_width$}  CODE",
        "CATEGORY", "PERIOD", "LAST",
    );
    println!("{:-<cat_width$}  {:-<period_width$}  {:->last_width$}  ----", "", "", "");
    for r in records {
        println!(
            "{:<cat_width$}  {:<period_width$}  {:>last_width$}  {}",
            r.category,
            r.period.as_str(),
            r.last_sequence,
            r.formatted_code,
        );
    }
}
