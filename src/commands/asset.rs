//! `seqcode asset` command.

use crate::cli::AssetAction;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::registry::NewAsset;

/// Execute an `asset` action.
///
/// # Errors
///
/// Returns an error string if the asset cannot be registered or listed.
pub fn run(ctx: &ServiceContext, config: &Config, action: &AssetAction) -> Result<(), String> {
    let store = super::record_store(ctx, config);
    match action {
        AssetAction::Add { asset_type, name, submission } => {
            let asset = store
                .create_asset(NewAsset {
                    asset_type: asset_type.clone(),
                    name: name.clone(),
                    submission_key: submission.clone(),
                })
                .map_err(|e| e.to_string())?;
            println!("{}", asset.code);
        }
        AssetAction::List => {
            let assets = store.list_assets().map_err(|e| e.to_string())?;
            if assets.is_empty() {
                println!("No assets found in store.");
                return Ok(());
            }
            let code_width = assets.iter().map(|a| a.code.len()).max().unwrap_or(4).max(4);
            let type_width = assets.iter().map(|a| a.asset_type.len()).max().unwrap_or(4).max(4);
            println!("{:<code_width$}  {:<type_width$}  NAME", "CODE", "TYPE");
            for a in &assets {
                println!("{:<code_width$}  {:<type_width$}  {}", a.code, a.asset_type, a.name);
            }
            println!("\n{} asset(s) total.", assets.len());
        }
    }
    Ok(())
}
