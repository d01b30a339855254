use serde_json::json;

use crate::cli::utils::{output_empty_collection, store_from_env};
use crate::cli::OutputFormat;
use crate::database::models::DirectoryEntry;
use crate::services::LawyerService;

pub async fn handle(query: Option<String>, all: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let (_, store) = store_from_env().await?;

    // (entry, enabled) pairs; the directory search only ever returns enabled rows
    let rows: Vec<(DirectoryEntry, bool)> = if all {
        store
            .list_lawyers()
            .await?
            .into_iter()
            .map(|l| {
                let enabled = l.enabled;
                (DirectoryEntry::from(l), enabled)
            })
            .collect()
    } else {
        LawyerService::new(store)
            .search(query.as_deref())
            .await?
            .into_iter()
            .map(|entry| (entry, true))
            .collect()
    };

    if rows.is_empty() {
        return output_empty_collection(&output_format, "lawyers", "No lawyers found");
    }

    match output_format {
        OutputFormat::Json => {
            let lawyers: Vec<_> = rows
                .iter()
                .map(|(entry, enabled)| {
                    json!({
                        "id": entry.id,
                        "full_name": entry.full_name,
                        "commune": entry.commune,
                        "specialty": entry.specialty,
                        "email": entry.email,
                        "phone": entry.phone,
                        "enabled": enabled
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "lawyers": lawyers }))?);
        }
        OutputFormat::Text => {
            println!("{:<30} {:<18} {:<25} {:<30} {}", "NAME", "COMMUNE", "SPECIALTY", "EMAIL", "ENABLED");
            println!("{}", "-".repeat(112));

            for (entry, enabled) in &rows {
                println!(
                    "{:<30} {:<18} {:<25} {:<30} {}",
                    entry.full_name,
                    entry.commune,
                    entry.specialty,
                    entry.email,
                    if *enabled { "yes" } else { "no" }
                );
            }
        }
    }

    Ok(())
}
