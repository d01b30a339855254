use serde_json::json;

use crate::cli::utils::{output_success, store_from_env};
use crate::cli::OutputFormat;
use crate::config::StoreBackend;
use crate::services::{AuthService, NewAdmin};

pub async fn handle(
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (config, store) = store_from_env().await?;
    if config.store.backend == StoreBackend::Memory {
        tracing::warn!("Memory store selected; the admin disappears when this command exits");
    }

    let identity = AuthService::new(store)
        .create_admin(NewAdmin {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;

    output_success(
        &output_format,
        &format!("Admin '{}' created", identity.email),
        Some(json!({ "id": identity.id, "email": identity.email })),
    )
}
