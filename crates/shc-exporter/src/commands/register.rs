//! `register`: make sure the hub trusts our client certificate.

use std::path::Path;

use tracing::info;

use shc_api::Registration;
use shc_config::Config;
use shc_core::{HubConfig, Pipeline, RefreshConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(config: &Config, path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let hub = super::hub_config(config, path)?;
    let pipeline = Pipeline::connect(&hub, &RefreshConfig::default())?;

    let message = match ensure(&pipeline, &hub).await? {
        Registration::AlreadyRegistered => {
            format!("Client '{}' is already registered", hub.client_id)
        }
        Registration::Registered => format!("Client '{}' registered", hub.client_id),
    };
    output::print_output(&message, global.quiet);
    Ok(())
}

/// Register unless already known. Used at startup by `run` as well.
pub async fn ensure(pipeline: &Pipeline, hub: &HubConfig) -> Result<Registration, CliError> {
    let outcome = pipeline.register(hub).await?;
    match outcome {
        Registration::AlreadyRegistered => {
            info!(client_id = %hub.client_id, "client already registered");
        }
        Registration::Registered => {
            info!(client_id = %hub.client_id, client_name = %hub.client_name, "client registered");
        }
    }
    Ok(outcome)
}
