//! `check-config`: validate everything `run` needs without connecting.

use std::path::Path;

use shc_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(config: &Config, path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let shown = path.display().to_string();
    let exporter = config
        .to_exporter_config()
        .map_err(|e| CliError::config(shown.clone(), e))?;

    for (key, file) in [
        ("hub.client_cert", &exporter.hub.client_cert),
        ("hub.client_key", &exporter.hub.client_key),
    ] {
        if !file.is_file() {
            return Err(CliError::Setup {
                message: format!("{key} not found: {}", file.display()),
            });
        }
    }

    let rendered = shc_config::render_redacted(config).map_err(|e| CliError::config(shown.clone(), e))?;
    output::print_output(&format!("# {shown}\n{rendered}"), global.quiet);
    if !global.quiet {
        eprintln!("Configuration OK");
    }
    Ok(())
}
