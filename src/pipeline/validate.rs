// src/pipeline/validate.rs

use std::path::Path;

use crate::clients::IndexNowEngine;
use crate::error::Result;
use crate::models::Config;

/// Validate configuration and report the effective settings.
pub fn run_validate(config: &Config, config_path: &Path) -> Result<()> {
    log::info!("Validating {}", config_path.display());

    let checked = config.validate().and_then(|_| {
        config
            .indexnow
            .engine
            .parse::<IndexNowEngine>()
            .map(|engine| engine.endpoint())
    });

    match checked {
        Ok(indexnow_endpoint) => {
            log::info!("Config OK");
            log::info!("  user agent: {}", config.http.user_agent);
            log::info!("  timeout: {}s", config.http.timeout_secs);
            log::info!("  precheck: {}", config.precheck.mode);
            log::info!("  google endpoint: {}", config.google.endpoint);
            log::info!("  indexnow endpoint: {}", indexnow_endpoint);
            for (provider, limit) in &config.quotas {
                log::info!("  quota override {}: {}", provider, limit);
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            Err(e)
        }
    }
}
