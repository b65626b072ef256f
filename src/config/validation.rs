use super::Config;
use crate::error::AppError;
use std::path::Path;

fn validate_domain(label: &str, domain: &str) -> Result<(), AppError> {
    if domain.trim().is_empty() {
        return Err(AppError::config_error(format!("{label} cannot be empty")));
    }

    if !domain.starts_with("http://") && !domain.starts_with("https://") {
        // Without a scheme it should at least look like a host name
        if !domain.contains('.') && !domain.starts_with("localhost") {
            return Err(AppError::config_error(format!(
                "{label} must be a valid URL or domain name"
            )));
        }
    }

    Ok(())
}

/// Validates the configuration settings
///
/// # Validation Rules
/// - Provider domains cannot be empty and must look like a URL or domain name
/// - Timeouts must be greater than zero
/// - If log file path is provided, it cannot be empty
/// - Log file path parent directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    validate_domain("Stats API domain", &config.stats_api_domain)?;
    validate_domain("Injury report domain", &config.injury_report_domain)?;
    validate_domain("Analysis base URL", &config.llm_base_url)?;

    if config.http_timeout_seconds == 0 || config.injury_timeout_seconds == 0 {
        return Err(AppError::config_error("Timeouts must be greater than zero"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
