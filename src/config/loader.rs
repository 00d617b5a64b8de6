//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AegisConfig;
use crate::config::secret_string;
use crate::domain::errors::AegisError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AegisConfig
/// 4. Applies environment variable overrides (AEGIS_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use aegis::config::loader::load_config;
///
/// let config = load_config("aegis.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AegisConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AegisError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AegisError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AegisConfig = toml::from_str(&contents)
        .map_err(|e| AegisError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        AegisError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

impl AegisConfig {
    /// Convenience wrapper around [`load_config`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<AegisConfig> {
        load_config(path)
    }
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Credential values referenced this way live only in the execution
/// environment; the file on disk carries the reference, never the value.
///
/// # Errors
///
/// Returns an error naming every referenced environment variable that is
/// not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("substitution pattern is valid");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AegisError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using AEGIS_* prefix
///
/// Environment variables follow the pattern: AEGIS_<SECTION>_<KEY>
/// For example: AEGIS_GATEWAY_BASE_URL, AEGIS_BACKUP_MAX_RETRIES
fn apply_env_overrides(config: &mut AegisConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("AEGIS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("AEGIS_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Gateway overrides
    if let Ok(val) = std::env::var("AEGIS_GATEWAY_BASE_URL") {
        config.gateway.base_url = val;
    }
    if let Ok(val) = std::env::var("AEGIS_GATEWAY_CALLING_AET") {
        config.gateway.calling_aet = val;
    }
    if let Ok(val) = std::env::var("AEGIS_GATEWAY_AUTH_TYPE") {
        config.gateway.auth_type = val;
    }
    if let Ok(val) = std::env::var("AEGIS_GATEWAY_USERNAME") {
        config.gateway.username = Some(val);
    }
    if let Ok(val) = std::env::var("AEGIS_GATEWAY_PASSWORD") {
        config.gateway.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("AEGIS_GATEWAY_TLS_VERIFY") {
        config.gateway.tls_verify = val.parse().unwrap_or(true);
    }

    // Backup overrides
    if let Ok(val) = std::env::var("AEGIS_BACKUP_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.backup.max_retries = retries;
        }
    }
    if let Ok(val) = std::env::var("AEGIS_BACKUP_ATTEMPT_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.backup.attempt_timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("AEGIS_BACKUP_PARALLEL_RECORDS") {
        if let Ok(parallel) = val.parse() {
            config.backup.parallel_records = parallel;
        }
    }
    if let Ok(val) = std::env::var("AEGIS_BACKUP_SESSIONS_PER_PAIR") {
        if let Ok(sessions) = val.parse() {
            config.backup.sessions_per_pair = sessions;
        }
    }

    // Verification overrides
    if let Ok(val) = std::env::var("AEGIS_VERIFICATION_ENABLE_VERIFICATION") {
        config.verification.enable_verification = val.parse().unwrap_or(true);
    }

    // Ledger overrides
    if let Ok(val) = std::env::var("AEGIS_LEDGER_PATH") {
        config.ledger.path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_TOML: &str = r#"
[application]
log_level = "info"

[gateway]
base_url = "https://gateway.example.org:8443"
username = "aegis_svc"
password = "gw-pass"

[peers.ARIA]
aet = "ARIA_QR"
host = "aria.example.org"
port = 104

[peers.ARCHIVE]
aet = "ARCHIVE_SCP"
host = "archive.example.org"
port = 4242

[sources.aria]
kind = "network"
peer = "ARIA"

[environments.MAIN_CAMPUS]
source = "aria"
archive = "ARCHIVE"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("AEGIS_TEST_SUBST_VAR", "test_value");
        let input = "password = \"${AEGIS_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("AEGIS_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("AEGIS_TEST_MISSING_VAR");
        let input = "password = \"${AEGIS_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("AEGIS_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("AEGIS_TEST_COMMENTED_VAR");
        let input = "# password = \"${AEGIS_TEST_COMMENTED_VAR}\"\nport = 104";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${AEGIS_TEST_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_TOML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.gateway.base_url, "https://gateway.example.org:8443");
        assert_eq!(config.peers.len(), 2);
        assert!(config.environment("MAIN_CAMPUS").is_some());
    }

    #[test]
    fn test_load_config_rejects_unknown_reference() {
        let broken = VALID_TOML.replace("archive = \"ARCHIVE\"", "archive = \"MISSING\"");

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(broken.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_applied() {
        std::env::set_var("AEGIS_BACKUP_MAX_RETRIES", "5");

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_TOML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.backup.max_retries, 5);

        std::env::remove_var("AEGIS_BACKUP_MAX_RETRIES");
    }
}
