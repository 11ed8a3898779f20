use crate::presentation::config::Environment;

/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: Environment,
    pub json_format: bool,
}

impl TracingConfig {
    /// JSON logs in prod, human-readable otherwise; `LOG_FORMAT=json`
    /// overrides either way.
    pub fn for_environment(environment: Environment) -> Self {
        let json_format = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(environment == Environment::Prod);
        Self {
            environment,
            json_format,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Local)
    }
}
