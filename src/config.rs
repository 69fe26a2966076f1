use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, str::FromStr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub email: EmailConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Mailbox that receives the notifications. Falls back to `username`.
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Minimum interval between two requests of the same client
    #[serde(default = "default_window_secs")]
    pub rate_limit_window_secs: u64,
    /// Idle time after which a client's rate limit entry is forgotten
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Key clients by the first `X-Forwarded-For` entry instead of the peer address
    #[serde(default)]
    pub trust_forwarded_for: bool,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

const fn default_window_secs() -> u64 {
    60
}

const fn default_session_ttl_secs() -> u64 {
    1440
}

const fn default_cleanup_interval_secs() -> u64 {
    60
}

const fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit_window_secs: default_window_secs(),
            session_ttl_secs: default_session_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            trust_forwarded_for: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl EmailConfig {
    pub fn recipient(&self) -> &str {
        self.recipient.as_deref().unwrap_or(&self.username)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Required `EMAIL_*` variables. Setting any of them selects environment config.
const REQUIRED_VARS: [&str; 4] = ["EMAIL_HOST", "EMAIL_PORT", "EMAIL_USER", "EMAIL_PASS"];

fn required_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, String> {
    lookup(name).ok_or_else(|| format!("{name} environment variable is required"))
}

fn optional_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("Failed to parse {name}: {e}")),
        None => Ok(default),
    }
}

fn load_from_env(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let email = EmailConfig {
        host: required_var(lookup, "EMAIL_HOST")?,
        port: required_var(lookup, "EMAIL_PORT")?
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse EMAIL_PORT: {e}"))?,
        username: required_var(lookup, "EMAIL_USER")?,
        password: required_var(lookup, "EMAIL_PASS")?,
        recipient: lookup("EMAIL_TO").filter(|s| !s.trim().is_empty()),
        timeout_secs: optional_var(lookup, "EMAIL_TIMEOUT_SECS", default_timeout_secs())?,
    };

    let server = ServerConfig {
        bind_addr: lookup("BIND_ADDR").unwrap_or_else(default_bind_addr),
        rate_limit_window_secs: optional_var(
            lookup,
            "RATE_LIMIT_WINDOW_SECS",
            default_window_secs(),
        )?,
        session_ttl_secs: optional_var(lookup, "SESSION_TTL_SECS", default_session_ttl_secs())?,
        cleanup_interval_secs: optional_var(
            lookup,
            "CLEANUP_INTERVAL_SECS",
            default_cleanup_interval_secs(),
        )?,
        trust_forwarded_for: optional_var(lookup, "TRUST_FORWARDED_FOR", false)?,
        max_body_bytes: optional_var(lookup, "MAX_BODY_BYTES", default_max_body_bytes())?,
    };

    Ok(Config { email, server })
}

fn load_from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Pick up a .env file without overriding the real environment
    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!("Loaded environment overrides from {}", path.display());
    }

    load_config_from(|name| env::var(name).ok())
}

/// Resolution order: the configured file, `config.yaml`, the `EMAIL_*`
/// variables, and `config.example.yaml` only when none of those exist.
pub fn load_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        lookup("CONTACT_MAILER_CONFIG").unwrap_or_else(|| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Environment variables, reported as-is once any of them is set
    if REQUIRED_VARS.iter().any(|name| lookup(name).is_some()) {
        tracing::info!("No config file found, loading configuration from environment variables");
        return load_from_env(&lookup)
            .inspect(|_| {
                tracing::info!("Successfully loaded configuration from environment variables");
            })
            .map_err(|e| format!("Environment configuration is incomplete: {e}").into());
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}', 'config.yaml' and EMAIL_* variables not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    Err(format!(
        "No configuration found. Tried: '{config_path}', 'config.yaml', \
         environment variables ({}) and 'config.example.yaml'",
        REQUIRED_VARS.join(", ")
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn yaml_fills_server_defaults() {
        let yaml = r"
email:
  host: smtp.example.com
  port: 587
  username: forms@example.com
  password: hunter2
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.email.recipient(), "forms@example.com");
        assert_eq!(config.email.timeout(), Duration::from_secs(30));
        assert_eq!(config.server.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.server.window(), Duration::from_secs(60));
        assert_eq!(config.server.session_ttl(), Duration::from_secs(1440));
        assert!(!config.server.trust_forwarded_for);
    }

    #[test]
    fn explicit_recipient_wins_over_username() {
        let yaml = r"
email:
  host: smtp.example.com
  port: 465
  username: relay-user
  password: secret
  recipient: inbox@example.com
  timeout_secs: 5
server:
  rate_limit_window_secs: 10
  trust_forwarded_for: true
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.email.recipient(), "inbox@example.com");
        assert_eq!(config.email.timeout(), Duration::from_secs(5));
        assert_eq!(config.server.window(), Duration::from_secs(10));
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
        assert!(config.server.trust_forwarded_for);
    }

    #[test]
    fn missing_email_section_is_rejected() {
        let yaml = "server:\n  bind_addr: 127.0.0.1:9000\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn relay_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("EMAIL_HOST", "relay.real.test"),
            ("EMAIL_PORT", "2525"),
            ("EMAIL_USER", "u@real.test"),
            ("EMAIL_PASS", "p"),
        ]
    }

    #[test]
    fn environment_wins_over_example_file() {
        // Run from the package root, where config.example.yaml exists
        assert!(Path::new("config.example.yaml").exists());

        let config = load_config_from(vars(&relay_vars())).unwrap();

        assert_eq!(config.email.host, "relay.real.test");
        assert_eq!(config.email.port, 2525);
        assert_eq!(config.email.username, "u@real.test");
        assert_eq!(config.email.password, "p");
        assert_eq!(config.email.recipient(), "u@real.test");
        assert_eq!(config.server.window(), Duration::from_secs(60));
    }

    #[test]
    fn example_file_is_the_last_resort() {
        let config = load_config_from(vars(&[])).unwrap();
        assert_eq!(config.email.host, "smtp.example.com");
    }

    #[test]
    fn environment_reads_optional_settings() {
        let mut pairs = relay_vars();
        pairs.extend([
            ("EMAIL_TO", "inbox@real.test"),
            ("RATE_LIMIT_WINDOW_SECS", "15"),
            ("TRUST_FORWARDED_FOR", "true"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ]);

        let config = load_from_env(&vars(&pairs)).unwrap();

        assert_eq!(config.email.recipient(), "inbox@real.test");
        assert_eq!(config.server.window(), Duration::from_secs(15));
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert!(config.server.trust_forwarded_for);
    }

    #[test]
    fn missing_variable_is_named() {
        let pairs: Vec<_> = relay_vars()
            .into_iter()
            .filter(|(name, _)| *name != "EMAIL_HOST")
            .collect();

        let err = load_from_env(&vars(&pairs)).unwrap_err();
        assert!(err.to_string().contains("EMAIL_HOST environment variable is required"));

        // A partial environment is reported, not papered over by the example file
        let err = load_config_from(vars(&pairs)).unwrap_err();
        assert!(err.to_string().contains("EMAIL_HOST environment variable is required"));
    }

    #[test]
    fn unparsable_port_is_reported() {
        let mut pairs = relay_vars();
        pairs[1] = ("EMAIL_PORT", "smtp");

        let err = load_from_env(&vars(&pairs)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse EMAIL_PORT"));
    }
}
