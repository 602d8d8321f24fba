//! Configuration and dependency initialization for the object indexer.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use object_indexer_repository::{OAuthCredentials, SearchClientConfig};

use crate::consumer::AmqpConfig;
use crate::IndexingError;

const DEFAULT_QUEUE_HOST: &str = "localhost";
const DEFAULT_QUEUE_PORT: u16 = 5672;
const DEFAULT_QUEUE_CREDENTIAL: &str = "guest";
const DEFAULT_QUEUE_VHOST: &str = "/";
const DEFAULT_SEARCHENGINE_TIMEOUT_SECS: u64 = 30;

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Queue connection and consumption settings.
    pub queue: AmqpConfig,
    /// Search engine client settings.
    pub search_client: SearchClientConfig,
    /// Base URL documents are addressed under.
    pub searchengine_url: String,
}

impl IndexerConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QUEUE_URL`: Broker host (default: localhost)
    /// - `QUEUE_PORT`: Broker port (default: 5672)
    /// - `QUEUE_USERNAME` / `QUEUE_PASSWORD`: Broker login (default: guest)
    /// - `QUEUE_VHOST`: Virtual host (default: /)
    /// - `QUEUE_NAME`: Queue to consume (required)
    /// - `QUEUE_PREFETCH_COUNT`: Unacknowledged delivery limit, 0 for none (default: 0)
    /// - `CLIENT_ID`, `CLIENT_SECRET`, `ENDPOINT`: OAuth client credentials, all or none
    /// - `SEARCHENGINE_URL`: Base URL of the search index (required)
    /// - `SEARCHENGINE_TIMEOUT_SECS`: Request timeout (default: 30)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let queue = AmqpConfig {
            host: var("QUEUE_URL").unwrap_or_else(|| DEFAULT_QUEUE_HOST.to_string()),
            port: parse_or(&var, "QUEUE_PORT", DEFAULT_QUEUE_PORT)?,
            username: var("QUEUE_USERNAME")
                .unwrap_or_else(|| DEFAULT_QUEUE_CREDENTIAL.to_string()),
            password: var("QUEUE_PASSWORD")
                .unwrap_or_else(|| DEFAULT_QUEUE_CREDENTIAL.to_string()),
            vhost: var("QUEUE_VHOST").unwrap_or_else(|| DEFAULT_QUEUE_VHOST.to_string()),
            queue_name: required(&var, "QUEUE_NAME")?,
            prefetch_count: parse_or(&var, "QUEUE_PREFETCH_COUNT", 0)?,
        };

        let oauth = match (var("CLIENT_ID"), var("CLIENT_SECRET"), var("ENDPOINT")) {
            (Some(client_id), Some(client_secret), Some(endpoint)) => {
                Some(OAuthCredentials::new(endpoint, client_id, client_secret))
            }
            (None, None, None) => None,
            _ => {
                return Err(IndexingError::config(
                    "CLIENT_ID, CLIENT_SECRET and ENDPOINT must be set together",
                ))
            }
        };

        let timeout_secs = parse_or(
            &var,
            "SEARCHENGINE_TIMEOUT_SECS",
            DEFAULT_SEARCHENGINE_TIMEOUT_SECS,
        )?;

        let search_client = SearchClientConfig {
            timeout: Duration::from_secs(timeout_secs),
            oauth,
        };

        Ok(Self {
            queue,
            search_client,
            searchengine_url: required(&var, "SEARCHENGINE_URL")?,
        })
    }
}

fn required<F>(var: &F, key: &str) -> Result<String, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    var(key).ok_or_else(|| IndexingError::config(format!("{} must be set", key)))
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T, IndexingError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(value) => value
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {} '{}': {}", key, value, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("QUEUE_NAME", "swift_events"),
        ("SEARCHENGINE_URL", "http://search.local:9200/objects/object"),
    ];

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::from_lookup(lookup(MINIMAL)).unwrap();

        assert_eq!(config.queue.host, "localhost");
        assert_eq!(config.queue.port, 5672);
        assert_eq!(config.queue.username, "guest");
        assert_eq!(config.queue.password, "guest");
        assert_eq!(config.queue.vhost, "/");
        assert_eq!(config.queue.queue_name, "swift_events");
        assert_eq!(config.queue.prefetch_count, 0);
        assert_eq!(config.search_client.timeout, Duration::from_secs(30));
        assert!(config.search_client.oauth.is_none());
        assert_eq!(
            config.searchengine_url,
            "http://search.local:9200/objects/object"
        );
    }

    #[test]
    fn test_full_configuration() {
        let mut vars = MINIMAL.to_vec();
        vars.extend_from_slice(&[
            ("QUEUE_URL", "rabbit.internal"),
            ("QUEUE_PORT", "5673"),
            ("QUEUE_USERNAME", "indexer"),
            ("QUEUE_PASSWORD", "hunter2"),
            ("QUEUE_VHOST", "storage"),
            ("QUEUE_PREFETCH_COUNT", "16"),
            ("CLIENT_ID", "indexer"),
            ("CLIENT_SECRET", "s3cret"),
            ("ENDPOINT", "https://auth.local/token"),
            ("SEARCHENGINE_TIMEOUT_SECS", "5"),
        ]);

        let config = IndexerConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.queue.host, "rabbit.internal");
        assert_eq!(config.queue.port, 5673);
        assert_eq!(config.queue.vhost, "storage");
        assert_eq!(config.queue.prefetch_count, 16);
        assert_eq!(config.search_client.timeout, Duration::from_secs(5));

        let oauth = config.search_client.oauth.unwrap();
        assert_eq!(oauth.client_id, "indexer");
        assert_eq!(oauth.client_secret, "s3cret");
        assert_eq!(oauth.token_endpoint, "https://auth.local/token");
    }

    #[test]
    fn test_missing_queue_name() {
        let result = IndexerConfig::from_lookup(lookup(&[(
            "SEARCHENGINE_URL",
            "http://search.local:9200",
        )]));

        assert!(matches!(result, Err(IndexingError::ConfigError(msg)) if msg.contains("QUEUE_NAME")));
    }

    #[test]
    fn test_missing_searchengine_url() {
        let result = IndexerConfig::from_lookup(lookup(&[("QUEUE_NAME", "q")]));

        assert!(
            matches!(result, Err(IndexingError::ConfigError(msg)) if msg.contains("SEARCHENGINE_URL"))
        );
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("QUEUE_PORT", "amqp"));

        let result = IndexerConfig::from_lookup(lookup(&vars));

        assert!(matches!(result, Err(IndexingError::ConfigError(msg)) if msg.contains("QUEUE_PORT")));
    }

    #[test]
    fn test_partial_oauth_is_rejected() {
        let mut vars = MINIMAL.to_vec();
        vars.extend_from_slice(&[("CLIENT_ID", "indexer"), ("CLIENT_SECRET", "s3cret")]);

        let result = IndexerConfig::from_lookup(lookup(&vars));

        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let mut vars = MINIMAL.to_vec();
        vars.extend_from_slice(&[("QUEUE_PORT", ""), ("CLIENT_ID", "")]);

        let config = IndexerConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.queue.port, 5672);
        assert!(config.search_client.oauth.is_none());
    }
}
