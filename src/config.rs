use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tracing::trace;

use crate::actors::worker::WorkerSettings;

/// Tuning of a workload run
#[derive(Debug, Clone, serde::Deserialize)]
pub struct WorkloadConfig {
    /// Pause between query attempts and between wait polls, in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Failed queries after which a worker gives up
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,

    /// Capacity of the channel between workers and the aggregator
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Timeout of a single HTTP request against a target
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            max_errors: default_max_errors(),
            channel_capacity: default_channel_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WorkloadConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            tick: self.tick(),
            max_errors: self.max_errors,
        }
    }
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_max_errors() -> u32 {
    10
}

fn default_channel_capacity() -> usize {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Address the HTTP API binds to
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Deployment environment, substituted into the address template
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Target address with `{id}` and `{environment}` placeholders
    #[serde(default = "default_address_template")]
    pub address_template: String,

    /// Database name on every target
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub workload: WorkloadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            environment: default_environment(),
            address_template: default_address_template(),
            database: default_database(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl Config {
    /// Address of the deployment carrying `id`
    pub fn address_for(&self, id: &str) -> String {
        self.address_template
            .replace("{id}", id)
            .replace("{environment}", &self.environment)
    }

    /// Apply `LISTEN_PORT` and `ENVIRONMENT` from the process environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = crate::util::get_listen_port() {
            self.listen.set_port(port);
        }
        if let Some(environment) = crate::util::get_environment() {
            self.environment = environment;
        }
        self
    }

    /// This service puts read and write load on databases, so production is off limits
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.environment.eq_ignore_ascii_case("production") {
            anyhow::bail!("workloads are disabled for production environments");
        }
        if self.workload.tick_ms == 0 {
            anyhow::bail!("tick_ms must be at least 1");
        }
        if self.workload.max_errors == 0 {
            anyhow::bail!("max_errors must be at least 1");
        }
        if self.workload.channel_capacity == 0 {
            anyhow::bail!("channel_capacity must be at least 1");
        }
        Ok(())
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], crate::util::DEFAULT_LISTEN_PORT))
}

fn default_environment() -> String {
    String::from("dev")
}

fn default_address_template() -> String {
    String::from("https://{id}-{environment}.databases.neo4j.io")
}

fn default_database() -> String {
    String::from("neo4j")
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
