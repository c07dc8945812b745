//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use restq_core::DEFAULT_PAGE_SIZE;
use restq_proto::ParseOptions;

/// restq HTTP gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "restq-gateway")]
#[command(about = "HTTP/REST gateway for restq entities")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Reject unknown filter operators instead of treating them as `$eq`.
    #[arg(long)]
    pub strict_operators: bool,

    /// Maximum number of cached query responses.
    #[arg(long, default_value_t = 1024)]
    pub cache_capacity: usize,

    /// Lifetime (ms) of a cached query response.
    #[arg(long, default_value_t = 30_000)]
    pub cache_ttl_ms: u64,

    /// Page size used when a paginated request has no `limit`.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub default_page_size: u32,

    /// JSON file of demo asset records. Built-in samples are used when unset.
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Reject unknown filter operators.
    pub strict_operators: bool,
    /// Maximum number of cached query responses.
    pub cache_capacity: usize,
    /// Lifetime of a cached query response.
    pub cache_ttl: Duration,
    /// Page size used when a paginated request has no `limit`.
    pub default_page_size: u32,
    /// Seed file for the demo entity.
    pub seed_path: Option<PathBuf>,
}

impl GatewayConfig {
    /// Rule parser options derived from this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict_operators: self.strict_operators,
        }
    }
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: args.listen.clone(),
            strict_operators: args.strict_operators,
            cache_capacity: args.cache_capacity,
            cache_ttl: Duration::from_millis(args.cache_ttl_ms),
            default_page_size: args.default_page_size.max(1),
            seed_path: args.seed.clone(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            strict_operators: false,
            cache_capacity: 1024,
            cache_ttl: Duration::from_secs(30),
            default_page_size: DEFAULT_PAGE_SIZE,
            seed_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_config() {
        let args = Args::parse_from([
            "restq-gateway",
            "--listen",
            "127.0.0.1:9999",
            "--strict-operators",
            "--cache-ttl-ms",
            "500",
            "--default-page-size",
            "0",
        ]);
        let config = GatewayConfig::from(&args);
        assert_eq!(config.listen_addr, "127.0.0.1:9999");
        assert!(config.parse_options().strict_operators);
        assert_eq!(config.cache_ttl, Duration::from_millis(500));
        assert_eq!(config.default_page_size, 1);
        assert_eq!(config.cache_capacity, 1024);
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn test_defaults_match() {
        let from_args = GatewayConfig::from(&Args::parse_from(["restq-gateway"]));
        let default = GatewayConfig::default();
        assert_eq!(from_args.listen_addr, default.listen_addr);
        assert_eq!(from_args.cache_ttl, default.cache_ttl);
        assert_eq!(from_args.default_page_size, default.default_page_size);
    }
}
