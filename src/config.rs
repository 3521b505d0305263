use clap::Parser;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "mp3-gateway")]
#[command(about = "Rate-limited gateway in front of a YouTube to MP3 conversion API")]
pub struct Args {
    // Address to bind the server on
    #[arg(long, env = "GATEWAY_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    // Port to run the server on
    #[arg(short, long, env = "GATEWAY_PORT", default_value_t = 3000)]
    pub port: u16,

    // Upstream API keys (comma-separated), rotated round-robin
    #[arg(long, env = "API_KEYS", hide_env_values = true)]
    pub api_keys: String,

    // Conversion service base url, requests go to {base}/dl?id=...
    #[arg(long, env = "UPSTREAM_URL", default_value = "https://youtube-mp36.p.rapidapi.com")]
    pub upstream_url: String,

    // Value of the x-rapidapi-host header, defaults to the host of upstream_url
    #[arg(long, env = "UPSTREAM_HOST")]
    pub upstream_host: Option<String>,

    // Per-attempt upstream timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT", default_value_t = 15)]
    pub upstream_timeout: u64,

    // Total upstream attempts per download request
    #[arg(long, env = "MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    // Base backoff between attempts in ms (doubles each time, 0 = immediate)
    #[arg(long, env = "RETRY_BACKOFF_MS", default_value_t = 100)]
    pub retry_backoff_ms: u64,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // How often idle rate limit entries are swept, in seconds
    #[arg(long, env = "SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,

    // Skip keys after this many consecutive failures (unset = blind round-robin)
    #[arg(long, env = "SKIP_FAILING_AFTER")]
    pub skip_failing_after: Option<u32>,

    // Audit log file served on /logger
    #[arg(long, env = "LOG_FILE", default_value = "./server.log")]
    pub log_file: String,

    // Expose prometheus metrics on /metrics
    #[arg(long, env = "GATEWAY_METRICS", default_value_t = false)]
    pub metrics: bool,
}

impl Args {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    // tokio intervals cannot tick every 0s
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }
}
