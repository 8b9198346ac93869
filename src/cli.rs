//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// BOSS ingest command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the service should listen
    #[arg(long, default_value = "0.0.0.0", env = "BOSS_INGEST_HOST")]
    pub host: String,
    /// The port to which the service should bind
    #[arg(long, default_value_t = 8080, env = "BOSS_INGEST_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "BOSS_INGEST_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/boss-ingest/certs/cert.pem",
        env = "BOSS_INGEST_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/boss-ingest/certs/key.pem",
        env = "BOSS_INGEST_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for enumerations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "BOSS_INGEST_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "BOSS_INGEST_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// Whether to use Rayon for enumeration rather than Tokio's blocking thread pool.
    #[arg(long, default_value_t = false, env = "BOSS_INGEST_USE_RAYON")]
    pub use_rayon: bool,
    /// Maximum number of enumerations to run at once. Defaults to one less than the number of
    /// CPUs.
    #[arg(long, env = "BOSS_INGEST_THREAD_LIMIT")]
    pub thread_limit: Option<usize>,
    /// Window size used when a job does not set MAX_NUM_ITEMS_PER_LAMBDA, and the largest
    /// window one request may enumerate.
    #[arg(long, default_value_t = 500000, env = "BOSS_INGEST_MAX_ITEMS_PER_WORKER")]
    pub max_items_per_worker: u64,
    /// Maximum number of windows in a plan.
    #[arg(long, default_value_t = 10000, env = "BOSS_INGEST_MAX_WINDOWS")]
    pub max_windows: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
