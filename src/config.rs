use clap::Parser;
use std::path::PathBuf;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "caption-card")]
#[command(about = "Renders captions and certificate cards onto template images")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Directory holding fonts/ and image/
    #[arg(short, long, env = "ASSETS_DIR", default_value = "media")]
    pub assets_dir: PathBuf,

    // Reject every request with 503
    #[arg(long, env = "MAINTENANCE", default_value_t = false)]
    pub maintenance: bool,

    // Per-IP max requests per window
    #[arg(long, env = "IP_RATE_LIMIT", default_value_t = 6)]
    pub ip_rate_limit: u32,

    // Per-IP window in seconds
    #[arg(long, env = "IP_RATE_WINDOW", default_value_t = 60)]
    pub ip_rate_window: u64,

    // Process-wide max requests per window
    #[arg(long, env = "GLOBAL_RATE_LIMIT", default_value_t = 20)]
    pub global_rate_limit: u32,

    // Process-wide window in seconds
    #[arg(long, env = "GLOBAL_RATE_WINDOW", default_value_t = 120)]
    pub global_rate_window: u64,

    // Max per-IP windows kept in memory
    #[arg(long, env = "RATE_LIMIT_CAPACITY", default_value_t = 10_000)]
    pub rate_limit_capacity: usize,

    // Where to POST request notifications; disabled when unset
    // Example: "https://example.com/send-email"
    #[arg(long, env = "NOTIFY_URL")]
    pub notify_url: Option<String>,

    // Profile photo download timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT", default_value_t = 10)]
    pub fetch_timeout: u64,
}
