use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::Args;
use crate::notify::Notifier;
use crate::rate_limit::{Admission, FixedWindowLimiter};
use crate::render::AssetStore;

// app's shared state

pub struct AppState {
    pub client: reqwest::Client,
    pub maintenance: AtomicBool,
    pub admission: Admission,
    pub assets: Arc<AssetStore>,
    pub notifier: Notifier,
    pub fetch_timeout: Duration, // profile photo download limit
}

impl AppState {
    pub fn from_args(args: &Args) -> Self {
        let client = reqwest::Client::new();

        let admission = Admission::new(
            // one key only
            FixedWindowLimiter::new(
                args.global_rate_limit,
                Duration::from_secs(args.global_rate_window),
                1,
            ),
            FixedWindowLimiter::new(
                args.ip_rate_limit,
                Duration::from_secs(args.ip_rate_window),
                args.rate_limit_capacity,
            ),
        );

        Self {
            notifier: Notifier::new(client.clone(), args.notify_url.clone()),
            client,
            maintenance: AtomicBool::new(args.maintenance),
            admission,
            assets: Arc::new(AssetStore::new(args.assets_dir.clone())),
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
        }
    }

    pub fn in_maintenance(&self) -> bool {
        self.maintenance.load(Ordering::Relaxed)
    }
}
