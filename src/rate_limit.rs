use axum::http::HeaderMap;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::metrics::{GLOBAL_LIMITED, IP_LIMITED, RATE_WINDOWS};

// Key used by the process-wide limiter
pub const GLOBAL_KEY: &str = "global";

// Rate window - tracks requests per IP/key
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    pub count: u32,
    pub window_start: Instant,
}

/// Fixed-window counter keyed by string.
///
/// The `DashMap` entry guard is held across the read and the increment, so two
/// requests for the same key can never both observe `count < limit` and overshoot.
pub struct FixedWindowLimiter {
    windows: DashMap<String, RateWindow>,
    limit: u32,
    window: Duration,
    capacity: usize,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration, capacity: usize) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
            capacity: capacity.max(1),
        }
    }

    // Callers pass the clock so tests can step through windows without sleeping
    pub fn check_and_record_at(&self, key: &str, now: Instant) -> bool {
        if !self.windows.contains_key(key) && self.windows.len() >= self.capacity {
            self.make_room(now);
        }

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(RateWindow {
                count: 0,
                window_start: now,
            });

        // window expired..? Reset it
        if now.saturating_duration_since(entry.window_start) > self.window {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        // over limit, do not count the rejected request
        if entry.count >= self.limit {
            return false;
        }

        entry.count += 1;
        true
    }

    // Drop expired windows; if the map is still full evict the oldest one.
    fn make_room(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) <= window);

        if self.windows.len() < self.capacity {
            return;
        }

        let oldest = self
            .windows
            .iter()
            .min_by_key(|w| w.window_start)
            .map(|w| w.key().clone());
        if let Some(key) = oldest {
            debug!(key = %key, "Rate window map full, evicting oldest entry");
            self.windows.remove(&key);
        }
    }

    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// The two admission gates, checked in order: global first, then per-IP.
pub struct Admission {
    pub global: FixedWindowLimiter,
    pub per_ip: FixedWindowLimiter,
}

impl Admission {
    pub fn new(global: FixedWindowLimiter, per_ip: FixedWindowLimiter) -> Self {
        Self { global, per_ip }
    }

    pub fn admit(&self, ip: &str) -> Result<(), AppError> {
        self.admit_at(ip, Instant::now())
    }

    pub fn admit_at(&self, ip: &str, now: Instant) -> Result<(), AppError> {
        if !self.global.check_and_record_at(GLOBAL_KEY, now) {
            GLOBAL_LIMITED.inc();
            warn!(
                limit = self.global.limit(),
                window_secs = self.global.window().as_secs(),
                "Global rate limit reached"
            );
            return Err(AppError::GlobalRateLimited);
        }

        let allowed = self.per_ip.check_and_record_at(ip, now);
        RATE_WINDOWS.set(self.per_ip.tracked() as f64);
        if !allowed {
            IP_LIMITED.inc();
            warn!(ip = %ip, limit = self.per_ip.limit(), "IP rate limit reached");
            return Err(AppError::IpRateLimited);
        }

        Ok(())
    }
}

/// Caller address: first `x-forwarded-for` entry, else the socket peer, else "".
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => String::new(),
    }
}
