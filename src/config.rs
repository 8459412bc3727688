// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Startup configuration: backend target, suppression rules, and
//! script MIME prefixes. All values are fixed at process start; a
//! reload requires a restart.

use serde::Deserialize;

/// Stock suppression rules: analytics, tag managers, payment widgets,
/// common CDNs, support widgets, ad tech, error monitoring, fonts, and
/// consent managers. URLs matching any of these are never forwarded.
pub const DEFAULT_SUPPRESS_PATTERNS: &[&str] = &[
    // Analytics & tag managers
    r"google-analytics\.com",
    r"googletagmanager\.com",
    r"googleadservices\.com",
    r"analytics\.google\.com",
    r"stats\.g\.doubleclick\.net",
    r"datadome\.co/captcha/",
    r"cdn\.segment\.com",
    r"clarity\.ms",
    r"hotjar\.com",
    r"hj\.hotjar\.com",
    r"static\.hotjar\.com",
    r"amplitude\.com",
    r"cdn\.amplitude\.com",
    r"matomo\.cloud/",
    r"matomo\.php",
    r"piwik\.php",
    // Payment processors
    r"js\.stripe\.com/v[23]/",
    r"q\.stripe\.com",
    r"paypal\.com/sdk/js",
    r"paypalobjects\.com",
    r"js\.braintreegateway\.com/",
    r"m\.stripe\.network/",
    // Common CDNs
    r"cdn\.jsdelivr\.net/npm/",
    r"cdnjs\.cloudflare\.com/ajax/libs/",
    r"ajax\.googleapis\.com/ajax/libs/",
    r"code\.jquery\.com/jquery-",
    r"maxcdn\.bootstrapcdn\.com/",
    r"unpkg\.com/",
    // Widgets & support platforms
    r"widget\.intercom\.io/",
    r"js\.intercomcdn\.com/",
    r"static\.zdassets\.com/",
    r"static\.intercomassets\.com/",
    r"embed\.tawk\.to/",
    r"js\.driftt\.com/",
    r"js\.hs-scripts\.com/",
    // Ad tech & trackers
    r"connect\.facebook\.net/en_US/fbevents\.js",
    r"platform\.twitter\.com/widgets\.js",
    r"snap\.licdn\.com/li\.lms-analytics",
    r"ads\.linkedin\.com/",
    r"ads-twitter\.com/",
    r"ads\.yahoo\.com/",
    r"doubleclick\.net/",
    // Error monitoring
    r"browser\.sentry-cdn\.com/",
    r"js\.sentry-cdn\.com/",
    r"sentry\.io/api/",
    r"bugsnag\.com/",
    r"cdn\.bugsnag\.com/",
    // Fonts
    r"fonts\.googleapis\.com/",
    r"use\.fontawesome\.com/",
    r"static\.fontawesome\.com/",
    // Consent management
    r"cdn\.cookielaw\.org/",
    r"consent\.cookiebot\.com/",
    r"app\.termly\.io/",
    // Miscellaneous
    r"gstatic\.com/",
    r"recaptcha\.net/",
    r"hcaptcha\.com/",
    r"gtm\.mentimeter\.com/",
];

/// MIME prefixes treated as script content, in match order. Broad
/// entries like `text/plain` and `application/octet-stream` are
/// deliberate: servers routinely mislabel JavaScript.
pub const DEFAULT_SCRIPT_MIME_PREFIXES: &[&str] = &[
    "application/javascript",
    "text/javascript",
    "application/ecmascript",
    "text/ecmascript",
    "application/x-javascript",
    "text/plain",
    "application/octet-stream",
    "application/json",
    "application/node",
    "script",
];

/// Delivery settings for the analysis backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis backend, e.g. http://localhost:3000
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-delivery timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Bounded submission queue depth. When the queue is full the
    /// newly submitted event is dropped and counted.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// Cap on concurrently outstanding deliveries.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_queue_depth() -> usize {
    256
}

fn default_max_in_flight() -> usize {
    8
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            queue_depth: default_queue_depth(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    /// Case-insensitive regexes; a URL matching any of them is ignored
    /// entirely (no events of any kind).
    #[serde(default = "default_suppress")]
    pub suppress: Vec<String>,

    /// Ordered case-insensitive MIME prefixes marking script content;
    /// the first match wins.
    #[serde(default = "default_script_mimes")]
    pub script_mimes: Vec<String>,
}

fn default_suppress() -> Vec<String> {
    DEFAULT_SUPPRESS_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_script_mimes() -> Vec<String> {
    DEFAULT_SCRIPT_MIME_PREFIXES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            suppress: default_suppress(),
            script_mimes: default_script_mimes(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// TOML format:
    ///
    /// ```toml
    /// [backend]
    /// base_url = "http://localhost:3000"
    /// timeout_seconds = 10
    ///
    /// suppress = ["google-analytics\\.com"]
    /// script_mimes = ["application/javascript", "text/javascript"]
    /// ```
    ///
    /// Omitted fields keep their defaults, including the stock
    /// suppression and MIME lists.
    pub async fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let s = tokio::fs::read_to_string(path.as_ref()).await?;
        let cfg: Self = toml::from_str(&s)?;
        Ok(cfg)
    }
}
