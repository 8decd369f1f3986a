use rand::seq::SliceRandom;
use rollcall_core::BrowserConfig as BrowserSettings;

/// Desktop user agents a session may present.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
];

/// Client identity presented by one browser session
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Pick a user agent from the pool; the viewport comes from settings.
    pub fn randomized(settings: &BrowserSettings) -> Self {
        let mut rng = rand::thread_rng();
        let user_agent = USER_AGENTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        Self {
            user_agent: user_agent.to_string(),
            viewport_width: settings.window_width,
            viewport_height: settings.window_height,
        }
    }
}
