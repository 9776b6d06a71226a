use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// User agent, viewport, platform, and languages presented by one session.
pub struct UserAgentProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    pub languages: Vec<String>,
}

impl UserAgentProfile {
    fn windows_chrome() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1920, 1080),
            platform: "Win32".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string(), "ru".to_string()],
        }
    }

    fn mac_chrome() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1440, 900),
            platform: "MacIntel".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string(), "ru".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
/// Small pool of plausible desktop profiles; one is pinned per session.
pub struct UserAgentManager {
    desktop_profiles: Vec<UserAgentProfile>,
    current_session_profile: Option<UserAgentProfile>,
}

impl Default for UserAgentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAgentManager {
    /// Create a new manager with built-in desktop profiles.
    pub fn new() -> Self {
        Self {
            desktop_profiles: vec![
                UserAgentProfile::windows_chrome(),
                UserAgentProfile::mac_chrome(),
            ],
            current_session_profile: None,
        }
    }

    /// Get (or lazily select) the current session profile.
    pub fn session_profile(&mut self) -> &UserAgentProfile {
        let pool = &self.desktop_profiles;
        self.current_session_profile.get_or_insert_with(|| {
            let idx = rand::thread_rng().gen_range(0..pool.len().max(1));
            pool.get(idx)
                .cloned()
                .unwrap_or_else(UserAgentProfile::windows_chrome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_pinned_for_the_session() {
        let mut mgr = UserAgentManager::new();
        let first = mgr.session_profile().user_agent.clone();
        for _ in 0..10 {
            assert_eq!(mgr.session_profile().user_agent, first);
        }
    }

    #[test]
    fn profiles_advertise_russian_locale() {
        let mut mgr = UserAgentManager::new();
        assert!(mgr.session_profile().languages.iter().any(|l| l == "ru"));
    }
}
