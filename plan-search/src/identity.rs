//! Network identity presented by a harvesting session.
//!
//! Search engines throttle clients that look automated. The identity is
//! consulted once when a session is launched, so every query in a batch
//! presents the same User-Agent and a fresh session may present another.

use rand::seq::SliceRandom;

/// Realistic browser User-Agent strings.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Supplies the identity a new session presents.
pub trait NetworkIdentity: Send + Sync {
    /// The User-Agent for the next session.
    fn user_agent(&self) -> String;
}

/// Picks a random User-Agent from the built-in list for every session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotatingUserAgents;

impl NetworkIdentity for RotatingUserAgents {
    fn user_agent(&self) -> String {
        random_user_agent().to_owned()
    }
}

/// Always presents the same User-Agent.
#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl NetworkIdentity for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// The identity implied by a configured override: fixed when set,
/// rotating otherwise.
pub fn from_override(user_agent: Option<&str>) -> Box<dyn NetworkIdentity> {
    match user_agent {
        Some(ua) if !ua.trim().is_empty() => Box::new(FixedUserAgent(ua.to_owned())),
        _ => Box::new(RotatingUserAgents),
    }
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array; choose only returns None on empty slices.
        .unwrap_or(USER_AGENTS[0])
}
