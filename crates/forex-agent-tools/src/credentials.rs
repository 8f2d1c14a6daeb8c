use std::fmt;

pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Provider API keys. A missing key is reported by the tool that needs it,
/// at call time, never at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub alpha_vantage: Option<String>,
    pub openai: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            alpha_vantage: read_env(ALPHA_VANTAGE_KEY_ENV),
            openai: read_env(OPENAI_KEY_ENV),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("alpha_vantage", &mask(&self.alpha_vantage))
            .field("openai", &mask(&self.openai))
            .finish()
    }
}

/// Read an environment variable, treating an empty value as absent.
pub fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
