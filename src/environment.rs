use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Environment variable selecting the backend deployment.
pub const ENVIRONMENT_VAR: &str = "CRAFT_ENVIRONMENT";

/// Represents the backend deployments the gateway can talk to.
#[derive(Clone, Default, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development backend.
    #[default]
    Local,
    /// Staging backend for pre-production testing.
    Staging,
    /// Production backend.
    Production,
}

impl Environment {
    /// Returns the backend base URL associated with the environment.
    pub fn api_base_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:3000".to_string(),
            Environment::Staging => "https://staging.craft-fusion.com".to_string(),
            Environment::Production => "https://craft-fusion.com".to_string(),
        }
    }

    /// Reads `CRAFT_ENVIRONMENT`, falling back to the default on absence or garbage.
    pub fn from_env() -> Self {
        std::env::var(ENVIRONMENT_VAR)
            .unwrap_or_default()
            .parse::<Environment>()
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Staging => write!(f, "Staging"),
            Environment::Production => write!(f, "Production"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.api_base_url())
    }
}
