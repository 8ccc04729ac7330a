use crate::error::{ModeratorError, ModeratorResult};
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the Content Moderator subscription key.
pub const SUBSCRIPTION_KEY_ENV: &str = "CONTENT_MODERATOR_SUBSCRIPTION_KEY";

/// A Content Moderator subscription key.
///
/// The service authenticates every request with the key sent in the
/// `Ocp-Apim-Subscription-Key` header. The key can be supplied inline with
/// [`ModeratorCredential::new`] or sourced from the environment with
/// [`ModeratorCredential::from_env`]; both feed the same client.
#[derive(Clone)]
pub struct ModeratorCredential {
    key: SecretString,
}

impl ModeratorCredential {
    /// Create a credential from an explicit subscription key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: SecretString::from(key.into()),
        }
    }

    /// Create a credential from the `CONTENT_MODERATOR_SUBSCRIPTION_KEY`
    /// environment variable.
    pub fn from_env() -> ModeratorResult<Self> {
        match std::env::var(SUBSCRIPTION_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(ModeratorError::MissingConfig(format!(
                "subscription key is required. Set it via builder or the {SUBSCRIPTION_KEY_ENV} env var."
            ))),
        }
    }

    /// Expose the key for use as a request header value.
    pub(crate) fn resolve(&self) -> String {
        self.key.expose_secret().to_string()
    }
}

impl std::fmt::Debug for ModeratorCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModeratorCredential(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn debug_does_not_leak_key() {
        let credential = ModeratorCredential::new("super-secret-key");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("****"));
    }

    #[test]
    #[serial]
    fn from_env_reads_key() {
        std::env::set_var(SUBSCRIPTION_KEY_ENV, "env-key");
        let credential = ModeratorCredential::from_env().expect("should resolve");
        assert_eq!(credential.resolve(), "env-key");
        std::env::remove_var(SUBSCRIPTION_KEY_ENV);
    }

    #[test]
    #[serial]
    fn from_env_rejects_missing_key() {
        std::env::remove_var(SUBSCRIPTION_KEY_ENV);
        let result = ModeratorCredential::from_env();
        assert!(matches!(result, Err(ModeratorError::MissingConfig(_))));
    }

    #[test]
    #[serial]
    fn from_env_rejects_empty_key() {
        std::env::set_var(SUBSCRIPTION_KEY_ENV, "");
        let result = ModeratorCredential::from_env();
        assert!(matches!(result, Err(ModeratorError::MissingConfig(_))));
        std::env::remove_var(SUBSCRIPTION_KEY_ENV);
    }
}
