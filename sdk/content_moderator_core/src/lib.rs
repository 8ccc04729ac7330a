#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use error::ModeratorError;

/// Helpers for tests against a mock server.
///
/// Enabled by the `test-support` feature so sibling crates can share one
/// client setup in their dev-dependencies.
#[cfg(feature = "test-support")]
pub mod test_support {
    use crate::auth::ModeratorCredential;
    use crate::client::ModeratorClient;
    use wiremock::MockServer;

    /// Subscription key used by mock-server tests (not a real key).
    pub const TEST_SUBSCRIPTION_KEY: &str = "test-subscription-key";

    /// Create a client pointed at a mock server.
    pub fn mock_client(server: &MockServer) -> ModeratorClient {
        ModeratorClient::builder()
            .endpoint(server.uri())
            .credential(ModeratorCredential::new(TEST_SUBSCRIPTION_KEY))
            .build()
            .expect("should build client")
    }
}
