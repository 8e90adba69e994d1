//! Connection settings for the document extraction service.

/// Everything a `DocumentClient` needs to talk to
/// one queue. Built by the caller and handed to the client; nothing is read
/// from the process environment here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, e.g. `https://example.rossum.app` (trailing slash trimmed).
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Queue that uploads go to and exports are read from.
    pub queue_id: String,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        queue_id: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            queue_id: queue_id.into(),
        }
    }

    /// Names of settings that are empty. All are required.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("base_url", &self.base_url),
            ("username", &self.username),
            ("password", &self.password),
            ("queue_id", &self.queue_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Fail with every missing setting listed at once.
    pub fn validate(&self) -> Result<(), crate::ClientError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(crate::ClientError::MissingConfig(missing))
        }
    }
}
