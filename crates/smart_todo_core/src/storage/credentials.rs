use crate::error::AppError;
use crate::storage::KeyValueStore;
use secrecy::{ExposeSecret, SecretString};

pub const CREDENTIAL_KEY: &str = "openai-api-key";

/// Holds the completion-service API key. Only checks for presence; the
/// service decides whether the key is valid.
#[derive(Debug, Clone)]
pub struct CredentialStore<S> {
    kv: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn get(&self) -> Result<Option<SecretString>, AppError> {
        let stored = self.kv.get(CREDENTIAL_KEY)?;
        Ok(stored
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::from))
    }

    pub fn set(&self, credential: &SecretString) -> Result<(), AppError> {
        let trimmed = credential.expose_secret().trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("api key is required"));
        }
        self.kv.set(CREDENTIAL_KEY, trimmed)
    }

    pub fn clear(&self) -> Result<(), AppError> {
        self.kv.remove(CREDENTIAL_KEY)
    }
}
