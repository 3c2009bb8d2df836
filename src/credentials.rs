/*!
 * Credential suppliers for translation providers.
 *
 * A supplier answers "what is the active secret for service X?". Absence is
 * a normal outcome, surfaced to callers as `ProviderError::Unavailable`.
 */

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use log::{debug, warn};

use crate::database::Repository;

/// Source of secrets for named services
#[async_trait]
pub trait CredentialSupplier: Send + Sync + Debug {
    /// Active secret for a service, if any
    async fn get_credential(&self, service: &str) -> Option<String>;
}

/// Reads secrets from environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    /// Explicit service → variable name mapping
    variables: HashMap<String, String>,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a service to a specific environment variable
    pub fn with_variable(mut self, service: impl Into<String>, variable: impl Into<String>) -> Self {
        self.variables.insert(service.into(), variable.into());
        self
    }

    /// Variable consulted for a service; `<SERVICE>_API_KEY` unless mapped
    pub fn variable_for(&self, service: &str) -> String {
        self.variables.get(service).cloned().unwrap_or_else(|| {
            let normalized: String = service
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
                .collect();
            format!("{}_API_KEY", normalized)
        })
    }
}

#[async_trait]
impl CredentialSupplier for EnvCredentials {
    async fn get_credential(&self, service: &str) -> Option<String> {
        let variable = self.variable_for(service);
        match std::env::var(&variable) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => {
                debug!("No credential in environment variable {}", variable);
                None
            }
        }
    }
}

/// Fixed in-memory secrets
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    secrets: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, service: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secrets.insert(service.into(), secret.into());
        self
    }
}

#[async_trait]
impl CredentialSupplier for StaticCredentials {
    async fn get_credential(&self, service: &str) -> Option<String> {
        self.secrets.get(service).filter(|s| !s.is_empty()).cloned()
    }
}

#[async_trait]
impl CredentialSupplier for Repository {
    async fn get_credential(&self, service: &str) -> Option<String> {
        match self.active_credential(service).await {
            Ok(secret) => secret,
            Err(e) => {
                warn!("Failed to read credential for '{}': {}", service, e);
                None
            }
        }
    }
}

/// Asks each supplier in order and returns the first secret found
#[derive(Debug, Default)]
pub struct ChainedCredentials {
    suppliers: Vec<Box<dyn CredentialSupplier>>,
}

impl ChainedCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, supplier: impl CredentialSupplier + 'static) -> Self {
        self.suppliers.push(Box::new(supplier));
        self
    }
}

#[async_trait]
impl CredentialSupplier for ChainedCredentials {
    async fn get_credential(&self, service: &str) -> Option<String> {
        for supplier in &self.suppliers {
            if let Some(secret) = supplier.get_credential(service).await {
                return Some(secret);
            }
        }
        None
    }
}
