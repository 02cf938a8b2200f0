use std::{collections::HashMap, future::Future};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FeatureFlagError {
    #[error("Could not read feature flag {feature}. {reason}")]
    LookupFailed { feature: String, reason: String },
}

/// Read-only view onto the notification feature switches.
///
/// A feature the provider knows nothing about is disabled. There is no caching requirement; implementations may hit
/// their backing store on every call.
pub trait FeatureFlags {
    fn is_enabled(&self, feature: &str) -> impl Future<Output = Result<bool, FeatureFlagError>> + Send;
}

/// A fixed set of feature flags, configured up front.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatureFlags {
    flags: HashMap<String, bool>,
}

impl StaticFeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag<S: Into<String>>(mut self, feature: S, enabled: bool) -> Self {
        self.flags.insert(feature.into(), enabled);
        self
    }
}

impl FeatureFlags for StaticFeatureFlags {
    async fn is_enabled(&self, feature: &str) -> Result<bool, FeatureFlagError> {
        Ok(self.flags.get(feature).copied().unwrap_or(false))
    }
}
