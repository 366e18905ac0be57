use serde::{Deserialize, Serialize};

use packflow_core::{DomainError, ValueObject};

/// Canonical SKU key (the packaging item's unique name, e.g. "8oz-bottle").
///
/// Every store indexes inventory by this one key. Surrounding whitespace is
/// trimmed so the same SKU read from two sources compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkuName(String);

impl ValueObject for SkuName {}

impl SkuName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("sku name cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SkuName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SkuName> for String {
    fn from(value: SkuName) -> Self {
        value.0
    }
}

impl core::fmt::Display for SkuName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for SkuName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
