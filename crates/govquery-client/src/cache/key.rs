//! Cache key types and factory methods

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Cache key namespace for operation categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// Backend health status
    Health,
    /// Schema list
    SchemaList,
    /// Single schema descriptor
    Schema,
    /// Natural language to SQL conversion
    QueryConversion,
    /// Custom namespace for extensions
    Custom,
}

impl CacheNamespace {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::SchemaList => "schemas",
            Self::Schema => "schema",
            Self::QueryConversion => "query",
            Self::Custom => "custom",
        }
    }
}

/// Structured cache key with namespace isolation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: CacheNamespace,
    identifier: String,
    variant: Option<String>,
}

impl CacheKey {
    /// Fixed key for the health check
    #[must_use]
    pub fn health() -> Self {
        Self {
            namespace: CacheNamespace::Health,
            identifier: "_status".to_string(),
            variant: None,
        }
    }

    /// Fixed key for the schema list
    #[must_use]
    pub fn schema_list() -> Self {
        Self {
            namespace: CacheNamespace::SchemaList,
            identifier: "_all".to_string(),
            variant: None,
        }
    }

    /// Key for a single schema, keyed off the table code verbatim
    #[must_use]
    pub fn schema(table_code: &str) -> Self {
        Self {
            namespace: CacheNamespace::Schema,
            identifier: table_code.to_string(),
            variant: None,
        }
    }

    /// Key for a query conversion request.
    ///
    /// Table code order is preserved: the backend treats the list as ordered.
    #[must_use]
    pub fn query_conversion(
        query: &str,
        table_codes: Option<&[String]>,
        model_choice: Option<&str>,
    ) -> Self {
        let params = serde_json::json!({
            "query": query,
            "table_codes": table_codes,
            "model_choice": model_choice,
        });
        Self::hashed(CacheNamespace::QueryConversion, &params.to_string())
    }

    /// Key derived from any serializable parameter set.
    ///
    /// Parameters go through `serde_json::Value`, whose object map is ordered by
    /// key, so field declaration order never changes the key.
    #[must_use]
    pub fn from_params<P: Serialize + ?Sized>(namespace: CacheNamespace, params: &P) -> Self {
        let canonical = serde_json::to_value(params)
            .map_or_else(|e| format!("unserializable:{e}"), |v| v.to_string());
        Self::hashed(namespace, &canonical)
    }

    /// Create a custom cache key
    #[must_use]
    pub fn custom(identifier: &str, variant: Option<&str>) -> Self {
        Self {
            namespace: CacheNamespace::Custom,
            identifier: identifier.to_string(),
            variant: variant.map(ToString::to_string),
        }
    }

    /// Hash + length discriminator over the full canonical form
    fn hashed(namespace: CacheNamespace, canonical: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        let hash = hasher.finish();

        Self {
            namespace,
            identifier: format!("{hash:016x}:{}", canonical.len()),
            variant: None,
        }
    }

    /// Get the namespace of this key
    #[must_use]
    pub const fn namespace(&self) -> CacheNamespace {
        self.namespace
    }

    /// Get namespace prefix for bulk operations
    #[must_use]
    pub fn namespace_prefix(&self) -> String {
        format!("{}:", self.namespace.as_str())
    }

    /// Convert to string key for storage
    #[must_use]
    pub fn to_key_string(&self) -> String {
        let mut key = format!("{}:{}", self.namespace.as_str(), self.identifier);
        if let Some(ref variant) = self.variant {
            key.push(':');
            key.push_str(variant);
        }
        key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key_string())
    }
}
