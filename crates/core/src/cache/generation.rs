//! Generation tags and the store names derived from them.
//!
//! A generation is `<namespace>-<version>`. Each generation owns exactly three
//! stores, `<generation>-static`, `<generation>-dynamic` and `<generation>-api`.
//! Any other store whose name starts with `<namespace>-` belongs to a
//! superseded generation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorePurpose {
    /// Precached documents and immutable build assets.
    Static,
    /// Navigations and everything that is not an API call or an asset.
    Dynamic,
    /// Server data responses.
    Api,
}

impl StorePurpose {
    pub const ALL: [StorePurpose; 3] = [StorePurpose::Static, StorePurpose::Dynamic, StorePurpose::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorePurpose::Static => "static",
            StorePurpose::Dynamic => "dynamic",
            StorePurpose::Api => "api",
        }
    }
}

impl fmt::Display for StorePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cache epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generation {
    namespace: String,
    version: String,
}

impl Generation {
    pub fn new(namespace: impl Into<String>, version: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), version: version.into() }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The opaque tag, `<namespace>-<version>`.
    pub fn tag(&self) -> String {
        format!("{}-{}", self.namespace, self.version)
    }

    pub fn store_name(&self, purpose: StorePurpose) -> String {
        format!("{}-{}", self.tag(), purpose.as_str())
    }

    pub fn stores(&self) -> StoreNames {
        StoreNames {
            static_assets: self.store_name(StorePurpose::Static),
            dynamic: self.store_name(StorePurpose::Dynamic),
            api: self.store_name(StorePurpose::Api),
        }
    }

    /// Whether `name` lives in this agent's namespace, whatever its generation.
    pub fn owns(&self, name: &str) -> bool {
        name.strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Whether `name` is owned by this namespace but is not one of the current stores.
    pub fn is_stale(&self, name: &str) -> bool {
        self.owns(name) && !self.stores().contains(name)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.namespace, self.version)
    }
}

/// The three live store names of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    pub static_assets: String,
    pub dynamic: String,
    pub api: String,
}

impl StoreNames {
    pub fn get(&self, purpose: StorePurpose) -> &str {
        match purpose {
            StorePurpose::Static => &self.static_assets,
            StorePurpose::Dynamic => &self.dynamic,
            StorePurpose::Api => &self.api,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        StorePurpose::ALL.iter().any(|p| self.get(*p) == name)
    }
}
