//! Construction options for a codec transform.
//!
//! Options are immutable once the stage is built. Validation happens in
//! [`CodecTransform::new`](crate::CodecTransform::new) so that a
//! misconfigured stage fails before it admits a single message.
//!
//! # Config file
//!
//! With the `config-file` feature, options can be read from TOML. The
//! default metadata value is read from the key *named by* `meta`:
//!
//! ```toml
//! object_mode = true
//! meta = "s"
//! fault_policy = "ignore"
//! s = "hELLO WORLD?"
//! ```

use crate::error::ConfigError;
use crate::metadata::MetaAccessor;
use serde::Deserialize;

/// What the stage does after containing a per-message fault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Drop the message, report it as ignored and keep going.
    #[default]
    Ignore,
    /// Report the fault as ignored, then halt the stage.
    Fail,
}

/// The metadata property as it was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MetaProperty {
    Name(String),
    Invalid { found: &'static str },
}

/// Options for [`CodecTransform::new`](crate::CodecTransform::new).
#[derive(Debug)]
pub struct TransformOptions<M> {
    pub(crate) object_mode: Option<bool>,
    pub(crate) meta: Option<MetaProperty>,
    pub(crate) default_meta: Option<M>,
    pub(crate) accessor: Option<MetaAccessor<M>>,
    pub(crate) fault_policy: FaultPolicy,
}

impl<M> Default for TransformOptions<M> {
    fn default() -> Self {
        Self {
            object_mode: None,
            meta: None,
            default_meta: None,
            accessor: None,
            fault_policy: FaultPolicy::Ignore,
        }
    }
}

impl<M> TransformOptions<M> {
    /// Options with no metadata property: every message is reduced.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests object or byte-stream mode.
    ///
    /// The stage only supports object mode; `false` fails construction.
    #[must_use]
    pub fn object_mode(mut self, enabled: bool) -> Self {
        self.object_mode = Some(enabled);
        self
    }

    /// Names the message property that carries metadata.
    ///
    /// Without a property name metadata is always absent. An empty name is
    /// the same as none.
    #[must_use]
    pub fn meta(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.meta = (!name.is_empty()).then_some(MetaProperty::Name(name));
        self
    }

    /// Default metadata, used when a message carries none of its own.
    #[must_use]
    pub fn default_meta(mut self, meta: M) -> Self {
        self.default_meta = Some(meta);
        self
    }

    /// Replaces the per-message metadata lookup.
    #[must_use]
    pub fn accessor(mut self, accessor: MetaAccessor<M>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Sets the fault policy.
    #[must_use]
    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// The configured metadata property name, if valid.
    #[must_use]
    pub fn meta_name(&self) -> Option<&str> {
        match &self.meta {
            Some(MetaProperty::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Checks the construction contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object_mode == Some(false) {
            return Err(ConfigError::ByteStreamMode);
        }
        if let Some(MetaProperty::Invalid { found }) = self.meta {
            return Err(ConfigError::InvalidMetaProperty { found });
        }
        Ok(())
    }
}

#[cfg(feature = "config-file")]
impl<M> TransformOptions<M>
where
    M: serde::de::DeserializeOwned,
{
    /// Parses options from a TOML document.
    ///
    /// Only syntax and value types are checked here; the construction
    /// contract is enforced by [`validate`](Self::validate).
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let table: toml::Table =
            toml::from_str(src).map_err(|err| ConfigError::Parse(err.to_string()))?;

        let mut options = Self::new();

        if let Some(toml::Value::Boolean(enabled)) = table.get("object_mode") {
            options.object_mode = Some(*enabled);
        }

        options.meta = match table.get("meta") {
            None => None,
            Some(toml::Value::String(name)) if name.is_empty() => None,
            Some(toml::Value::String(name)) => Some(MetaProperty::Name(name.clone())),
            Some(other) => Some(MetaProperty::Invalid {
                found: other.type_str(),
            }),
        };

        if let Some(value) = table.get("fault_policy") {
            options.fault_policy = value
                .clone()
                .try_into()
                .map_err(|err: toml::de::Error| ConfigError::Parse(err.to_string()))?;
        }

        if let Some(MetaProperty::Name(key)) = &options.meta {
            if let Some(value) = table.get(key) {
                let meta = value.clone().try_into().map_err(|err: toml::de::Error| {
                    ConfigError::InvalidDefault {
                        key: key.clone(),
                        reason: err.to_string(),
                    }
                })?;
                options.default_meta = Some(meta);
            }
        }

        Ok(options)
    }

    /// Reads and parses a TOML options file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }
}
