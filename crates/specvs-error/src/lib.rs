//! Unified error types for specvs.
//!
//! The comparison engine itself never fails: missing or odd data degrades to
//! fewer advantages. Errors only come from building a registry or from I/O
//! around it.

use std::path::PathBuf;

/// A registry that cannot be evaluated deterministically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("attribute {key}: declares both higher_is_better and ranking")]
    ConflictingModes { key: String },

    #[error("attribute {key}: ranking list is empty")]
    EmptyRanking { key: String },

    #[error("attribute {key} is declared more than once")]
    DuplicateKey { key: String },

    #[error("composite {composite}: unknown child attribute {child}")]
    UnknownChild { composite: String, child: String },

    #[error("attribute {child} belongs to both {first} and {second}")]
    ChildInMultipleComposites {
        child: String,
        first: String,
        second: String,
    },

    #[error("composite {composite} must be evaluated before its child {child}")]
    ChildBeforeComposite { composite: String, child: String },

    #[error("composite {composite}: consolidated composites need a score_key")]
    MissingScoreKey { composite: String },

    #[error("composite {composite}: portability needs exactly 2 children, got {count}")]
    PortabilityArity { composite: String, count: usize },

    #[error("attribute {key}: fallback target {fallback} is not in the registry")]
    UnknownFallback { key: String, fallback: String },

    #[error("attribute {key}: fallback target {fallback} must be evaluated first")]
    FallbackOrder { key: String, fallback: String },

    #[error("attribute {key}: invalid threshold {value}")]
    InvalidThreshold { key: String, value: f64 },

    #[error("engine.{setting} must be at least 1")]
    ZeroSetting { setting: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum SpecvsError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid registry toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SpecvsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SpecvsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SpecvsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_name_the_attribute() {
        let err = RegistryError::ConflictingModes {
            key: "suspension.type".into(),
        };
        assert!(err.to_string().contains("suspension.type"));

        let err = RegistryError::ChildInMultipleComposites {
            child: "wheels.tire_type".into(),
            first: "ride_quality".into(),
            second: "safety".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ride_quality") && msg.contains("safety"));
    }

    #[test]
    fn registry_error_converts_into_umbrella() {
        let err: SpecvsError = RegistryError::EmptyRanking { key: "brakes".into() }.into();
        assert!(matches!(err, SpecvsError::Registry(_)));
        assert_eq!(err.to_string(), "attribute brakes: ranking list is empty");
    }

    #[test]
    fn io_error_carries_path() {
        let err = SpecvsError::io(
            "registry.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().starts_with("registry.toml"));
    }
}
