//! Configuration resolver
//!
//! Splits a caller's option set into the algorithm selector and the
//! pass-through attributes. Unknown algorithm names degrade to the default
//! with a warning and never fail construction.

use crate::algorithm::Algorithm;
use crate::value::{Options, Value};
use std::fmt;
use tracing::{debug, warn};

/// Option key consumed by the resolver
pub const ALGORITHM_KEY: &str = "algorithm";

/// Non-fatal diagnostic produced while resolving options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `algorithm` named something outside the lookup table
    UnknownAlgorithm { value: Value },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownAlgorithm { value } => {
                write!(f, "unknown algorithm {}, using the default", value)
            }
        }
    }
}

/// Resolved selector plus the options left to store as attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub algorithm: Algorithm,
    pub attributes: Options,
    pub warnings: Vec<ConfigWarning>,
}

/// Resolve `options` without modifying them
pub fn resolve(options: &Options) -> Resolution {
    let mut algorithm = Algorithm::DEFAULT;
    let mut attributes = Options::new();
    let mut warnings = Vec::new();

    for (key, value) in options {
        if key != ALGORITHM_KEY {
            attributes.insert(key.clone(), value.clone());
            continue;
        }

        match lookup_algorithm(value) {
            Some(selected) => algorithm = selected,
            None => {
                warn!(value = %value, "Unknown algorithm, using the default");
                warnings.push(ConfigWarning::UnknownAlgorithm {
                    value: value.clone(),
                });
            }
        }
    }

    debug!(
        algorithm = %algorithm,
        attribute_count = attributes.len(),
        "Options resolved"
    );

    Resolution {
        algorithm,
        attributes,
        warnings,
    }
}

fn lookup_algorithm(value: &Value) -> Option<Algorithm> {
    match value {
        Value::Text(name) => Algorithm::from_name(name),
        Value::Algorithm(algorithm) => Some(*algorithm),
        Value::Boolean(_) | Value::Integer(_) => None,
    }
}
