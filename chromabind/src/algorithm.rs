//! Fingerprinting algorithm selector

use crate::ffi::chromaprint::{
    CHROMAPRINT_ALGORITHM_DEFAULT, CHROMAPRINT_ALGORITHM_TEST1, CHROMAPRINT_ALGORITHM_TEST2,
    CHROMAPRINT_ALGORITHM_TEST3, CHROMAPRINT_ALGORITHM_TEST4,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::raw::c_int;

/// Algorithm variant recognized by the native library
///
/// `Default` is kept distinct from `Test2` in attributes even though both
/// reach the library as the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Default,
    Test1,
    Test2,
    Test3,
    Test4,
}

/// Names accepted for the `algorithm` option
const NAME_TABLE: [(&str, Algorithm); 4] = [
    ("test1", Algorithm::Test1),
    ("test2", Algorithm::Test2),
    ("test3", Algorithm::Test3),
    ("test4", Algorithm::Test4),
];

impl Algorithm {
    /// Selector used when the caller does not name a valid algorithm
    pub const DEFAULT: Algorithm = Algorithm::Default;

    /// Look up a user-facing name (case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        NAME_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, algorithm)| *algorithm)
    }

    /// Parse a stored canonical name, `default` included
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        if name == Algorithm::Default.name() {
            return Some(Algorithm::Default);
        }
        Self::from_name(name)
    }

    /// Canonical attribute name
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Default => "default",
            Algorithm::Test1 => "test1",
            Algorithm::Test2 => "test2",
            Algorithm::Test3 => "test3",
            Algorithm::Test4 => "test4",
        }
    }

    /// Code passed to the native constructor
    pub fn native_code(self) -> c_int {
        match self {
            Algorithm::Default => CHROMAPRINT_ALGORITHM_DEFAULT,
            Algorithm::Test1 => CHROMAPRINT_ALGORITHM_TEST1,
            Algorithm::Test2 => CHROMAPRINT_ALGORITHM_TEST2,
            Algorithm::Test3 => CHROMAPRINT_ALGORITHM_TEST3,
            Algorithm::Test4 => CHROMAPRINT_ALGORITHM_TEST4,
        }
    }

    /// Map a code reported by the library back to a concrete variant
    pub fn from_native_code(code: c_int) -> Option<Self> {
        match code {
            CHROMAPRINT_ALGORITHM_TEST1 => Some(Algorithm::Test1),
            CHROMAPRINT_ALGORITHM_TEST2 => Some(Algorithm::Test2),
            CHROMAPRINT_ALGORITHM_TEST3 => Some(Algorithm::Test3),
            CHROMAPRINT_ALGORITHM_TEST4 => Some(Algorithm::Test4),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
