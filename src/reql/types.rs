//! ReQL type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource quotas enforced while datums are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of elements in a single array.
    pub array_size: usize,
    /// Maximum number of fields in a single object.
    pub object_size: usize,
    /// Maximum length of a single string, in bytes.
    pub string_bytes: usize,
    /// Maximum nesting depth of arrays and objects.
    pub nesting_depth: usize,
}

impl Limits {
    pub const DEFAULT_ARRAY_SIZE: usize = 100_000;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            array_size: Self::DEFAULT_ARRAY_SIZE,
            object_size: 100_000,
            string_bytes: 64 * 1024 * 1024,
            nesting_depth: 128,
        }
    }
}

/// Query language version negotiated with the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReqlVersion {
    #[serde(rename = "2.0")]
    V2_0,
    #[serde(rename = "2.1")]
    V2_1,
    #[serde(rename = "2.2")]
    V2_2,
    #[serde(rename = "2.3")]
    V2_3,
    #[serde(rename = "2.4")]
    V2_4,
}

impl ReqlVersion {
    pub const LATEST: ReqlVersion = ReqlVersion::V2_4;

    pub fn as_str(&self) -> &'static str {
        match self {
            ReqlVersion::V2_0 => "2.0",
            ReqlVersion::V2_1 => "2.1",
            ReqlVersion::V2_2 => "2.2",
            ReqlVersion::V2_3 => "2.3",
            ReqlVersion::V2_4 => "2.4",
        }
    }
}

impl Default for ReqlVersion {
    fn default() -> Self {
        ReqlVersion::LATEST
    }
}

impl fmt::Display for ReqlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    SuccessAtom,
    ClientError,
    CompileError,
    RuntimeError,
}

impl ResponseType {
    /// Numeric code used in the `t` field of a response.
    pub fn code(self) -> u32 {
        match self {
            ResponseType::SuccessAtom => 1,
            ResponseType::ClientError => 16,
            ResponseType::CompileError => 17,
            ResponseType::RuntimeError => 18,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResponseType::SuccessAtom => "SUCCESS_ATOM",
            ResponseType::ClientError => "CLIENT_ERROR",
            ResponseType::CompileError => "COMPILE_ERROR",
            ResponseType::RuntimeError => "RUNTIME_ERROR",
        }
    }
}

/// Runtime error classification carried in the `e` field of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    Internal,
    ResourceLimit,
    QueryLogic,
}

impl ErrorType {
    pub fn code(self) -> u32 {
        match self {
            ErrorType::Internal => 1_000_000,
            ErrorType::ResourceLimit => 2_000_000,
            ErrorType::QueryLogic => 3_000_000,
        }
    }
}
