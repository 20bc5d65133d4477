//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading or parsing the deploy configuration file
    ReadConfig(String),
    /// Error writing the deploy configuration file
    WriteConfig(String),
    /// Error writing the deployment record
    WriteDeployments(String),
    /// A required contract artifact could not be located
    ArtifactMissing(String),
    /// A contract artifact was located but could not be decoded
    ArtifactMalformed(String),
    /// A linked library's address was unavailable during bytecode linking
    UnresolvedLibrary(String),
    /// A link reference's declared byte range does not fit a library address
    LinkLengthMismatch(String),
    /// The contract dependency graph is not a valid DAG
    InvalidDependencyGraph(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error reaching the network for chain metadata, nonces, or gas estimates
    NetworkUnavailable(String),
    /// Error constructing calldata for a contract constructor
    CalldataConstruction(String),
    /// A deployment transaction failed or was never mined
    TransactionFailed(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadConfig(s) => write!(f, "error reading deploy config: {}", s),
            ScriptError::WriteConfig(s) => write!(f, "error writing deploy config: {}", s),
            ScriptError::WriteDeployments(s) => {
                write!(f, "error writing deployment record: {}", s)
            }
            ScriptError::ArtifactMissing(s) => write!(f, "artifact not found: {}", s),
            ScriptError::ArtifactMalformed(s) => write!(f, "malformed artifact: {}", s),
            ScriptError::UnresolvedLibrary(s) => write!(f, "unresolved library: {}", s),
            ScriptError::LinkLengthMismatch(s) => {
                write!(f, "link reference length mismatch: {}", s)
            }
            ScriptError::InvalidDependencyGraph(s) => {
                write!(f, "invalid dependency graph: {}", s)
            }
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::NetworkUnavailable(s) => write!(f, "network unavailable: {}", s),
            ScriptError::CalldataConstruction(s) => {
                write!(f, "error constructing calldata: {}", s)
            }
            ScriptError::TransactionFailed(s) => {
                write!(f, "deployment transaction failed: {}", s)
            }
        }
    }
}

impl Error for ScriptError {}
