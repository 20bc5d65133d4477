//! Loading and validation of compiled contract artifacts
//!
//! The deploy scripts consume Hardhat compilation output: one JSON record per
//! contract carrying its ABI, unlinked creation bytecode, and the
//! link-reference table describing where library addresses must be
//! substituted. Lookup is abstracted behind [`ArtifactSource`] so the
//! orchestrator depends only on the name -> artifact contract, not on the
//! directory layout; the trait also enables in-memory mocks for tests.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use serde::Deserialize;

use crate::{
    constants::{LIBRARY_ARTIFACTS_SEGMENT, VERIFIER_ARTIFACTS_SEGMENT},
    errors::ScriptError,
    types::ContractName,
};

/// A single occurrence of a library reference within unlinked bytecode
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkOffset {
    /// The byte offset of the occurrence within the raw bytecode body
    pub start: usize,
    /// The length of the occurrence in bytes
    pub length: usize,
}

/// An artifact's link-reference table: source file -> library name -> occurrences
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// A compiled contract artifact
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// The contract's ABI description
    pub abi: serde_json::Value,
    /// The hex-encoded, possibly unlinked, creation bytecode
    pub bytecode: String,
    /// Where library addresses must be substituted into the bytecode
    #[serde(default)]
    pub link_references: LinkReferences,
}

impl ContractArtifact {
    /// Parse an artifact from its JSON encoding, checking for the fields a
    /// usable artifact must carry
    pub fn from_json(name: ContractName, raw: &str) -> Result<Self, ScriptError> {
        let artifact: ContractArtifact = serde_json::from_str(raw)
            .map_err(|e| ScriptError::ArtifactMalformed(format!("{name}: {e}")))?;

        if artifact.abi.is_null() {
            return Err(ScriptError::ArtifactMalformed(format!(
                "{name}: artifact carries no ABI"
            )));
        }
        if artifact.bytecode.is_empty() {
            return Err(ScriptError::ArtifactMalformed(format!(
                "{name}: artifact carries no bytecode"
            )));
        }

        Ok(artifact)
    }
}

/// A read-only lookup from contract name to compiled artifact
pub trait ArtifactSource {
    /// Load the artifact for the given contract
    fn load(&self, name: ContractName) -> Result<ContractArtifact, ScriptError>;

    /// Ensure every artifact among `names` is present and well formed,
    /// failing on the first that is not
    fn validate_all(&self, names: &[ContractName]) -> Result<(), ScriptError> {
        for &name in names {
            self.load(name)?;
        }
        Ok(())
    }
}

/// An [`ArtifactSource`] over a Hardhat compilation output directory
pub struct HardhatArtifacts {
    /// The root of the compiled artifact tree, typically `artifacts/contracts`
    base: PathBuf,
}

impl HardhatArtifacts {
    /// Create an artifact source rooted at the given directory
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The path an artifact is expected at.
    ///
    /// The registrar and token contracts live at the root of the source tree,
    /// the library under `libraries/`, and the verifiers under `prod/`.
    fn artifact_path(&self, name: ContractName) -> PathBuf {
        let sol_dir = format!("{name}.sol");
        let file = format!("{name}.json");
        match name {
            ContractName::Registrar | ContractName::EncryptedERC => {
                self.base.join(sol_dir).join(file)
            }
            ContractName::BabyJubJub => self
                .base
                .join(LIBRARY_ARTIFACTS_SEGMENT)
                .join(sol_dir)
                .join(file),
            _ => self
                .base
                .join(VERIFIER_ARTIFACTS_SEGMENT)
                .join(sol_dir)
                .join(file),
        }
    }
}

impl ArtifactSource for HardhatArtifacts {
    fn load(&self, name: ContractName) -> Result<ContractArtifact, ScriptError> {
        let path = self.artifact_path(name);
        let raw = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ScriptError::ArtifactMissing(format!("{name} (expected at {})", path.display()))
            } else {
                ScriptError::ArtifactMalformed(format!("{name}: {e}"))
            }
        })?;

        ContractArtifact::from_json(name, &raw)
    }
}

/// An [`ArtifactSource`] backed by an in-memory map, for callers that already
/// hold their artifacts and for orchestrator tests
#[derive(Default)]
pub struct MemoryArtifacts {
    /// The artifact for each contract
    artifacts: HashMap<ContractName, ContractArtifact>,
}

impl MemoryArtifacts {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact for the given contract
    pub fn insert(&mut self, name: ContractName, artifact: ContractArtifact) {
        self.artifacts.insert(name, artifact);
    }

    /// Remove the artifact for the given contract
    pub fn remove(&mut self, name: ContractName) {
        self.artifacts.remove(&name);
    }
}

impl ArtifactSource for MemoryArtifacts {
    fn load(&self, name: ContractName) -> Result<ContractArtifact, ScriptError> {
        self.artifacts
            .get(&name)
            .cloned()
            .ok_or_else(|| ScriptError::ArtifactMissing(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{ArtifactSource, ContractArtifact, HardhatArtifacts, MemoryArtifacts};
    use crate::{errors::ScriptError, types::ContractName};

    /// A minimal well-formed artifact JSON record
    fn artifact_json(bytecode: &str) -> String {
        format!(r#"{{"abi": [], "bytecode": "{bytecode}"}}"#)
    }

    #[test]
    fn test_parses_link_references() {
        let raw = r#"{
            "abi": [],
            "bytecode": "0x6001",
            "linkReferences": {
                "contracts/libraries/BabyJubJub.sol": {
                    "BabyJubJub": [
                        { "length": 20, "start": 50 },
                        { "length": 20, "start": 110 }
                    ]
                }
            }
        }"#;

        let artifact = ContractArtifact::from_json(ContractName::EncryptedERC, raw).unwrap();
        let occurrences =
            &artifact.link_references["contracts/libraries/BabyJubJub.sol"]["BabyJubJub"];
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].start, 50);
        assert_eq!(occurrences[1].length, 20);
    }

    #[test]
    fn test_rejects_artifact_without_bytecode() {
        let raw = r#"{"abi": [], "bytecode": ""}"#;
        let err = ContractArtifact::from_json(ContractName::Registrar, raw).unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactMalformed(ref s) if s.contains("Registrar")));
    }

    #[test]
    fn test_rejects_artifact_without_abi() {
        let raw = r#"{"bytecode": "0x6001"}"#;
        let err = ContractArtifact::from_json(ContractName::Registrar, raw).unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactMalformed(_)));

        let raw = r#"{"abi": null, "bytecode": "0x6001"}"#;
        let err = ContractArtifact::from_json(ContractName::Registrar, raw).unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactMalformed(_)));
    }

    #[test]
    fn test_validate_all_names_first_missing_artifact() {
        let mut source = MemoryArtifacts::new();
        for name in ContractName::ALL {
            source.insert(
                name,
                ContractArtifact::from_json(name, &artifact_json("0x6001")).unwrap(),
            );
        }
        source.remove(ContractName::WithdrawVerifier);

        let err = source.validate_all(&ContractName::ALL).unwrap_err();
        assert!(
            matches!(err, ScriptError::ArtifactMissing(ref s) if s.contains("WithdrawVerifier"))
        );
    }

    #[test]
    fn test_resolves_hardhat_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();

        let cases = [
            (
                ContractName::RegistrationVerifier,
                "prod/RegistrationVerifier.sol/RegistrationVerifier.json",
            ),
            (ContractName::Registrar, "Registrar.sol/Registrar.json"),
            (
                ContractName::BabyJubJub,
                "libraries/BabyJubJub.sol/BabyJubJub.json",
            ),
        ];
        for (_, rel) in &cases {
            let path = base.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, artifact_json("0x6001")).unwrap();
        }

        let source = HardhatArtifacts::new(base);
        for (name, _) in cases {
            source.load(name).unwrap();
        }

        let err = source.load(ContractName::MintVerifier).unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactMissing(ref s) if s.contains("MintVerifier")));
    }
}
