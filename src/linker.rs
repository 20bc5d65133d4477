//! Substitution of library addresses into unlinked contract bytecode
//!
//! Linking operates on the artifact's hex text rather than decoded bytes: an
//! unlinked artifact carries textual placeholders where library addresses
//! belong, so the bytecode is not valid hex until linking completes. Offsets
//! in the link-reference table are byte offsets into the raw bytecode body,
//! mapped here to hex columns past the `0x` prefix.

use std::collections::BTreeMap;

use alloy_primitives::Address;

use crate::{
    artifacts::LinkReferences,
    constants::{
        HEX_PREFIX, LINK_PLACEHOLDER_LEN, LINK_PLACEHOLDER_PREFIX, LINK_PLACEHOLDER_SUFFIX,
        NUM_BYTES_ADDRESS,
    },
    errors::ScriptError,
};

/// Substitute resolved library addresses into `bytecode` at the positions the
/// link-reference table declares.
///
/// Every occurrence is written at coordinates computed against the original
/// bytecode; a substitution is exactly as long as the placeholder it
/// replaces, so occurrences never shift one another and the result is the
/// same whatever order the table is traversed in. The function holds no
/// state: identical inputs produce identical output.
pub fn link_bytecode(
    bytecode: &str,
    link_references: &LinkReferences,
    libraries: &BTreeMap<String, Address>,
) -> Result<String, ScriptError> {
    let body_offset = if bytecode.starts_with(HEX_PREFIX) {
        HEX_PREFIX.len()
    } else {
        0
    };

    let mut linked = bytecode.as_bytes().to_vec();
    for (source_file, libs) in link_references {
        for (lib_name, occurrences) in libs {
            let qualified = format!("{source_file}:{lib_name}");
            let address = libraries
                .get(&qualified)
                .ok_or_else(|| ScriptError::UnresolvedLibrary(qualified.clone()))?;
            let encoded = hex::encode(address);

            for occurrence in occurrences {
                if occurrence.length != NUM_BYTES_ADDRESS {
                    return Err(ScriptError::LinkLengthMismatch(format!(
                        "{qualified}: occurrence at byte {} declares {} bytes, expected {}",
                        occurrence.start, occurrence.length, NUM_BYTES_ADDRESS
                    )));
                }

                let start = body_offset + occurrence.start * 2;
                let end = start + occurrence.length * 2;
                if end > linked.len() {
                    return Err(ScriptError::LinkLengthMismatch(format!(
                        "{qualified}: occurrence at byte {} runs past the end of the bytecode",
                        occurrence.start
                    )));
                }

                linked[start..end].copy_from_slice(encoded.as_bytes());
            }
        }
    }

    // Substitutions are ASCII-for-ASCII at fixed positions, so the buffer
    // remains valid UTF-8
    Ok(String::from_utf8(linked).expect("linked bytecode is ASCII"))
}

/// Substitute a library address into every textual `__$...$__` placeholder.
///
/// This is the deprecated path for artifacts predating link-reference
/// metadata: there is no offset or length validation, and a single library
/// address is written into every placeholder found. Artifacts with an offset
/// table never take this path.
pub fn link_bytecode_legacy(bytecode: &str, library: Address) -> String {
    let encoded = hex::encode(library);
    let bytes = bytecode.as_bytes();

    let mut linked = String::with_capacity(bytecode.len());
    let mut i = 0;
    while i < bytes.len() {
        if placeholder_at(bytes, i) {
            linked.push_str(&encoded);
            i += LINK_PLACEHOLDER_LEN;
        } else {
            linked.push(bytes[i] as char);
            i += 1;
        }
    }

    linked
}

/// Whether unlinked bytecode still contains a textual library placeholder
pub fn contains_placeholder(bytecode: &str) -> bool {
    bytecode.contains(LINK_PLACEHOLDER_PREFIX)
}

/// Whether a full placeholder token begins at byte `i`
fn placeholder_at(bytes: &[u8], i: usize) -> bool {
    let prefix = LINK_PLACEHOLDER_PREFIX.as_bytes();
    let suffix = LINK_PLACEHOLDER_SUFFIX.as_bytes();
    i + LINK_PLACEHOLDER_LEN <= bytes.len()
        && bytes[i..].starts_with(prefix)
        && bytes[i + LINK_PLACEHOLDER_LEN - suffix.len()..].starts_with(suffix)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use alloy_primitives::Address;

    use super::{contains_placeholder, link_bytecode, link_bytecode_legacy};
    use crate::{
        artifacts::{LinkOffset, LinkReferences},
        constants::BABYJUBJUB_QUALIFIED_NAME,
        errors::ScriptError,
    };

    /// A link-reference table with the given occurrences of the BabyJubJub library
    fn babyjubjub_refs(occurrences: Vec<LinkOffset>) -> LinkReferences {
        let mut libs = BTreeMap::new();
        libs.insert("BabyJubJub".to_string(), occurrences);
        let mut refs = BTreeMap::new();
        refs.insert("contracts/libraries/BabyJubJub.sol".to_string(), libs);
        refs
    }

    /// A library address map resolving BabyJubJub to `address`
    fn libraries(address: Address) -> BTreeMap<String, Address> {
        let mut map = BTreeMap::new();
        map.insert(BABYJUBJUB_QUALIFIED_NAME.to_string(), address);
        map
    }

    #[test]
    fn test_substitutes_at_declared_offset() {
        // A 200-byte blob with one 20-byte occurrence at byte 50
        let bytecode = format!("0x{}", "ab".repeat(200));
        let refs = babyjubjub_refs(vec![LinkOffset {
            start: 50,
            length: 20,
        }]);
        let address = Address::repeat_byte(0xaa);

        let linked = link_bytecode(&bytecode, &refs, &libraries(address)).unwrap();

        let expected = format!("0x{}{}{}", "ab".repeat(50), "aa".repeat(20), "ab".repeat(130));
        assert_eq!(linked, expected);
        assert_eq!(linked.len(), bytecode.len());
    }

    #[test]
    fn test_linking_is_idempotent() {
        let bytecode = format!("0x{}", "cd".repeat(100));
        let refs = babyjubjub_refs(vec![LinkOffset {
            start: 10,
            length: 20,
        }]);
        let libs = libraries(Address::repeat_byte(0x42));

        let once = link_bytecode(&bytecode, &refs, &libs).unwrap();
        let twice = link_bytecode(&once, &refs, &libs).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_substitution_order_is_irrelevant() {
        // Two non-overlapping references applied one at a time, in both
        // orders; offsets always address the original bytecode coordinates
        let bytecode = format!("0x{}", "ee".repeat(120));
        let first = babyjubjub_refs(vec![LinkOffset {
            start: 0,
            length: 20,
        }]);
        let mut second = BTreeMap::new();
        let mut libs = BTreeMap::new();
        libs.insert(
            "Poseidon".to_string(),
            vec![LinkOffset {
                start: 60,
                length: 20,
            }],
        );
        second.insert("contracts/libraries/Poseidon.sol".to_string(), libs);

        let mut addresses = libraries(Address::repeat_byte(0x11));
        addresses.insert(
            "contracts/libraries/Poseidon.sol:Poseidon".to_string(),
            Address::repeat_byte(0x22),
        );

        let first_then_second = link_bytecode(
            &link_bytecode(&bytecode, &first, &addresses).unwrap(),
            &second,
            &addresses,
        )
        .unwrap();
        let second_then_first = link_bytecode(
            &link_bytecode(&bytecode, &second, &addresses).unwrap(),
            &first,
            &addresses,
        )
        .unwrap();

        assert_eq!(first_then_second, second_then_first);
    }

    #[test]
    fn test_unresolved_library_is_rejected() {
        let bytecode = format!("0x{}", "ab".repeat(40));
        let refs = babyjubjub_refs(vec![LinkOffset {
            start: 0,
            length: 20,
        }]);

        let err = link_bytecode(&bytecode, &refs, &BTreeMap::new()).unwrap_err();
        assert!(
            matches!(err, ScriptError::UnresolvedLibrary(ref s) if s == BABYJUBJUB_QUALIFIED_NAME)
        );
    }

    #[test]
    fn test_rejects_occurrence_of_wrong_length() {
        let bytecode = format!("0x{}", "ab".repeat(40));
        let refs = babyjubjub_refs(vec![LinkOffset {
            start: 0,
            length: 19,
        }]);

        let err = link_bytecode(&bytecode, &refs, &libraries(Address::ZERO)).unwrap_err();
        assert!(matches!(err, ScriptError::LinkLengthMismatch(_)));
    }

    #[test]
    fn test_rejects_occurrence_past_end_of_bytecode() {
        let bytecode = format!("0x{}", "ab".repeat(30));
        let refs = babyjubjub_refs(vec![LinkOffset {
            start: 20,
            length: 20,
        }]);

        let err = link_bytecode(&bytecode, &refs, &libraries(Address::ZERO)).unwrap_err();
        assert!(matches!(err, ScriptError::LinkLengthMismatch(_)));
    }

    #[test]
    fn test_legacy_placeholder_substitution() {
        let placeholder = "__$3599097dbd61087c0ceb2349e224575c52$__";
        let bytecode = format!("0x6001{placeholder}6002");
        assert!(contains_placeholder(&bytecode));

        let address = Address::repeat_byte(0xbe);
        let linked = link_bytecode_legacy(&bytecode, address);

        assert_eq!(linked, format!("0x6001{}6002", "be".repeat(20)));
        assert_eq!(linked.len(), bytecode.len());
        assert!(!contains_placeholder(&linked));
    }
}
