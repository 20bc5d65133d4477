//! Deterministic derivation of the address a deployment transaction creates

use alloy_primitives::Address;

/// Compute the address a contract created by `sender` at the given account
/// nonce will live at.
///
/// This is the CREATE rule: the low 20 bytes of
/// `keccak256(rlp([sender, nonce]))`. It depends only on its inputs, so a
/// dry run can report where a deployment would land without broadcasting it.
pub fn contract_address(sender: Address, nonce: u64) -> Address {
    sender.create(nonce)
}
