//! Constants used in the deploy scripts

/// The number of bytes in an EVM address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The number of hex characters in an encoded EVM address
pub const NUM_HEX_CHARS_ADDRESS: usize = NUM_BYTES_ADDRESS * 2;

/// The prefix of hex-encoded bytecode in a compilation artifact
pub const HEX_PREFIX: &str = "0x";

/// The root of the Hardhat compilation output, relative to the working directory
pub const ARTIFACTS_BASE_PATH: &str = "artifacts/contracts";

/// The subdirectory of the artifact tree holding the production verifier artifacts
pub const VERIFIER_ARTIFACTS_SEGMENT: &str = "prod";

/// The subdirectory of the artifact tree holding the library artifacts
pub const LIBRARY_ARTIFACTS_SEGMENT: &str = "libraries";

/// The default path of the deploy configuration file
pub const DEFAULT_CONFIG_PATH: &str = "eerc.config.json";

/// The default path the deployment record is written to
pub const DEFAULT_DEPLOYMENT_OUTPUT_PATH: &str = "deployment.json";

/// The default RPC endpoint, pointing at a local devnet
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default token name
pub const DEFAULT_TOKEN_NAME: &str = "Encrypted Token";

/// The default token symbol
pub const DEFAULT_TOKEN_SYMBOL: &str = "EERC";

/// The default number of token decimals
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// The fully qualified name of the BabyJubJub library, as it appears in
/// artifact link-reference tables
pub const BABYJUBJUB_QUALIFIED_NAME: &str = "contracts/libraries/BabyJubJub.sol:BabyJubJub";

/// The prefix of a textual library placeholder in unlinked bytecode
pub const LINK_PLACEHOLDER_PREFIX: &str = "__$";

/// The suffix of a textual library placeholder in unlinked bytecode
pub const LINK_PLACEHOLDER_SUFFIX: &str = "$__";

/// The number of hex characters a library placeholder occupies, equal to an
/// encoded address so that linking never shifts bytecode offsets
pub const LINK_PLACEHOLDER_LEN: usize = NUM_HEX_CHARS_ADDRESS;

/// The name of the environment variable the deployer private key may be read from
pub const PRIV_KEY_ENV_VAR: &str = "DEPLOYER_PRIV_KEY";
