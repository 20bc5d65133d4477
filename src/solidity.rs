//! Definitions of the Solidity constructors invoked during deployment

use alloy_sol_types::sol;

sol! {
    /// Constructor parameters of the EncryptedERC contract
    struct CreateEncryptedERCParams {
        address registrar;
        address mintVerifier;
        address withdrawVerifier;
        address transferVerifier;
        string name;
        string symbol;
        uint8 decimals;
        bool isConverter;
    }

    contract Registrar {
        constructor(address registrationVerifier);
    }

    contract EncryptedERC {
        constructor(CreateEncryptedERCParams params);
    }
}
