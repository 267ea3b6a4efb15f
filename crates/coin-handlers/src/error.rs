use chain_btc::error::BtcError;
use chain_eth::error::EthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{code} does not support {operation}")]
    Unsupported {
        code: String,
        operation: &'static str,
    },

    #[error("Unknown coin: {0}")]
    UnknownCoin(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl HandlerError {
    /// Whether the failure came from talking to a chain backend.
    pub fn is_network(&self) -> bool {
        matches!(self, HandlerError::Network(_))
    }
}

impl From<BtcError> for HandlerError {
    fn from(e: BtcError) -> Self {
        match e {
            BtcError::InvalidPrivateKey(m) => HandlerError::InvalidKey(m),
            BtcError::InvalidAddress(m) => HandlerError::InvalidAddress(m),
            BtcError::Api(m) | BtcError::Decode(m) => HandlerError::Network(m),
            other => HandlerError::TransactionFailed(other.to_string()),
        }
    }
}

impl From<EthError> for HandlerError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::InvalidPrivateKey(m) => HandlerError::InvalidKey(m),
            EthError::InvalidAddress(m) => HandlerError::InvalidAddress(m),
            EthError::Rpc(m) => HandlerError::Network(m),
            other => HandlerError::TransactionFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_failures_are_network_errors() {
        let err: HandlerError = BtcError::Api("503 Service Unavailable".into()).into();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "Network error: 503 Service Unavailable");

        let err: HandlerError = EthError::Rpc("connection refused".into()).into();
        assert!(err.is_network());
    }

    #[test]
    fn address_errors_keep_their_category() {
        let err: HandlerError = BtcError::InvalidAddress("bad checksum".into()).into();
        assert!(matches!(err, HandlerError::InvalidAddress(_)));
        assert!(!err.is_network());
    }

    #[test]
    fn build_errors_become_transaction_failures() {
        let err: HandlerError = BtcError::TransactionBuildError("insufficient funds".into()).into();
        assert_eq!(
            err.to_string(),
            "Transaction failed: transaction build error: insufficient funds"
        );
    }

    #[test]
    fn unsupported_names_the_coin() {
        let err = HandlerError::Unsupported {
            code: "BCH".into(),
            operation: "send_payment",
        };
        assert_eq!(err.to_string(), "BCH does not support send_payment");
    }
}
