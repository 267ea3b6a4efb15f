use thiserror::Error;

/// Bitcoin-family chain operation errors.
#[derive(Debug, Error)]
pub enum BtcError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("chain api error: {0}")]
    Api(String),

    #[error("failed to decode api response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let cases = [
            (BtcError::InvalidPrivateKey("bad wif checksum".into()), "invalid private key: bad wif checksum"),
            (BtcError::InvalidAddress("wrong network".into()), "invalid address: wrong network"),
            (BtcError::Api("429 Too Many Requests".into()), "chain api error: 429 Too Many Requests"),
            (
                BtcError::Decode("missing field `balance`".into()),
                "failed to decode api response: missing field `balance`",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn boxes_as_std_error() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            Box::new(BtcError::TransactionBuildError("no UTXOs available".into()));
        assert_eq!(err.to_string(), "transaction build error: no UTXOs available");
    }
}
