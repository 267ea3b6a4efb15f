mod erc20;
mod evm;
mod utxo;

pub use erc20::Erc20Handler;
pub use evm::EvmHandler;
pub use utxo::UtxoHandler;
