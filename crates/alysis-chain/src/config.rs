//! Chain construction parameters.

use alysis_primitives::U256;

/// Parameters a [`LocalChain`](crate::LocalChain) is created with.
///
/// Plain data; the chain is constructed programmatically and there is no file
/// or environment configuration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// EIP-155 chain id embedded in typed transactions and reported by
    /// `eth_chainId`.
    pub chain_id: u64,
    /// Balance the root account is funded with in the genesis state.
    pub root_balance_wei: U256,
    /// Genesis block timestamp. `None` takes the wall clock at construction.
    pub genesis_timestamp: Option<u64>,
    /// Gas limit of every block, genesis included.
    pub gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            // 100 ETH.
            root_balance_wei: U256::exp10(20),
            genesis_timestamp: None,
            // Mainnet gas limit at the London fork block.
            gas_limit: 30_029_122,
        }
    }
}
