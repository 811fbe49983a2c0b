use ethereum_types::{Address, U256};

/// The slice of block-header state the core needs. Sourced externally by the
/// enclosing executor; this core never looks up a header itself beyond the
/// single BLOCKHASH lookup routed through the state manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    pub number: U256,
    pub coinbase: Address,
    pub timestamp: U256,
    pub difficulty: U256,
    pub gas_limit: U256,
}

impl BlockContext {
    pub fn genesis() -> Self {
        BlockContext {
            number: U256::zero(),
            coinbase: Address::zero(),
            timestamp: U256::zero(),
            difficulty: U256::zero(),
            gas_limit: U256::from(30_000_000u64),
        }
    }
}
