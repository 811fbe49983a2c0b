use crate::block::BlockContext;
use crate::error::EvmError;
use crate::log::LogEntry;
use bytes::Bytes;
use ethereum_types::{Address, U256};
use std::collections::HashMap;

/// Everything needed to run a child frame, assembled by the call orchestrator
/// (§4.7) and handed to the child-frame runner. `is_create` distinguishes a
/// CREATE child (whose `code` is init code, not runtime code) from the rest.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub code: Bytes,
    pub caller: Address,
    pub origin: Address,
    pub address: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub data: Bytes,
    pub block: BlockContext,
    pub depth: u32,
    pub delegatecall: bool,
    pub selfdestruct_set: HashMap<Address, Address>,
    pub compiled: bool,
    pub populate_cache: bool,
    pub is_create: bool,
}

/// What the child reports back to the orchestrator on completion.
#[derive(Debug, Clone, Default)]
pub struct ChildResult {
    pub gas_used: u64,
    pub return_bytes: Bytes,
    pub logs: Vec<LogEntry>,
    pub gas_refund: u64,
    pub created_address: Option<Address>,
    pub exception: Option<EvmError>,
}

/// Executes a constructed call configuration. The bytecode fetch/decode and
/// any cross-call compilation cache this depends on (`compiled`) live on the
/// implementor's side, not in this core.
pub trait ChildFrameRunner {
    fn run(&self, config: CallConfig) -> ChildResult;
}
