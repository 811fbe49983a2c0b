use crate::block::BlockContext;
use crate::gas::GasMeter;
use crate::log::LogEntry;
use crate::memory::Memory;
use crate::stack::Stack;
use crate::state::AccountInfo;
use bytes::Bytes;
use ethereum_types::{Address, U256};
use std::collections::{HashMap, HashSet};

const OP_PUSH1: u8 = 0x60;
const OP_PUSH32: u8 = 0x7f;
const OP_JUMPDEST: u8 = 0x5b;

/// Byte offsets of JUMPDEST opcodes that are not inside a PUSH immediate,
/// the only targets JUMP/JUMPI may land on.
pub fn compute_valid_jumps(code: &[u8]) -> HashSet<usize> {
    let mut jumps = HashSet::new();
    let mut i = 0;
    while i < code.len() {
        let op = code[i];
        if op == OP_JUMPDEST {
            jumps.insert(i);
            i += 1;
        } else if (OP_PUSH1..=OP_PUSH32).contains(&op) {
            let n = (op - OP_PUSH1 + 1) as usize;
            i += 1 + n;
        } else {
            i += 1;
        }
    }
    jumps
}

/// Parameters that seed a new frame, whether from the top-level executor or
/// from the call orchestrator constructing a child.
pub struct FrameInit {
    pub code: Bytes,
    pub gas_limit: u64,
    pub address: Address,
    pub caller: Address,
    pub origin: Address,
    pub call_value: U256,
    pub gas_price: U256,
    pub call_data: Bytes,
    pub contract: AccountInfo,
    pub block: BlockContext,
    pub depth: u32,
    pub delegatecall: bool,
    pub selfdestruct_set: HashMap<Address, Address>,
}

/// One execution context: its own stack, memory, gas, and program counter.
/// Logs, the refund counter, and the selfdestruct registry are folded into
/// the parent frame by the call orchestrator when this frame completes.
pub struct Frame {
    pub code: Bytes,
    pub pc: usize,
    pub stack: Stack,
    pub memory: Memory,
    pub gas: GasMeter,
    pub address: Address,
    pub caller: Address,
    pub origin: Address,
    pub call_value: U256,
    pub gas_price: U256,
    pub call_data: Bytes,
    pub contract: AccountInfo,
    pub block: BlockContext,
    pub logs: Vec<LogEntry>,
    pub selfdestruct_set: HashMap<Address, Address>,
    pub valid_jumps: HashSet<usize>,
    pub return_value: Bytes,
    pub stopped: bool,
    pub depth: u32,
    pub delegatecall: bool,
}

impl Frame {
    pub fn new(init: FrameInit) -> Self {
        let valid_jumps = compute_valid_jumps(&init.code);
        Frame {
            code: init.code,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            gas: GasMeter::new(init.gas_limit),
            address: init.address,
            caller: init.caller,
            origin: init.origin,
            call_value: init.call_value,
            gas_price: init.gas_price,
            call_data: init.call_data,
            contract: init.contract,
            block: init.block,
            logs: Vec::new(),
            selfdestruct_set: init.selfdestruct_set,
            valid_jumps,
            return_value: Bytes::new(),
            stopped: false,
            depth: init.depth,
            delegatecall: init.delegatecall,
        }
    }

    pub fn is_valid_jump(&self, dest: usize) -> bool {
        self.valid_jumps.contains(&dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jumpdest_inside_push_immediate_is_not_valid() {
        // PUSH1 0x5b: the 0x5b byte here is PUSH data, not a JUMPDEST.
        let code = vec![OP_PUSH1, 0x5b];
        let jumps = compute_valid_jumps(&code);
        assert!(!jumps.contains(&1));
    }

    #[test]
    fn standalone_jumpdest_is_valid() {
        let code = vec![OP_JUMPDEST, 0x00];
        let jumps = compute_valid_jumps(&code);
        assert!(jumps.contains(&0));
    }
}
