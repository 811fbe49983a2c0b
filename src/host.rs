//! A reference, in-process implementation of the two external collaborators
//! (§6): an in-memory `StateManager` and a `ChildFrameRunner` that executes
//! child frames synchronously against the same shared store. Recursion
//! between the two goes through `Rc<RefCell<..>>`, the standard pattern for
//! a single-threaded recursive interpreter that needs shared mutable state
//! without plumbing it through every call explicitly.

use crate::block::BlockContext;
use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::{Frame, FrameInit};
use crate::runner::{CallConfig, ChildFrameRunner, ChildResult};
use crate::state::{AccountInfo, StateManager};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
struct AccountData {
    balance: U256,
    nonce: U256,
    code: Bytes,
    storage: HashMap<H256, H256>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    accounts: HashMap<Address, AccountData>,
    block_hashes: HashMap<U256, H256>,
}

#[derive(Clone, Default)]
struct SharedState(Rc<RefCell<InMemoryState>>);

/// The external `StateManager`, backed by a plain hash map rather than a
/// Merkle-Patricia trie; persistence and commitments are out of scope here.
#[derive(Clone, Default)]
pub struct InMemoryStateManager {
    shared: SharedState,
}

impl InMemoryStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund(&self, address: Address, balance: U256) {
        let mut state = self.shared.0.borrow_mut();
        state.accounts.entry(address).or_default().balance = balance;
    }

    pub fn set_block_hash(&self, number: U256, hash: H256) {
        self.shared.0.borrow_mut().block_hashes.insert(number, hash);
    }

    fn child_runner(&self) -> SequentialChildRunner {
        SequentialChildRunner {
            shared: self.shared.clone(),
        }
    }

    /// Convenience entry point for a top-level (depth-0) call: runs it to
    /// completion against this store and returns the same shape a child call
    /// would produce, so integration tests can drive the core end to end
    /// without hand-rolling a `ChildFrameRunner`.
    pub fn execute_top_level(&self, config: CallConfig) -> ChildResult {
        self.child_runner().run(config)
    }
}

impl StateManager for InMemoryStateManager {
    fn get_account(&self, address: Address) -> AccountInfo {
        let state = self.shared.0.borrow();
        match state.accounts.get(&address) {
            Some(acc) => AccountInfo {
                balance: acc.balance,
                nonce: acc.nonce,
                exists: true,
            },
            None => AccountInfo::default(),
        }
    }

    fn get_account_balance(&self, address: Address) -> U256 {
        self.shared
            .0
            .borrow()
            .accounts
            .get(&address)
            .map(|a| a.balance)
            .unwrap_or_default()
    }

    fn put_account_balance(&mut self, address: Address, balance: U256) {
        self.shared
            .0
            .borrow_mut()
            .accounts
            .entry(address)
            .or_default()
            .balance = balance;
    }

    fn get_nonce(&self, address: Address) -> U256 {
        self.shared
            .0
            .borrow()
            .accounts
            .get(&address)
            .map(|a| a.nonce)
            .unwrap_or_default()
    }

    fn set_nonce(&mut self, address: Address, nonce: U256) {
        self.shared
            .0
            .borrow_mut()
            .accounts
            .entry(address)
            .or_default()
            .nonce = nonce;
    }

    fn get_contract_code(&self, address: Address) -> (Bytes, bool) {
        let code = self
            .shared
            .0
            .borrow()
            .accounts
            .get(&address)
            .map(|a| a.code.clone())
            .unwrap_or_default();
        (code, false)
    }

    fn set_code(&mut self, address: Address, code: Bytes) {
        self.shared
            .0
            .borrow_mut()
            .accounts
            .entry(address)
            .or_default()
            .code = code;
    }

    fn get_contract_storage(&self, address: Address, key: H256) -> H256 {
        self.shared
            .0
            .borrow()
            .accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key).copied())
            .unwrap_or_default()
    }

    fn put_contract_storage(&mut self, address: Address, key: H256, value: H256) {
        self.shared
            .0
            .borrow_mut()
            .accounts
            .entry(address)
            .or_default()
            .storage
            .insert(key, value);
    }

    fn account_is_empty(&self, address: Address) -> bool {
        match self.shared.0.borrow().accounts.get(&address) {
            None => true,
            Some(acc) => acc.balance.is_zero() && acc.nonce.is_zero() && acc.code.is_empty(),
        }
    }

    fn exists(&self, address: Address) -> bool {
        self.shared.0.borrow().accounts.contains_key(&address)
    }

    fn get_block_hash(&self, number: U256) -> H256 {
        self.shared
            .0
            .borrow()
            .block_hashes
            .get(&number)
            .copied()
            .unwrap_or_default()
    }

    fn cache_get(&self, address: Address) -> Option<AccountInfo> {
        Some(self.get_account(address))
    }

    fn cache_put(&mut self, address: Address, info: AccountInfo) {
        let mut state = self.shared.0.borrow_mut();
        let entry = state.accounts.entry(address).or_default();
        entry.balance = info.balance;
        entry.nonce = info.nonce;
    }
}

/// Derives a CREATE address from `(sender, nonce)` the same way the yellow
/// paper does: the low 20 bytes of `keccak256(rlp([sender, nonce]))`. The
/// core itself never computes this; it hands the sender/nonce pair down by
/// reusing the call config's `address` field and `is_create` flag, leaving
/// derivation to this external collaborator (§4.7).
fn compute_create_address(sender: Address, nonce: U256) -> Address {
    // RLP integers drop leading zero bytes, and zero itself encodes as the
    // empty string.
    let nonce_bytes = if nonce.is_zero() {
        Vec::new()
    } else {
        let mut buf = [0u8; 32];
        nonce.to_big_endian(&mut buf);
        let first_nonzero = buf.iter().position(|&b| b != 0).unwrap();
        buf[first_nonzero..].to_vec()
    };
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender.as_bytes());
    stream.append(&nonce_bytes);
    let hash = Keccak256::digest(stream.out());
    Address::from_slice(&hash[12..])
}

/// The external `ChildFrameRunner`: executes a constructed call configuration
/// by running a fresh `Frame` against the same shared store, recursing back
/// into the opcode dispatcher for nested calls.
pub struct SequentialChildRunner {
    shared: SharedState,
}

impl SequentialChildRunner {
    pub fn new(state: &InMemoryStateManager) -> Self {
        SequentialChildRunner {
            shared: state.shared.clone(),
        }
    }
}

impl ChildFrameRunner for SequentialChildRunner {
    fn run(&self, config: CallConfig) -> ChildResult {
        let execution_address = if config.is_create {
            let sender = config.address;
            let nonce = {
                let state = self.shared.0.borrow();
                state
                    .accounts
                    .get(&sender)
                    .map(|a| a.nonce)
                    .unwrap_or_default()
            };
            // op_create already incremented the sender's nonce before
            // dispatching, so the address is derived from the pre-increment
            // value.
            compute_create_address(sender, nonce.saturating_sub(U256::one()))
        } else {
            config.address
        };

        // CALL/CALLCODE/CREATE move `config.value` from the caller to the
        // callee/new contract; DELEGATECALL never transfers value, since it
        // inherits call_value from an ancestor frame rather than sending its
        // own. The caller's balance already cleared the depth/balance guard
        // in call_ops.rs before this runs, so the debit cannot go negative.
        if !config.delegatecall && !config.value.is_zero() {
            let mut state = self.shared.0.borrow_mut();
            let caller_balance = state.accounts.entry(config.caller).or_default().balance;
            state.accounts.entry(config.caller).or_default().balance = caller_balance - config.value;
            let callee_balance = state.accounts.entry(execution_address).or_default().balance;
            state.accounts.entry(execution_address).or_default().balance =
                callee_balance + config.value;
        }

        let contract = {
            let state = self.shared.0.borrow();
            match state.accounts.get(&execution_address) {
                Some(acc) => AccountInfo {
                    balance: acc.balance,
                    nonce: acc.nonce,
                    exists: true,
                },
                None => AccountInfo::default(),
            }
        };

        let init = FrameInit {
            code: config.code.clone(),
            gas_limit: config.gas_limit,
            address: execution_address,
            caller: config.caller,
            origin: config.origin,
            call_value: config.value,
            gas_price: config.gas_price,
            call_data: config.data.clone(),
            contract,
            block: config.block.clone(),
            depth: config.depth,
            delegatecall: config.delegatecall,
            selfdestruct_set: config.selfdestruct_set.clone(),
        };
        let mut frame = Frame::new(init);
        let gas_before = frame.gas.gas_left();
        let mut state_manager = InMemoryStateManager {
            shared: self.shared.clone(),
        };
        let fee = FeeSchedule::default();

        let outcome: Result<(), EvmError> =
            crate::opcodes::run(&mut frame, &mut state_manager, self, &fee);

        match outcome {
            Ok(()) => {
                if config.is_create {
                    state_manager.set_code(execution_address, frame.return_value.clone());
                }
                let gas_used = gas_before.saturating_sub(frame.gas.gas_left());
                ChildResult {
                    gas_used,
                    return_bytes: frame.return_value,
                    logs: frame.logs,
                    gas_refund: frame.gas.gas_refund(),
                    created_address: if config.is_create {
                        Some(execution_address)
                    } else {
                        None
                    },
                    exception: None,
                }
            }
            Err(error) => ChildResult {
                // A trap consumes whatever was forwarded to it; only the
                // caller's already-spent gas (memory bills, surcharges) is
                // distinct from this.
                gas_used: gas_before,
                return_bytes: Bytes::new(),
                logs: Vec::new(),
                gas_refund: 0,
                created_address: None,
                exception: Some(error),
            },
        }
    }
}

pub fn top_level_block_context() -> BlockContext {
    BlockContext::genesis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CallConfig;
    use std::collections::HashMap as Map;

    #[test]
    fn simple_add_and_return() {
        // PUSH1 1 PUSH1 2 ADD PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
        let code = vec![
            0x60, 0x01, 0x60, 0x02, 0x01, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
        ];
        let state = InMemoryStateManager::new();
        let sender = Address::from_low_u64_be(1);
        let target = Address::from_low_u64_be(2);
        state.fund(sender, U256::from(1_000_000u64));
        {
            let mut sm: Box<dyn StateManager> = Box::new(state.clone());
            sm.set_code(target, Bytes::from(code));
        }

        let config = CallConfig {
            code: Bytes::new(),
            caller: sender,
            origin: sender,
            address: target,
            value: U256::zero(),
            gas_limit: 100_000,
            gas_price: U256::one(),
            data: Bytes::new(),
            block: BlockContext::genesis(),
            depth: 0,
            delegatecall: false,
            selfdestruct_set: Map::new(),
            compiled: false,
            populate_cache: false,
            is_create: false,
        };
        let mut config = config;
        let (code, _) = state.get_contract_code(target);
        config.code = code;

        let result = state.execute_top_level(config);
        assert!(result.exception.is_none());
        let mut expected = vec![0u8; 32];
        expected[31] = 3;
        assert_eq!(result.return_bytes.as_ref(), expected.as_slice());
    }
}
