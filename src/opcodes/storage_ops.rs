use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::{H256, U256};

pub fn op_sload(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let key = frame.stack.pop()?;
    let mut key_bytes = [0u8; 32];
    key.to_big_endian(&mut key_bytes);
    let value = state.get_contract_storage(frame.address, H256::from(key_bytes));
    frame.stack.push(U256::from_big_endian(value.as_bytes()))
}

/// Gas and refund follow the four-case Frontier schedule (§4.5): whether the
/// slot held a non-zero value before, and whether it holds one after.
pub fn op_sstore(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let key = frame.stack.pop()?;
    let value = frame.stack.pop()?;

    let mut key_bytes = [0u8; 32];
    key.to_big_endian(&mut key_bytes);
    let key_hash = H256::from(key_bytes);

    let previous = state.get_contract_storage(frame.address, key_hash);
    let was_set = !previous.is_zero();
    let is_set = !value.is_zero();

    let gas_cost = if !was_set && is_set {
        fee.sstore_set
    } else {
        fee.sstore_reset
    };
    frame.gas.deduct(gas_cost)?;
    if was_set && !is_set {
        frame.gas.add_refund(fee.sstore_refund);
    }

    let mut value_bytes = [0u8; 32];
    value.to_big_endian(&mut value_bytes);
    state.put_contract_storage(frame.address, key_hash, H256::from(value_bytes));

    frame.contract = state.get_account(frame.address);
    Ok(())
}
