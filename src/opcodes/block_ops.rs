use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::opcodes::environment::address_to_word;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::U256;

pub fn op_blockhash(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let number = frame.stack.pop()?;
    let current = frame.block.number;
    // Valid for the 256 most recent ancestor blocks; current.number itself
    // and anything further back or in the future reads as zero.
    let in_range = current > number && current - number <= U256::from(256u64);
    let hash = if in_range {
        state.get_block_hash(number)
    } else {
        Default::default()
    };
    frame.stack.push(U256::from_big_endian(hash.as_bytes()))
}

pub fn op_coinbase(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(address_to_word(frame.block.coinbase))
}

pub fn op_timestamp(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(frame.block.timestamp)
}

pub fn op_number(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(frame.block.number)
}

pub fn op_difficulty(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(frame.block.difficulty)
}

pub fn op_gaslimit(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(frame.block.gas_limit)
}
