use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::opcodes::memory_ops::word_to_usize;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::U256;
use sha3::{Digest, Keccak256};

pub fn op_sha3(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let offset = word_to_usize(frame.stack.pop()?)?;
    let length = word_to_usize(frame.stack.pop()?)?;
    frame
        .memory
        .charge_expansion(offset, length, &mut frame.gas, fee)?;
    let words = ((length + 31) / 32) as u64;
    frame.gas.deduct(words * fee.sha3_word)?;
    let data = frame.memory.read(offset, length);
    let digest = Keccak256::digest(&data);
    frame.stack.push(U256::from_big_endian(&digest))
}
