use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::opcodes::codes;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::U256;

pub fn op_pop(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.pop()?;
    Ok(())
}

/// Handles PUSH1..PUSH32: `opcode - PUSH1 + 1` bytes of immediate code follow,
/// zero-padded if code runs out before the full width is read.
pub fn op_push(
    opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let width = (opcode - codes::PUSH1 + 1) as usize;
    let mut bytes = [0u8; 32];
    let start = frame.pc;
    let end = (start + width).min(frame.code.len());
    if end > start {
        let available = &frame.code[start..end];
        bytes[32 - width..32 - width + available.len()].copy_from_slice(available);
    }
    frame.pc += width;
    frame.stack.push(U256::from_big_endian(&bytes))
}

pub fn op_dup(
    opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let n = (opcode - codes::DUP1 + 1) as usize;
    frame.stack.dup(n)
}

pub fn op_swap(
    opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let n = (opcode - codes::SWAP1 + 1) as usize;
    frame.stack.swap(n)
}
