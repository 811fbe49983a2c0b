use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::opcodes::memory_ops::word_to_usize;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::U256;

pub fn op_stop(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stopped = true;
    Ok(())
}

pub fn op_jump(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let dest = word_to_usize(frame.stack.pop()?)?;
    if !frame.is_valid_jump(dest) {
        return Err(EvmError::InvalidJump);
    }
    frame.pc = dest;
    Ok(())
}

pub fn op_jumpi(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let dest = word_to_usize(frame.stack.pop()?)?;
    let cond = frame.stack.pop()?;
    if !cond.is_zero() {
        if !frame.is_valid_jump(dest) {
            return Err(EvmError::InvalidJump);
        }
        frame.pc = dest;
    }
    Ok(())
}

pub fn op_pc(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    // pc already advanced past this opcode's single byte.
    frame.stack.push(U256::from(frame.pc - 1))
}

pub fn op_gas(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(U256::from(frame.gas.gas_left()))
}

pub fn op_jumpdest(
    _opcode: u8,
    _frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    Ok(())
}

pub fn op_return(
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
    frame.return_value = frame.memory.read(offset, length).into();
    frame.stopped = true;
    Ok(())
}
