use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::U256;

fn to_usize(v: U256) -> Result<usize, EvmError> {
    if v.bits() > 64 {
        return Err(EvmError::OutOfGas);
    }
    Ok(v.low_u64() as usize)
}

pub fn op_mload(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let offset = to_usize(frame.stack.pop()?)?;
    frame
        .memory
        .charge_expansion(offset, 32, &mut frame.gas, fee)?;
    let bytes = frame.memory.read(offset, 32);
    frame.stack.push(U256::from_big_endian(&bytes))
}

pub fn op_mstore(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let offset = to_usize(frame.stack.pop()?)?;
    let value = frame.stack.pop()?;
    frame
        .memory
        .charge_expansion(offset, 32, &mut frame.gas, fee)?;
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    frame.memory.write(offset, &bytes);
    Ok(())
}

pub fn op_mstore8(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let offset = to_usize(frame.stack.pop()?)?;
    let value = frame.stack.pop()?;
    frame
        .memory
        .charge_expansion(offset, 1, &mut frame.gas, fee)?;
    frame.memory.write_byte(offset, value.low_u32() as u8);
    Ok(())
}

pub fn op_msize(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(U256::from(frame.memory.size()))
}

pub(crate) use to_usize as word_to_usize;
