use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::opcodes::memory_ops::word_to_usize;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::U256;

pub fn op_address(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(address_to_word(frame.address))
}

pub fn op_balance(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let addr = word_to_address(frame.stack.pop()?);
    let balance = if addr == frame.address {
        frame.contract.balance
    } else {
        state.get_account_balance(addr)
    };
    frame.stack.push(balance)
}

pub fn op_origin(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(address_to_word(frame.origin))
}

pub fn op_caller(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(address_to_word(frame.caller))
}

pub fn op_callvalue(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(frame.call_value)
}

pub fn op_calldataload(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let offset = word_to_usize(frame.stack.pop()?)?;
    frame.stack.push(U256::from_big_endian(&read_padded(
        &frame.call_data,
        offset,
        32,
    )))
}

pub fn op_calldatasize(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(U256::from(frame.call_data.len()))
}

pub fn op_calldatacopy(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let dest_offset = word_to_usize(frame.stack.pop()?)?;
    let src_offset = word_to_usize(frame.stack.pop()?)?;
    let length = word_to_usize(frame.stack.pop()?)?;
    frame
        .memory
        .charge_expansion(dest_offset, length, &mut frame.gas, fee)?;
    frame.gas.deduct(copy_words(length) * fee.copy_word)?;
    let data = read_padded(&frame.call_data, src_offset, length);
    frame.memory.write(dest_offset, &data);
    Ok(())
}

pub fn op_codesize(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(U256::from(frame.code.len()))
}

pub fn op_codecopy(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let dest_offset = word_to_usize(frame.stack.pop()?)?;
    let src_offset = word_to_usize(frame.stack.pop()?)?;
    let length = word_to_usize(frame.stack.pop()?)?;
    frame
        .memory
        .charge_expansion(dest_offset, length, &mut frame.gas, fee)?;
    frame.gas.deduct(copy_words(length) * fee.copy_word)?;
    let code = frame.code.clone();
    let data = read_padded(&code, src_offset, length);
    frame.memory.write(dest_offset, &data);
    Ok(())
}

pub fn op_gasprice(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    frame.stack.push(frame.gas_price)
}

pub fn op_extcodesize(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let addr = word_to_address(frame.stack.pop()?);
    let (code, _compiled) = state.get_contract_code(addr);
    frame.stack.push(U256::from(code.len()))
}

pub fn op_extcodecopy(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let addr = word_to_address(frame.stack.pop()?);
    let dest_offset = word_to_usize(frame.stack.pop()?)?;
    let src_offset = word_to_usize(frame.stack.pop()?)?;
    let length = word_to_usize(frame.stack.pop()?)?;
    frame
        .memory
        .charge_expansion(dest_offset, length, &mut frame.gas, fee)?;
    frame.gas.deduct(copy_words(length) * fee.copy_word)?;
    let (code, _compiled) = state.get_contract_code(addr);
    let data = read_padded(&code, src_offset, length);
    frame.memory.write(dest_offset, &data);
    Ok(())
}

fn copy_words(length: usize) -> u64 {
    ((length + 31) / 32) as u64
}

fn read_padded(source: &[u8], offset: usize, length: usize) -> Vec<u8> {
    let mut out = vec![0u8; length];
    if offset >= source.len() {
        return out;
    }
    let end = (offset + length).min(source.len());
    out[..end - offset].copy_from_slice(&source[offset..end]);
    out
}

pub fn address_to_word(addr: ethereum_types::Address) -> U256 {
    U256::from_big_endian(addr.as_bytes())
}

pub fn word_to_address(v: U256) -> ethereum_types::Address {
    let mut bytes = [0u8; 32];
    v.to_big_endian(&mut bytes);
    ethereum_types::Address::from_slice(&bytes[12..])
}
