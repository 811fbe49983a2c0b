use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::opcodes::environment::{address_to_word, word_to_address};
use crate::opcodes::memory_ops::word_to_usize;
use crate::runner::{CallConfig, ChildFrameRunner, ChildResult};
use crate::state::StateManager;
use bytes::Bytes;
use ethereum_types::U256;

const MAX_CALL_DEPTH: u32 = 1024;

/// EIP-150: a call may forward at most `gas_left - gas_left/64`.
fn apply_63_64_rule(gas_left: u64, requested: u64) -> u64 {
    let cap = gas_left - gas_left / 64;
    requested.min(cap)
}

struct Prepared {
    forwarded_gas: u64,
    value: U256,
}

/// Shared billing for every call-class opcode: memory expansion for the
/// input/output ranges, the value-transfer surcharge, the new-account
/// surcharge (CALL only), the 63/64 cap, and the stipend. Returns the gas
/// budget to forward, after all caller-side deductions have landed.
#[allow(clippy::too_many_arguments)]
fn prepare_call(
    frame: &mut Frame,
    state: &mut dyn StateManager,
    fee: &FeeSchedule,
    requested_gas: Option<U256>,
    value: U256,
    target_for_new_account_check: Option<ethereum_types::Address>,
    in_offset: usize,
    in_length: usize,
    out_offset: usize,
    out_length: usize,
) -> Result<Prepared, EvmError> {
    frame
        .memory
        .charge_expansion(in_offset, in_length, &mut frame.gas, fee)?;
    frame
        .memory
        .charge_expansion(out_offset, out_length, &mut frame.gas, fee)?;

    let value_transferred = !value.is_zero();
    if value_transferred {
        frame.gas.deduct(fee.call_value_transfer)?;
    }
    if let Some(target) = target_for_new_account_check {
        if value_transferred && state.account_is_empty(target) {
            frame.gas.deduct(fee.call_new_account)?;
        }
    }

    let requested = match requested_gas {
        Some(v) => {
            if v.bits() > 64 {
                u64::MAX
            } else {
                v.low_u64()
            }
        }
        None => u64::MAX,
    };
    let mut forwarded = apply_63_64_rule(frame.gas.gas_left(), requested);
    if value_transferred {
        frame.gas.credit(fee.call_stipend);
        forwarded += fee.call_stipend;
    }

    Ok(Prepared {
        forwarded_gas: forwarded,
        value,
    })
}

fn depth_or_balance_guard(frame: &Frame, value: U256, is_delegatecall: bool) -> bool {
    if frame.depth + 1 > MAX_CALL_DEPTH {
        return true;
    }
    if !is_delegatecall && frame.contract.balance < value {
        return true;
    }
    false
}

fn merge_child_result(
    frame: &mut Frame,
    state: &mut dyn StateManager,
    result: ChildResult,
    out_offset: usize,
    out_length: usize,
    created_nonce_bumped: bool,
) -> Result<(), EvmError> {
    frame.logs.extend(result.logs);
    frame.gas.add_refund(result.gas_refund);
    frame.gas.deduct(result.gas_used)?;

    match result.exception {
        None => {
            let copy_len = result.return_bytes.len().min(out_length);
            if copy_len > 0 {
                frame.memory.write(out_offset, &result.return_bytes[..copy_len]);
            }
            frame.contract = state.get_account(frame.address);
            let pushed = match result.created_address {
                Some(addr) => address_to_word(addr),
                None => U256::one(),
            };
            frame.stack.push(pushed)
        }
        Some(_) => {
            if created_nonce_bumped {
                let rolled_back = state.get_nonce(frame.address).saturating_sub(U256::one());
                state.set_nonce(frame.address, rolled_back);
            }
            frame.stack.push(U256::zero())
        }
    }
}

pub fn op_call(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let gas_operand = frame.stack.pop()?;
    let target = word_to_address(frame.stack.pop()?);
    let value = frame.stack.pop()?;
    let in_offset = word_to_usize(frame.stack.pop()?)?;
    let in_length = word_to_usize(frame.stack.pop()?)?;
    let out_offset = word_to_usize(frame.stack.pop()?)?;
    let out_length = word_to_usize(frame.stack.pop()?)?;

    let prepared = prepare_call(
        frame,
        state,
        fee,
        Some(gas_operand),
        value,
        Some(target),
        in_offset,
        in_length,
        out_offset,
        out_length,
    )?;

    if depth_or_balance_guard(frame, prepared.value, false) {
        return frame.stack.push(U256::zero());
    }

    state.cache_put(frame.address, frame.contract);
    let (code, compiled) = state.get_contract_code(target);
    let data: Bytes = frame.memory.read(in_offset, in_length).into();

    let config = CallConfig {
        code,
        caller: frame.address,
        origin: frame.origin,
        address: target,
        value: prepared.value,
        gas_limit: prepared.forwarded_gas,
        gas_price: frame.gas_price,
        data,
        block: frame.block.clone(),
        depth: frame.depth + 1,
        delegatecall: false,
        selfdestruct_set: frame.selfdestruct_set.clone(),
        compiled,
        populate_cache: false,
        is_create: false,
    };
    tracing::debug!(
        depth = config.depth,
        address = ?config.address,
        gas_limit = config.gas_limit,
        "CALL"
    );
    let result = runner.run(config);
    merge_child_result(frame, state, result, out_offset, out_length, false)
}

pub fn op_callcode(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let gas_operand = frame.stack.pop()?;
    let target = word_to_address(frame.stack.pop()?);
    let value = frame.stack.pop()?;
    let in_offset = word_to_usize(frame.stack.pop()?)?;
    let in_length = word_to_usize(frame.stack.pop()?)?;
    let out_offset = word_to_usize(frame.stack.pop()?)?;
    let out_length = word_to_usize(frame.stack.pop()?)?;

    let prepared = prepare_call(
        frame,
        state,
        fee,
        Some(gas_operand),
        value,
        None,
        in_offset,
        in_length,
        out_offset,
        out_length,
    )?;

    if depth_or_balance_guard(frame, prepared.value, false) {
        return frame.stack.push(U256::zero());
    }

    state.cache_put(frame.address, frame.contract);
    let (code, compiled) = state.get_contract_code(target);
    let data: Bytes = frame.memory.read(in_offset, in_length).into();

    let config = CallConfig {
        code,
        caller: frame.address,
        origin: frame.origin,
        address: frame.address,
        value: prepared.value,
        gas_limit: prepared.forwarded_gas,
        gas_price: frame.gas_price,
        data,
        block: frame.block.clone(),
        depth: frame.depth + 1,
        delegatecall: false,
        selfdestruct_set: frame.selfdestruct_set.clone(),
        compiled,
        populate_cache: false,
        is_create: false,
    };
    tracing::debug!(
        depth = config.depth,
        address = ?config.address,
        gas_limit = config.gas_limit,
        "CALLCODE"
    );
    let result = runner.run(config);
    merge_child_result(frame, state, result, out_offset, out_length, false)
}

pub fn op_delegatecall(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let gas_operand = frame.stack.pop()?;
    let target = word_to_address(frame.stack.pop()?);
    let in_offset = word_to_usize(frame.stack.pop()?)?;
    let in_length = word_to_usize(frame.stack.pop()?)?;
    let out_offset = word_to_usize(frame.stack.pop()?)?;
    let out_length = word_to_usize(frame.stack.pop()?)?;

    // DELEGATECALL inherits call_value rather than taking an operand, and
    // never transfers value itself, so it never pays the transfer surcharge.
    let prepared = prepare_call(
        frame,
        state,
        fee,
        Some(gas_operand),
        U256::zero(),
        None,
        in_offset,
        in_length,
        out_offset,
        out_length,
    )?;

    if depth_or_balance_guard(frame, U256::zero(), true) {
        return frame.stack.push(U256::zero());
    }

    state.cache_put(frame.address, frame.contract);
    let (code, compiled) = state.get_contract_code(target);
    let data: Bytes = frame.memory.read(in_offset, in_length).into();

    let config = CallConfig {
        code,
        caller: frame.caller,
        origin: frame.origin,
        address: frame.address,
        value: frame.call_value,
        gas_limit: prepared.forwarded_gas,
        gas_price: frame.gas_price,
        data,
        block: frame.block.clone(),
        depth: frame.depth + 1,
        delegatecall: true,
        selfdestruct_set: frame.selfdestruct_set.clone(),
        compiled,
        populate_cache: false,
        is_create: false,
    };
    tracing::debug!(
        depth = config.depth,
        address = ?config.address,
        gas_limit = config.gas_limit,
        "DELEGATECALL"
    );
    let result = runner.run(config);
    merge_child_result(frame, state, result, out_offset, out_length, false)
}

pub fn op_create(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let value = frame.stack.pop()?;
    let offset = word_to_usize(frame.stack.pop()?)?;
    let length = word_to_usize(frame.stack.pop()?)?;

    let prepared = prepare_call(
        frame, state, fee, None, value, None, offset, length, 0, 0,
    )?;

    if depth_or_balance_guard(frame, prepared.value, false) {
        return frame.stack.push(U256::zero());
    }

    let nonce = state.get_nonce(frame.address);
    state.set_nonce(frame.address, nonce + U256::one());

    state.cache_put(frame.address, frame.contract);
    let init_code: Bytes = frame.memory.read(offset, length).into();

    let config = CallConfig {
        code: init_code,
        caller: frame.address,
        origin: frame.origin,
        address: frame.address,
        value: prepared.value,
        gas_limit: prepared.forwarded_gas,
        gas_price: frame.gas_price,
        data: Bytes::new(),
        block: frame.block.clone(),
        depth: frame.depth + 1,
        delegatecall: false,
        selfdestruct_set: frame.selfdestruct_set.clone(),
        compiled: false,
        populate_cache: false,
        is_create: true,
    };
    tracing::debug!(
        depth = config.depth,
        address = ?config.address,
        gas_limit = config.gas_limit,
        "CREATE"
    );
    let result = runner.run(config);
    merge_child_result(frame, state, result, 0, 0, true)
}

/// Whole-balance transfer to `recipient`. The new-account surcharge is billed
/// only when the recipient is dead *and* the balance being moved is
/// non-zero (a zero-value transfer can't instantiate a new account under
/// EIP-161, so there is nothing to charge for in that case).
pub fn op_selfdestruct(
    _opcode: u8,
    frame: &mut Frame,
    state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let recipient = word_to_address(frame.stack.pop()?);
    let balance = frame.contract.balance;

    if !balance.is_zero() && state.account_is_empty(recipient) {
        frame.gas.deduct(fee.call_new_account)?;
    }

    if !frame.selfdestruct_set.contains_key(&frame.address) {
        frame.gas.add_refund(fee.suicide_refund);
    }
    frame.selfdestruct_set.insert(frame.address, recipient);

    let recipient_balance = state.get_account_balance(recipient);
    state.put_account_balance(recipient, recipient_balance + balance);
    state.put_account_balance(frame.address, U256::zero());
    frame.contract.balance = U256::zero();

    frame.stopped = true;
    Ok(())
}
