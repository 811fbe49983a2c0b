//! Opcode dispatch: a fixed byte-keyed jump table of typed instruction
//! descriptors, in the spirit of a classic `Operation`/`JumpTable` pair.
//! Handlers share one function-pointer signature instead of being boxed
//! closures, so the PUSHn/DUPn/SWAPn/LOGn families share one handler each,
//! keyed off the opcode byte they were dispatched with.

pub mod arithmetic;
pub mod bitwise;
pub mod block_ops;
pub mod call_ops;
pub mod codes;
pub mod crypto_ops;
pub mod environment;
pub mod flow;
pub mod log_ops;
pub mod memory_ops;
pub mod stack_ops;
pub mod storage_ops;

use crate::error::{EvmError, Trap};
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub type Handler = fn(
    u8,
    &mut Frame,
    &mut dyn StateManager,
    &dyn ChildFrameRunner,
    &FeeSchedule,
) -> Result<(), EvmError>;

pub struct Operation {
    pub name: &'static str,
    pub gas_fn: fn(&FeeSchedule) -> u64,
    pub handler: Handler,
}

fn gas_zero(_: &FeeSchedule) -> u64 {
    0
}
fn gas_base(fee: &FeeSchedule) -> u64 {
    fee.base
}
fn gas_very_low(fee: &FeeSchedule) -> u64 {
    fee.very_low
}
fn gas_low(fee: &FeeSchedule) -> u64 {
    fee.low
}
fn gas_mid(fee: &FeeSchedule) -> u64 {
    fee.mid
}
fn gas_high(fee: &FeeSchedule) -> u64 {
    fee.high
}
fn gas_ext(fee: &FeeSchedule) -> u64 {
    fee.ext
}
fn gas_balance(fee: &FeeSchedule) -> u64 {
    fee.balance
}
fn gas_sload(fee: &FeeSchedule) -> u64 {
    fee.sload
}
fn gas_jumpdest(fee: &FeeSchedule) -> u64 {
    fee.jumpdest
}
fn gas_call(fee: &FeeSchedule) -> u64 {
    fee.call
}
fn gas_create(fee: &FeeSchedule) -> u64 {
    fee.create
}
fn gas_blockhash(fee: &FeeSchedule) -> u64 {
    fee.blockhash
}
fn gas_exp(fee: &FeeSchedule) -> u64 {
    fee.exp
}
fn gas_sha3(fee: &FeeSchedule) -> u64 {
    fee.sha3
}
fn gas_log(fee: &FeeSchedule) -> u64 {
    fee.log
}
fn gas_self_destruct(fee: &FeeSchedule) -> u64 {
    fee.self_destruct
}

macro_rules! op {
    ($table:expr, $code:expr, $name:expr, $gas_fn:expr, $handler:expr) => {
        $table.insert(
            $code,
            Operation {
                name: $name,
                gas_fn: $gas_fn,
                handler: $handler,
            },
        );
    };
}

fn build_jump_table() -> HashMap<u8, Operation> {
    let mut t = HashMap::new();

    op!(t, codes::STOP, "STOP", gas_zero, flow::op_stop);
    op!(t, codes::ADD, "ADD", gas_very_low, arithmetic::op_add);
    op!(t, codes::MUL, "MUL", gas_low, arithmetic::op_mul);
    op!(t, codes::SUB, "SUB", gas_very_low, arithmetic::op_sub);
    op!(t, codes::DIV, "DIV", gas_low, arithmetic::op_div);
    op!(t, codes::SDIV, "SDIV", gas_low, arithmetic::op_sdiv);
    op!(t, codes::MOD, "MOD", gas_low, arithmetic::op_mod);
    op!(t, codes::SMOD, "SMOD", gas_low, arithmetic::op_smod);
    op!(t, codes::ADDMOD, "ADDMOD", gas_mid, arithmetic::op_addmod);
    op!(t, codes::MULMOD, "MULMOD", gas_mid, arithmetic::op_mulmod);
    op!(t, codes::EXP, "EXP", gas_exp, arithmetic::op_exp);
    op!(
        t,
        codes::SIGNEXTEND,
        "SIGNEXTEND",
        gas_low,
        arithmetic::op_signextend
    );

    op!(t, codes::LT, "LT", gas_very_low, bitwise::op_lt);
    op!(t, codes::GT, "GT", gas_very_low, bitwise::op_gt);
    op!(t, codes::SLT, "SLT", gas_very_low, bitwise::op_slt);
    op!(t, codes::SGT, "SGT", gas_very_low, bitwise::op_sgt);
    op!(t, codes::EQ, "EQ", gas_very_low, bitwise::op_eq);
    op!(t, codes::ISZERO, "ISZERO", gas_very_low, bitwise::op_iszero);
    op!(t, codes::AND, "AND", gas_very_low, bitwise::op_and);
    op!(t, codes::OR, "OR", gas_very_low, bitwise::op_or);
    op!(t, codes::XOR, "XOR", gas_very_low, bitwise::op_xor);
    op!(t, codes::NOT, "NOT", gas_very_low, bitwise::op_not);
    op!(t, codes::BYTE, "BYTE", gas_very_low, bitwise::op_byte);

    op!(t, codes::SHA3, "SHA3", gas_sha3, crypto_ops::op_sha3);

    op!(
        t,
        codes::ADDRESS,
        "ADDRESS",
        gas_base,
        environment::op_address
    );
    op!(
        t,
        codes::BALANCE,
        "BALANCE",
        gas_balance,
        environment::op_balance
    );
    op!(t, codes::ORIGIN, "ORIGIN", gas_base, environment::op_origin);
    op!(t, codes::CALLER, "CALLER", gas_base, environment::op_caller);
    op!(
        t,
        codes::CALLVALUE,
        "CALLVALUE",
        gas_base,
        environment::op_callvalue
    );
    op!(
        t,
        codes::CALLDATALOAD,
        "CALLDATALOAD",
        gas_very_low,
        environment::op_calldataload
    );
    op!(
        t,
        codes::CALLDATASIZE,
        "CALLDATASIZE",
        gas_base,
        environment::op_calldatasize
    );
    op!(
        t,
        codes::CALLDATACOPY,
        "CALLDATACOPY",
        gas_very_low,
        environment::op_calldatacopy
    );
    op!(
        t,
        codes::CODESIZE,
        "CODESIZE",
        gas_base,
        environment::op_codesize
    );
    op!(
        t,
        codes::CODECOPY,
        "CODECOPY",
        gas_very_low,
        environment::op_codecopy
    );
    op!(
        t,
        codes::GASPRICE,
        "GASPRICE",
        gas_base,
        environment::op_gasprice
    );
    op!(
        t,
        codes::EXTCODESIZE,
        "EXTCODESIZE",
        gas_ext,
        environment::op_extcodesize
    );
    op!(
        t,
        codes::EXTCODECOPY,
        "EXTCODECOPY",
        gas_ext,
        environment::op_extcodecopy
    );

    op!(
        t,
        codes::BLOCKHASH,
        "BLOCKHASH",
        gas_blockhash,
        block_ops::op_blockhash
    );
    op!(
        t,
        codes::COINBASE,
        "COINBASE",
        gas_base,
        block_ops::op_coinbase
    );
    op!(
        t,
        codes::TIMESTAMP,
        "TIMESTAMP",
        gas_base,
        block_ops::op_timestamp
    );
    op!(t, codes::NUMBER, "NUMBER", gas_base, block_ops::op_number);
    op!(
        t,
        codes::DIFFICULTY,
        "DIFFICULTY",
        gas_base,
        block_ops::op_difficulty
    );
    op!(
        t,
        codes::GASLIMIT,
        "GASLIMIT",
        gas_base,
        block_ops::op_gaslimit
    );

    op!(t, codes::POP, "POP", gas_base, stack_ops::op_pop);
    op!(t, codes::MLOAD, "MLOAD", gas_very_low, memory_ops::op_mload);
    op!(
        t,
        codes::MSTORE,
        "MSTORE",
        gas_very_low,
        memory_ops::op_mstore
    );
    op!(
        t,
        codes::MSTORE8,
        "MSTORE8",
        gas_very_low,
        memory_ops::op_mstore8
    );
    op!(t, codes::SLOAD, "SLOAD", gas_sload, storage_ops::op_sload);
    op!(t, codes::SSTORE, "SSTORE", gas_zero, storage_ops::op_sstore);
    op!(t, codes::JUMP, "JUMP", gas_mid, flow::op_jump);
    op!(t, codes::JUMPI, "JUMPI", gas_high, flow::op_jumpi);
    op!(t, codes::PC, "PC", gas_base, flow::op_pc);
    op!(t, codes::MSIZE, "MSIZE", gas_base, memory_ops::op_msize);
    op!(t, codes::GAS, "GAS", gas_base, flow::op_gas);
    op!(
        t,
        codes::JUMPDEST,
        "JUMPDEST",
        gas_jumpdest,
        flow::op_jumpdest
    );

    for opcode in codes::PUSH1..=codes::PUSH32 {
        t.insert(
            opcode,
            Operation {
                name: "PUSHn",
                gas_fn: gas_very_low,
                handler: stack_ops::op_push,
            },
        );
    }
    for opcode in codes::DUP1..=codes::DUP16 {
        t.insert(
            opcode,
            Operation {
                name: "DUPn",
                gas_fn: gas_very_low,
                handler: stack_ops::op_dup,
            },
        );
    }
    for opcode in codes::SWAP1..=codes::SWAP16 {
        t.insert(
            opcode,
            Operation {
                name: "SWAPn",
                gas_fn: gas_very_low,
                handler: stack_ops::op_swap,
            },
        );
    }
    for opcode in codes::LOG0..=codes::LOG4 {
        t.insert(
            opcode,
            Operation {
                name: "LOGn",
                gas_fn: gas_log,
                handler: log_ops::op_log,
            },
        );
    }

    op!(t, codes::CREATE, "CREATE", gas_create, call_ops::op_create);
    op!(t, codes::CALL, "CALL", gas_call, call_ops::op_call);
    op!(
        t,
        codes::CALLCODE,
        "CALLCODE",
        gas_call,
        call_ops::op_callcode
    );
    op!(t, codes::RETURN, "RETURN", gas_zero, flow::op_return);
    op!(
        t,
        codes::DELEGATECALL,
        "DELEGATECALL",
        gas_call,
        call_ops::op_delegatecall
    );
    op!(
        t,
        codes::SELFDESTRUCT,
        "SELFDESTRUCT",
        gas_self_destruct,
        call_ops::op_selfdestruct
    );

    t
}

pub static JUMP_TABLE: Lazy<HashMap<u8, Operation>> = Lazy::new(build_jump_table);

/// Fetches, charges, and executes one instruction. Does not itself advance
/// past a STOP/RETURN-style terminal; callers loop on `frame.stopped`.
pub fn step(
    frame: &mut Frame,
    state: &mut dyn StateManager,
    runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    if frame.pc >= frame.code.len() {
        frame.stopped = true;
        return Ok(());
    }
    let opcode = frame.code[frame.pc];
    let op = JUMP_TABLE
        .get(&opcode)
        .ok_or(EvmError::InvalidOpcode(opcode))?;
    frame.gas.deduct((op.gas_fn)(fee))?;
    frame.pc += 1;
    tracing::trace!(opcode = %op.name, pc = frame.pc - 1, gas_left = frame.gas.gas_left(), "step");
    (op.handler)(opcode, frame, state, runner, fee)
}

/// Runs a frame to completion: a STOP/RETURN/SELFDESTRUCT terminal, or a trap
/// propagated up as `Err`. On the trap path, a location-tagged `Trap` is built
/// and logged before the plain `EvmError` is returned to the caller.
pub fn run(
    frame: &mut Frame,
    state: &mut dyn StateManager,
    runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    while !frame.stopped {
        if let Err(error) = step(frame, state, runner, fee) {
            let trap = Trap::new(error.clone(), &frame.code, frame.address, frame.pc);
            tracing::warn!(%trap, "trap");
            return Err(error);
        }
    }
    Ok(())
}
