use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use crate::word;

macro_rules! binary_op {
    ($name:ident, $f:expr) => {
        pub fn $name(
            _opcode: u8,
            frame: &mut Frame,
            _state: &mut dyn StateManager,
            _runner: &dyn ChildFrameRunner,
            _fee: &FeeSchedule,
        ) -> Result<(), EvmError> {
            let a = frame.stack.pop()?;
            let b = frame.stack.pop()?;
            frame.stack.push($f(a, b))
        }
    };
}

binary_op!(op_add, word::add);
binary_op!(op_mul, word::mul);
binary_op!(op_sub, word::sub);
binary_op!(op_div, word::div);
binary_op!(op_sdiv, word::sdiv);
binary_op!(op_mod, word::modulo);
binary_op!(op_smod, word::smod);

pub fn op_addmod(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let m = frame.stack.pop()?;
    frame.stack.push(word::addmod(a, b, m))
}

pub fn op_mulmod(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let m = frame.stack.pop()?;
    frame.stack.push(word::mulmod(a, b, m))
}

pub fn op_exp(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let base = frame.stack.pop()?;
    let exponent = frame.stack.pop()?;
    let byte_len = word::exp_byte_len(exponent);
    frame.gas.deduct(byte_len * fee.exp_byte)?;
    frame.stack.push(word::exp(base, exponent))
}

pub fn op_signextend(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let k = frame.stack.pop()?;
    let v = frame.stack.pop()?;
    frame.stack.push(word::signextend(k, v))
}
