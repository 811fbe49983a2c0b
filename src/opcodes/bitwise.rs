use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use crate::word;
use ethereum_types::U256;

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

binary_op!(op_lt, word::lt);
binary_op!(op_gt, word::gt);
binary_op!(op_slt, word::slt);
binary_op!(op_sgt, word::sgt);
binary_op!(op_eq, word::eq);
binary_op!(op_and, |a, b| a & b);
binary_op!(op_or, |a, b: U256| a | b);
binary_op!(op_xor, |a, b: U256| a ^ b);
binary_op!(op_byte, word::byte);

pub fn op_iszero(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let a = frame.stack.pop()?;
    frame.stack.push(word::is_zero(a))
}

pub fn op_not(
    _opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    _fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let a = frame.stack.pop()?;
    frame.stack.push(!a)
}
