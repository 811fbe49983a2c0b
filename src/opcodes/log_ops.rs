use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::frame::Frame;
use crate::log::LogEntry;
use crate::opcodes::codes;
use crate::opcodes::memory_ops::word_to_usize;
use crate::runner::ChildFrameRunner;
use crate::state::StateManager;
use ethereum_types::H256;

/// Handles LOG0..LOG4: `opcode - LOG0` is the topic count.
pub fn op_log(
    opcode: u8,
    frame: &mut Frame,
    _state: &mut dyn StateManager,
    _runner: &dyn ChildFrameRunner,
    fee: &FeeSchedule,
) -> Result<(), EvmError> {
    let topic_count = (opcode - codes::LOG0) as usize;
    let offset = word_to_usize(frame.stack.pop()?)?;
    let length = word_to_usize(frame.stack.pop()?)?;

    let mut topics = Vec::with_capacity(topic_count);
    for _ in 0..topic_count {
        let t = frame.stack.pop()?;
        let mut bytes = [0u8; 32];
        t.to_big_endian(&mut bytes);
        topics.push(H256::from(bytes));
    }

    frame
        .memory
        .charge_expansion(offset, length, &mut frame.gas, fee)?;
    frame
        .gas
        .deduct(fee.log_topic * topic_count as u64 + fee.log_data * length as u64)?;

    let data = frame.memory.read(offset, length);
    frame.logs.push(LogEntry {
        address: frame.address,
        topics,
        data: data.into(),
    });
    Ok(())
}
