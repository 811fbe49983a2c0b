use crate::error::EvmError;
use crate::fee_schedule::FeeSchedule;
use crate::gas::GasMeter;

/// Byte-addressable, zero-extended memory with quadratic expansion billing.
/// `highest_cost` is the high-water mark of gas already charged for expansion;
/// only the delta above it is ever deducted again.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    data: Vec<u8>,
    highest_cost: u64,
}

/// Ranges whose end would exceed this bound cannot be paid for on any real
/// fee schedule, so they trap immediately rather than risking a `usize`
/// overflow on 32-bit-unlikely-but-unchecked platforms.
const MAX_MEMORY_BYTES: usize = 1 << 53;

impl Memory {
    pub fn new() -> Self {
        Memory::default()
    }

    pub fn word_count(&self) -> usize {
        self.data.len() / 32
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn needed_words(offset: usize, length: usize) -> Result<usize, EvmError> {
        if length == 0 {
            return Ok(0);
        }
        let end = offset.checked_add(length).ok_or(EvmError::OutOfGas)?;
        if end > MAX_MEMORY_BYTES {
            return Err(EvmError::OutOfGas);
        }
        Ok((end + 31) / 32)
    }

    fn cost_for_words(words: usize, fee: &FeeSchedule) -> u64 {
        let w = words as u128;
        let total = u128::from(fee.memory) * w + (w * w) / u128::from(fee.quad_coeff_div);
        total.min(u128::from(u64::MAX)) as u64
    }

    /// Bills the expansion needed to cover `[offset, offset+length)`, resizing
    /// the backing buffer in the same step. A no-op (no charge) if the range
    /// is already covered or zero-length.
    pub fn charge_expansion(
        &mut self,
        offset: usize,
        length: usize,
        gas: &mut GasMeter,
        fee: &FeeSchedule,
    ) -> Result<(), EvmError> {
        let needed_words = Self::needed_words(offset, length)?;
        if needed_words <= self.word_count() {
            return Ok(());
        }
        let new_cost = Self::cost_for_words(needed_words, fee);
        let delta = new_cost.saturating_sub(self.highest_cost);
        gas.deduct(delta)?;
        self.highest_cost = new_cost;
        self.data.resize(needed_words * 32, 0);
        Ok(())
    }

    /// Reads `length` bytes at `offset`, zero-padding past the high-water mark.
    /// Callers that need the read billed must call `charge_expansion` first.
    pub fn read(&self, offset: usize, length: usize) -> Vec<u8> {
        let mut out = vec![0u8; length];
        if offset >= self.data.len() {
            return out;
        }
        let avail_end = (offset + length).min(self.data.len());
        if avail_end > offset {
            out[..avail_end - offset].copy_from_slice(&self.data[offset..avail_end]);
        }
        out
    }

    pub fn write(&mut self, offset: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let end = offset + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
    }

    pub fn write_byte(&mut self, offset: usize, byte: u8) {
        if offset >= self.data.len() {
            self.data.resize(offset + 1, 0);
        }
        self.data[offset] = byte;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee() -> FeeSchedule {
        FeeSchedule::default()
    }

    #[test]
    fn write_then_read_roundtrips() {
        let mut mem = Memory::new();
        let mut gas = GasMeter::new(1_000_000);
        mem.charge_expansion(0, 32, &mut gas, &fee()).unwrap();
        mem.write(0, &[1, 2, 3]);
        assert_eq!(&mem.read(0, 3), &[1, 2, 3]);
        assert_eq!(&mem.read(3, 2), &[0, 0]);
    }

    #[test]
    fn read_past_high_water_mark_is_zero() {
        let mem = Memory::new();
        assert_eq!(mem.read(0, 4), vec![0u8; 4]);
    }

    #[test]
    fn expansion_cost_is_monotonic_and_charged_once() {
        let mut mem = Memory::new();
        let mut gas = GasMeter::new(1_000_000);
        let before = gas.gas_left();
        mem.charge_expansion(0, 32, &mut gas, &fee()).unwrap();
        let first_cost = before - gas.gas_left();
        let before2 = gas.gas_left();
        // Same range again: no further charge.
        mem.charge_expansion(0, 32, &mut gas, &fee()).unwrap();
        assert_eq!(gas.gas_left(), before2);
        assert!(first_cost > 0);
    }

    #[test]
    fn expansion_past_platform_bound_traps_out_of_gas() {
        let mut mem = Memory::new();
        let mut gas = GasMeter::new(u64::MAX);
        let result = mem.charge_expansion(1 << 53, 1, &mut gas, &fee());
        assert_eq!(result, Err(EvmError::OutOfGas));
    }

    #[test]
    fn mstore8_extends_memory_by_one_byte_slot() {
        let mut mem = Memory::new();
        mem.write_byte(5, 0xab);
        assert_eq!(mem.read(5, 1), vec![0xab]);
    }
}
