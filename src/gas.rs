use crate::error::EvmError;

/// Tracks a frame's remaining gas and accumulated refund. `gas_left` only ever
/// decreases (aside from stipend credits on value-bearing calls); `gas_refund`
/// only ever increases and is never spent within the frame.
#[derive(Debug, Clone, Copy)]
pub struct GasMeter {
    gas_left: u64,
    gas_refund: u64,
}

impl GasMeter {
    pub fn new(gas_limit: u64) -> Self {
        GasMeter {
            gas_left: gas_limit,
            gas_refund: 0,
        }
    }

    pub fn gas_left(&self) -> u64 {
        self.gas_left
    }

    pub fn gas_refund(&self) -> u64 {
        self.gas_refund
    }

    pub fn deduct(&mut self, amount: u64) -> Result<(), EvmError> {
        self.gas_left = self
            .gas_left
            .checked_sub(amount)
            .ok_or(EvmError::OutOfGas)?;
        Ok(())
    }

    /// Credits gas back, e.g. the call stipend handed to a value-bearing call.
    pub fn credit(&mut self, amount: u64) {
        self.gas_left = self.gas_left.saturating_add(amount);
    }

    pub fn add_refund(&mut self, amount: u64) {
        self.gas_refund = self.gas_refund.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduct_past_zero_traps_out_of_gas() {
        let mut meter = GasMeter::new(10);
        assert!(meter.deduct(5).is_ok());
        assert_eq!(meter.deduct(6), Err(EvmError::OutOfGas));
    }

    #[test]
    fn credit_then_deduct_stipend() {
        let mut meter = GasMeter::new(0);
        meter.credit(2300);
        assert!(meter.deduct(2300).is_ok());
    }

    #[test]
    fn refund_never_applied_to_gas_left() {
        let mut meter = GasMeter::new(100);
        meter.add_refund(15000);
        assert_eq!(meter.gas_left(), 100);
        assert_eq!(meter.gas_refund(), 15000);
    }
}
