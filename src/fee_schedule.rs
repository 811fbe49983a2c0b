/// Gas constants for one hardfork, threaded through every call as plain
/// configuration rather than read from a global. The `Default` impl carries
/// the Tangerine Whistle / Spurious Dragon (EIP-150/158) constants this core
/// targets (see the fork-identification note in the module-level design doc).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub zero: u64,
    pub base: u64,
    pub very_low: u64,
    pub low: u64,
    pub mid: u64,
    pub high: u64,
    pub ext: u64,
    pub balance: u64,
    pub sload: u64,
    pub jumpdest: u64,
    pub call: u64,
    pub create: u64,
    pub blockhash: u64,
    pub exp: u64,
    pub exp_byte: u64,
    pub sha3: u64,
    pub sha3_word: u64,
    pub copy_word: u64,
    pub memory: u64,
    pub quad_coeff_div: u64,
    pub sstore_set: u64,
    pub sstore_reset: u64,
    pub sstore_refund: u64,
    pub call_value_transfer: u64,
    pub call_new_account: u64,
    pub call_stipend: u64,
    pub log: u64,
    pub log_topic: u64,
    pub log_data: u64,
    pub suicide_refund: u64,
    pub self_destruct: u64,
    pub stack_limit: usize,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            zero: 0,
            base: 2,
            very_low: 3,
            low: 5,
            mid: 8,
            high: 10,
            ext: 20,
            balance: 20,
            sload: 50,
            jumpdest: 1,
            call: 40,
            create: 32_000,
            blockhash: 20,
            exp: 10,
            exp_byte: 50,
            sha3: 30,
            sha3_word: 6,
            copy_word: 3,
            memory: 3,
            quad_coeff_div: 512,
            sstore_set: 20_000,
            sstore_reset: 5_000,
            sstore_refund: 15_000,
            call_value_transfer: 9_000,
            call_new_account: 25_000,
            call_stipend: 2_300,
            log: 375,
            log_topic: 375,
            log_data: 8,
            suicide_refund: 24_000,
            self_destruct: 5_000,
            stack_limit: 1024,
        }
    }
}
