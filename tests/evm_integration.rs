use bytes::Bytes;
use ethereum_types::{Address, U256};
use evm_core::host::InMemoryStateManager;
use evm_core::opcodes;
use evm_core::{BlockContext, FeeSchedule, Frame, FrameInit, StateManager};
use hex_literal::hex;
use std::collections::HashMap;

/// Installs a tracing subscriber writing to the test harness's own capture
/// buffer, so `cargo test -- --nocapture` shows the step/trap logs emitted
/// by the dispatch loop. Safe to call from every test: `try_init` ignores
/// the "already set" error from a prior test in the same binary.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn run_code(
    state: &InMemoryStateManager,
    code: Vec<u8>,
    gas_limit: u64,
) -> (Frame, Result<(), evm_core::EvmError>) {
    init_tracing();
    let runner = evm_core::host::SequentialChildRunner::new(state);
    let address = Address::from_low_u64_be(0xA11CE);
    let contract = state.get_account(address);
    let init = FrameInit {
        code: Bytes::from(code),
        gas_limit,
        address,
        caller: Address::from_low_u64_be(0xCA11E0),
        origin: Address::from_low_u64_be(0xCA11E0),
        call_value: U256::zero(),
        gas_price: U256::one(),
        call_data: Bytes::new(),
        contract,
        block: BlockContext::genesis(),
        depth: 0,
        delegatecall: false,
        selfdestruct_set: HashMap::new(),
    };
    let mut frame = Frame::new(init);
    let fee = FeeSchedule::default();
    let mut state_manager = state.clone();
    let result = opcodes::run(&mut frame, &mut state_manager, &runner, &fee);
    (frame, result)
}

#[test]
fn sub_wraps_two_complement() {
    let state = InMemoryStateManager::new();
    // PUSH1 2 PUSH1 1 SUB -> 1 - 2 == -1 == 2^256-1
    let code = hex!("6002600103").to_vec();
    let (frame, result) = run_code(&state, code, 100_000);
    result.unwrap();
    assert_eq!(frame.stack.peek(0).unwrap(), U256::MAX);
}

#[test]
fn sstore_clearing_a_slot_refunds_gas() {
    let state = InMemoryStateManager::new();
    // First populate the slot with a non-zero value.
    let set_code = hex!("6042600055").to_vec(); // PUSH1 0x42 PUSH1 0 SSTORE
    let (_frame, result) = run_code(&state, set_code, 100_000);
    result.unwrap();

    // Now clear it and check the refund landed.
    let clear_code = hex!("6000600055").to_vec(); // PUSH1 0 PUSH1 0 SSTORE
    let (frame, result) = run_code(&state, clear_code, 100_000);
    result.unwrap();
    assert_eq!(frame.gas.gas_refund(), FeeSchedule::default().sstore_refund);
}

#[test]
fn jump_to_valid_jumpdest_succeeds() {
    let state = InMemoryStateManager::new();
    // PUSH1 4 JUMP JUMPDEST STOP -> jumps over nothing, lands on JUMPDEST at 4.
    let code = hex!("60045600").to_vec();
    let mut code = code;
    code.push(0x5b); // JUMPDEST at offset 4
    let (_frame, result) = run_code(&state, code, 100_000);
    result.unwrap();
}

#[test]
fn jump_to_invalid_destination_traps() {
    let state = InMemoryStateManager::new();
    // PUSH1 3 JUMP STOP -> offset 3 is mid-instruction, not a JUMPDEST.
    let code = hex!("60035600").to_vec();
    let (_frame, result) = run_code(&state, code, 100_000);
    assert_eq!(result, Err(evm_core::EvmError::InvalidJump));
}

#[test]
fn call_forwards_at_most_63_64_of_remaining_gas() {
    let state = InMemoryStateManager::new();
    let caller = Address::from_low_u64_be(1);
    let callee = Address::from_low_u64_be(2);
    state.fund(caller, U256::from(1_000_000u64));
    // Callee: STOP immediately.
    {
        let mut sm: Box<dyn StateManager> = Box::new(state.clone());
        sm.set_code(callee, Bytes::from(vec![0x00]));
    }

    let gas_limit: u64 = 6400;
    // CALL(gas=6400, to=2, value=0, in=0,0, out=0,0)
    let mut code = vec![0x60, 0x00]; // PUSH1 0 (out len)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (out offset)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (in len)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (in offset)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (value)
    code.extend_from_slice(&[0x73]); // PUSH20
    code.extend_from_slice(callee.as_bytes());
    code.extend_from_slice(&[0x61, 0x19, 0x00]); // PUSH2 6400 (gas)
    code.push(0xf1); // CALL

    let (frame, result) = run_code(&state, code, gas_limit + 10_000);
    result.unwrap();
    assert_eq!(frame.stack.peek(0).unwrap(), U256::one());
}

#[test]
fn call_with_value_transfers_balance_and_grants_stipend() {
    let state = InMemoryStateManager::new();
    // run_code's frame always executes as this address, so it is the
    // account CALL's value comes out of.
    let sender = Address::from_low_u64_be(0xA11CE);
    let callee = Address::from_low_u64_be(3);
    state.fund(sender, U256::from(1_000u64));
    // Callee: STOP immediately.
    {
        let mut sm: Box<dyn StateManager> = Box::new(state.clone());
        sm.set_code(callee, Bytes::from(vec![0x00]));
    }

    // CALL(gas=0, to=3, value=1, in=0,0, out=0,0) -> requested gas floors to
    // 0, so the only gas the child receives is the stipend.
    let mut code = vec![0x60, 0x00]; // PUSH1 0 (out len)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (out offset)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (in len)
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (in offset)
    code.extend_from_slice(&[0x60, 0x01]); // PUSH1 1 (value)
    code.push(0x73); // PUSH20
    code.extend_from_slice(callee.as_bytes());
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (gas)
    code.push(0xf1); // CALL

    let (frame, result) = run_code(&state, code, 100_000);
    result.unwrap();
    assert_eq!(frame.stack.peek(0).unwrap(), U256::one());
    assert_eq!(state.get_account_balance(sender), U256::from(999u64));
    assert_eq!(state.get_account_balance(callee), U256::one());
}

#[test]
fn create_with_value_transfers_balance_to_new_contract() {
    let state = InMemoryStateManager::new();
    let sender = Address::from_low_u64_be(0xA11CE);
    state.fund(sender, U256::from(1_000u64));

    // CREATE(value=100, offset=0, length=0) -> empty init code, deploys an
    // account with no code but a non-zero balance.
    let code = vec![
        0x60, 0x00, // PUSH1 0 (length)
        0x60, 0x00, // PUSH1 0 (offset)
        0x60, 0x64, // PUSH1 100 (value)
        0xf0, // CREATE
    ];

    let (frame, result) = run_code(&state, code, 100_000);
    result.unwrap();
    let created = evm_core::opcodes::environment::word_to_address(frame.stack.peek(0).unwrap());
    assert_ne!(created, Address::zero());
    assert_eq!(state.get_account_balance(sender), U256::from(900u64));
    assert_eq!(state.get_account_balance(created), U256::from(100u64));
}

#[test]
fn depth_guard_short_circuits_without_touching_state() {
    let state = InMemoryStateManager::new();
    let caller = Address::from_low_u64_be(1);
    let callee = Address::from_low_u64_be(2);
    state.fund(caller, U256::from(1_000u64));

    let runner = evm_core::host::SequentialChildRunner::new(&state);
    let mut code = vec![0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00];
    code.push(0x73);
    code.extend_from_slice(callee.as_bytes());
    code.extend_from_slice(&[0x60, 0x00]); // PUSH1 0 (gas)
    code.push(0xf1);

    let contract = state.get_account(caller);
    let init = FrameInit {
        code: Bytes::from(code),
        gas_limit: 1_000_000,
        address: caller,
        caller,
        origin: caller,
        call_value: U256::zero(),
        gas_price: U256::one(),
        call_data: Bytes::new(),
        contract,
        block: BlockContext::genesis(),
        depth: 1024,
        delegatecall: false,
        selfdestruct_set: HashMap::new(),
    };
    let mut frame = Frame::new(init);
    let fee = FeeSchedule::default();
    let mut state_manager = state.clone();
    opcodes::run(&mut frame, &mut state_manager, &runner, &fee).unwrap();
    assert_eq!(frame.stack.peek(0).unwrap(), U256::zero());
}

#[test]
fn selfdestruct_transfers_whole_balance_and_stops() {
    let state = InMemoryStateManager::new();
    let contract_addr = Address::from_low_u64_be(0xA11CE);
    state.fund(contract_addr, U256::from(500u64));
    let recipient = Address::from_low_u64_be(0xFEE);

    let mut code = vec![0x73]; // PUSH20 recipient
    code.extend_from_slice(recipient.as_bytes());
    code.push(0xff); // SELFDESTRUCT

    let (frame, result) = run_code(&state, code, 100_000);
    result.unwrap();
    assert!(frame.stopped);
    assert_eq!(state.get_account_balance(recipient), U256::from(500u64));
    assert_eq!(state.get_account_balance(contract_addr), U256::zero());
}
