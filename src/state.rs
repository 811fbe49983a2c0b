use bytes::Bytes;
use ethereum_types::{Address, H256, U256};

/// Cached view of an account, the shape handed back and forth between a
/// frame and the state manager so the core doesn't refetch on every touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountInfo {
    pub balance: U256,
    pub nonce: U256,
    pub exists: bool,
}

/// Account/storage/balance/code/block-hash collaborator. The persistent
/// backend, its caching layer, and Merkle commitments are all behind this
/// trait and out of this core's concern.
pub trait StateManager {
    fn get_account(&self, address: Address) -> AccountInfo;
    fn get_account_balance(&self, address: Address) -> U256;
    fn put_account_balance(&mut self, address: Address, balance: U256);
    fn get_nonce(&self, address: Address) -> U256;
    fn set_nonce(&mut self, address: Address, nonce: U256);
    fn get_contract_code(&self, address: Address) -> (Bytes, bool);
    fn set_code(&mut self, address: Address, code: Bytes);
    fn get_contract_storage(&self, address: Address, key: H256) -> H256;
    fn put_contract_storage(&mut self, address: Address, key: H256, value: H256);
    fn account_is_empty(&self, address: Address) -> bool;
    fn exists(&self, address: Address) -> bool;
    fn get_block_hash(&self, number: U256) -> H256;
    fn cache_get(&self, address: Address) -> Option<AccountInfo>;
    fn cache_put(&mut self, address: Address, info: AccountInfo);
}
