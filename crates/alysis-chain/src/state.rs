//! Account state and its deterministic digest.
//!
//! The whole world state lives in ordered maps so iteration, and therefore
//! the state root, is deterministic. The chain keeps one live copy for the
//! pending block and a snapshot per mined block for historical queries.

use std::collections::BTreeMap;

use alysis_crypto::keccak256;
use alysis_primitives::{Address, H256, U256};
use bytes::Bytes;
use rlp::RlpStream;

/// A single account: balance, nonce, code, and storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    /// Balance in wei.
    pub balance: U256,
    /// Number of transactions sent from this account.
    pub nonce: u64,
    /// Contract code (empty for externally owned accounts).
    pub code: Bytes,
    /// Contract storage.
    pub storage: BTreeMap<U256, U256>,
}

/// The full account state at one point in chain history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountState {
    accounts: BTreeMap<Address, Account>,
}

impl AccountState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an account, if it has ever been touched.
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Mutable access, materializing an empty account on first touch.
    pub fn account_mut(&mut self, address: Address) -> &mut Account {
        self.accounts.entry(address).or_default()
    }

    /// Balance of an account (zero if untouched).
    pub fn balance(&self, address: &Address) -> U256 {
        self.accounts
            .get(address)
            .map(|account| account.balance)
            .unwrap_or_default()
    }

    /// Nonce of an account (zero if untouched).
    pub fn nonce(&self, address: &Address) -> u64 {
        self.accounts
            .get(address)
            .map(|account| account.nonce)
            .unwrap_or_default()
    }

    /// Code of an account (empty if untouched).
    pub fn code(&self, address: &Address) -> Bytes {
        self.accounts
            .get(address)
            .map(|account| account.code.clone())
            .unwrap_or_default()
    }

    /// Storage slot value (zero if unset).
    pub fn storage(&self, address: &Address, slot: &U256) -> U256 {
        self.accounts
            .get(address)
            .and_then(|account| account.storage.get(slot).copied())
            .unwrap_or_default()
    }

    /// Add to an account's balance.
    pub fn credit(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_add(amount);
    }

    /// Subtract from an account's balance. The caller checks sufficiency.
    pub fn debit(&mut self, address: Address, amount: U256) {
        let account = self.account_mut(address);
        account.balance = account.balance.saturating_sub(amount);
    }

    /// Digest of the whole state.
    ///
    /// Not a Merkle-Patricia root: a keccak over the RLP of all accounts in
    /// address order, which is all the header needs here (a value that
    /// changes exactly when the state does).
    pub fn state_root(&self) -> H256 {
        let mut s = RlpStream::new();
        s.begin_list(self.accounts.len());
        for (address, account) in &self.accounts {
            s.begin_list(5);
            s.append(address);
            s.append(&account.nonce);
            s.append(&account.balance);
            s.append(&account.code);
            s.begin_list(account.storage.len());
            for (slot, value) in &account.storage {
                s.begin_list(2);
                s.append(slot);
                s.append(value);
            }
        }
        keccak256(&s.out())
    }
}
