//! Declarative transaction construction for scenarios.
//!
//! A [`TxBuilder`] describes what a transaction should do; the client
//! fills in chain-dependent details (nonce, fee suggestions) when it is
//! sent.

use alysis_chain::{intrinsic_gas, DynamicFeeTx, LegacyTx, Transaction};
use alysis_primitives::{Address, U256};
use bytes::Bytes;

/// Default priority fee for harness-built transactions (1 gwei)
const DEFAULT_TIP: u64 = 1_000_000_000;

/// Builder for constructing transactions declaratively
#[derive(Clone, Debug)]
pub struct TxBuilder {
    /// Recipient address (`None` for contract creation)
    pub(crate) to: Option<Address>,
    /// Value to transfer in wei
    pub(crate) value: U256,
    /// Transaction payload
    pub(crate) data: Vec<u8>,
    /// Gas limit (intrinsic cost if not set)
    pub(crate) gas: Option<u64>,
    /// Explicit nonce (account-tracked if not set)
    pub(crate) nonce: Option<u64>,
    /// Priority fee per gas (1 gwei if not set)
    pub(crate) tip: Option<U256>,
    /// Fee cap per gas (the node's suggested price if not set)
    pub(crate) max_fee: Option<U256>,
    /// Use the pre-EIP-1559 envelope
    pub(crate) legacy: bool,
}

impl TxBuilder {
    /// A plain value transfer
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            data: vec![],
            gas: None,
            nonce: None,
            tip: None,
            max_fee: None,
            legacy: false,
        }
    }

    /// A contract creation carrying `code` as its payload
    pub fn deploy(code: Vec<u8>) -> Self {
        Self {
            to: None,
            value: U256::zero(),
            data: code,
            gas: None,
            nonce: None,
            tip: None,
            max_fee: None,
            legacy: false,
        }
    }

    /// A zero-value call to an address
    pub fn call(to: Address) -> Self {
        Self::transfer(to, U256::zero())
    }

    /// Set the payload
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Set the value to send
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the gas limit
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Pin the nonce instead of using the sender's tracked one
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the priority fee per gas
    pub fn tip(mut self, tip: U256) -> Self {
        self.tip = Some(tip);
        self
    }

    /// Set the fee cap per gas
    pub fn max_fee(mut self, max_fee: U256) -> Self {
        self.max_fee = Some(max_fee);
        self
    }

    /// Switch to the pre-EIP-1559 envelope
    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }

    /// Check if this is a contract deployment
    pub fn is_deploy(&self) -> bool {
        self.to.is_none()
    }

    /// Assemble the unsigned transaction. `nonce` and `gas_price` come
    /// from the sending client when the builder leaves them open.
    pub(crate) fn build(&self, chain_id: u64, nonce: u64, gas_price: U256) -> Transaction {
        let gas = self
            .gas
            .unwrap_or_else(|| intrinsic_gas(&self.data, self.is_deploy(), &[]));
        let data = Bytes::from(self.data.clone());

        if self.legacy {
            Transaction::Legacy(LegacyTx {
                chain_id: Some(chain_id),
                nonce,
                gas_price: self.max_fee.unwrap_or(gas_price),
                gas,
                to: self.to,
                value: self.value,
                data,
            })
        } else {
            Transaction::DynamicFee(DynamicFeeTx {
                chain_id,
                nonce,
                max_priority_fee_per_gas: self.tip.unwrap_or_else(|| U256::from(DEFAULT_TIP)),
                max_fee_per_gas: self.max_fee.unwrap_or(gas_price),
                gas,
                to: self.to,
                value: self.value,
                data,
                access_list: vec![],
            })
        }
    }
}

/// Ether denomination helper trait
///
/// Allows writing amounts like `10.ether()` instead of
/// `U256::exp10(19)`.
pub trait EtherDenom {
    /// Convert to wei (base unit)
    fn wei(self) -> U256;
    /// Convert to gwei (10^9 wei)
    fn gwei(self) -> U256;
    /// Convert to ether (10^18 wei)
    fn ether(self) -> U256;
}

impl EtherDenom for u64 {
    fn wei(self) -> U256 {
        U256::from(self)
    }

    fn gwei(self) -> U256 {
        U256::from(self) * U256::exp10(9)
    }

    fn ether(self) -> U256 {
        U256::from(self) * U256::exp10(18)
    }
}

impl EtherDenom for u128 {
    fn wei(self) -> U256 {
        U256::from(self)
    }

    fn gwei(self) -> U256 {
        U256::from(self) * U256::exp10(9)
    }

    fn ether(self) -> U256 {
        U256::from(self) * U256::exp10(18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ether_denom() {
        assert_eq!(1u64.wei(), U256::from(1u64));
        assert_eq!(1u64.gwei(), U256::from(1_000_000_000u64));
        assert_eq!(1u64.ether(), U256::exp10(18));
        assert_eq!(10u64.ether(), U256::exp10(19));
    }

    #[test]
    fn test_transfer_builder() {
        let to = Address::from_bytes([0x42; 20]);
        let builder = TxBuilder::transfer(to, 1u64.ether());

        assert_eq!(builder.to, Some(to));
        assert_eq!(builder.value, 1u64.ether());
        assert!(builder.data.is_empty());
        assert!(!builder.is_deploy());
    }

    #[test]
    fn test_deploy_builder() {
        let code = vec![0x60, 0x80, 0x60, 0x40];
        let builder = TxBuilder::deploy(code.clone());

        assert!(builder.to.is_none());
        assert_eq!(builder.value, U256::zero());
        assert_eq!(builder.data, code);
        assert!(builder.is_deploy());
    }

    #[test]
    fn test_builder_chaining() {
        let to = Address::from_bytes([0x42; 20]);
        let builder = TxBuilder::call(to)
            .data(vec![0xa9, 0x05, 0x9c, 0xbb])
            .value(100u64.wei())
            .gas(50_000)
            .nonce(7);

        assert_eq!(builder.to, Some(to));
        assert_eq!(builder.data, vec![0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(builder.value, U256::from(100u64));
        assert_eq!(builder.gas, Some(50_000));
        assert_eq!(builder.nonce, Some(7));
    }

    #[test]
    fn test_default_gas_is_the_intrinsic_cost() {
        let to = Address::from_bytes([0x42; 20]);
        let plain = TxBuilder::transfer(to, U256::zero()).build(1337, 0, U256::from(1u64));
        assert_eq!(plain.gas(), 21_000);

        let with_data = TxBuilder::call(to)
            .data(vec![0x01, 0x00])
            .build(1337, 0, U256::from(1u64));
        assert_eq!(with_data.gas(), 21_000 + 16 + 4);
    }

    #[test]
    fn test_legacy_builder_uses_a_single_price() {
        let to = Address::from_bytes([0x42; 20]);
        let tx = TxBuilder::transfer(to, U256::zero())
            .legacy()
            .build(1337, 3, U256::from(2_000_000_000u64));

        match tx {
            Transaction::Legacy(inner) => {
                assert_eq!(inner.chain_id, Some(1337));
                assert_eq!(inner.nonce, 3);
                assert_eq!(inner.gas_price, U256::from(2_000_000_000u64));
            }
            other => panic!("expected a legacy envelope, got {:?}", other),
        }
    }
}
