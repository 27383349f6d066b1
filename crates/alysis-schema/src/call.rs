//! Call and gas estimation parameters

use bytes::Bytes;

use alysis_codec::json_record;
use alysis_primitives::{Address, U256};

json_record! {
    /// Parameters of a read-only call
    pub struct EthCallParams {
        to: Address,
        from_: Option<Address> = None,
        gas: Option<u64> = None,
        gas_price: U256 = U256::zero(),
        value: U256 = U256::zero(),
        data: Option<Bytes> = None,
    }
}

json_record! {
    /// Parameters of a gas estimation
    pub struct EstimateGasParams {
        from_: Address,
        to: Option<Address> = None,
        gas: Option<u64> = None,
        gas_price: U256 = U256::zero(),
        nonce: Option<u64> = None,
        value: U256 = U256::zero(),
        data: Option<Bytes> = None,
    }
}
