//! Client-side harness for end-to-end scenarios.
//!
//! [`TestClient`] owns a node and talks to it through the same dispatch
//! path a JSON-RPC transport would use. [`TestAccount`] keeps a signing
//! key together with a locally tracked nonce so scenarios never count
//! transactions by hand.

use serde_json::{json, Value};

use alysis_chain::{ChainConfig, LocalChain, TxSignature};
use alysis_crypto::{private_key_from_bytes, public_key_to_address, sign, PrivateKey};
use alysis_node::Node;
use alysis_primitives::{Address, H256, U256};
use alysis_rpc::RpcNode;

use crate::builder::{EtherDenom, TxBuilder};
use crate::{E2EError, E2EResult};

/// Fixed genesis timestamp so block fields are reproducible
pub const TEST_TIMESTAMP: u64 = 1_700_000_000;

/// Initial balance for created test accounts (10 ETH)
pub const FUNDED_BALANCE: u64 = 10_000_000_000_000_000_000;

/// Test account with private key and locally tracked nonce
#[derive(Clone)]
pub struct TestAccount {
    /// Private key for signing
    private_key: PrivateKey,
    /// Derived address
    address: Address,
    /// Next nonce to use
    nonce: u64,
}

impl TestAccount {
    /// Create a new random test account
    pub fn random() -> Self {
        Self::from_key(PrivateKey::random(&mut rand::thread_rng()))
    }

    /// Create from a known private key, with or without a `0x` prefix
    pub fn from_hex(hex_key: &str) -> E2EResult<Self> {
        let digits = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = hex::decode(digits).map_err(|err| E2EError::Setup(err.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| E2EError::Setup("a private key is 32 bytes".to_string()))?;
        let private_key =
            private_key_from_bytes(&bytes).map_err(|err| E2EError::Setup(err.to_string()))?;
        Ok(Self::from_key(private_key))
    }

    fn from_key(private_key: PrivateKey) -> Self {
        let address = public_key_to_address(private_key.verifying_key());
        Self {
            private_key,
            address,
            nonce: 0,
        }
    }

    /// Get the account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the next nonce without consuming it
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Take the next nonce, advancing the local counter
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }

    /// Sign a transaction hash
    pub fn sign(&self, message_hash: &H256) -> E2EResult<TxSignature> {
        let signature = sign(message_hash, &self.private_key)
            .map_err(|err| E2EError::Transaction(err.to_string()))?;
        Ok(TxSignature::from(signature))
    }
}

impl std::fmt::Debug for TestAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestAccount")
            .field("address", &self.address.to_hex())
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// A node driven through its JSON-RPC surface
pub struct TestClient {
    rpc: RpcNode<LocalChain>,
    root: TestAccount,
}

impl TestClient {
    /// A client over a fresh chain with the default configuration and a
    /// fixed genesis timestamp
    pub fn new() -> Self {
        Self::with_config(ChainConfig {
            genesis_timestamp: Some(TEST_TIMESTAMP),
            ..ChainConfig::default()
        })
    }

    /// A client over a fresh chain with an explicit configuration
    pub fn with_config(config: ChainConfig) -> Self {
        let rpc = RpcNode::new(config);
        let root = TestAccount::from_key(rpc.node().root_private_key().clone());
        Self { rpc, root }
    }

    /// Send one request through the dispatcher
    pub fn request(&mut self, method: &str, params: &[Value]) -> E2EResult<Value> {
        Ok(self.rpc.rpc(method, params)?)
    }

    /// Feed a raw JSON envelope to the node, as a transport would
    pub fn raw_request(&mut self, body: &str) -> String {
        self.rpc.handle_raw(body)
    }

    /// Address of the account funded at genesis
    pub fn root(&self) -> Address {
        self.root.address()
    }

    /// Create a random account and fund it with [`FUNDED_BALANCE`]
    pub fn create_account(&mut self) -> E2EResult<TestAccount> {
        let account = TestAccount::random();
        self.fund(account.address(), U256::from(FUNDED_BALANCE))?;
        Ok(account)
    }

    /// Transfer `value` wei from the root account
    pub fn fund(&mut self, to: Address, value: U256) -> E2EResult<H256> {
        tracing::debug!("Funding {} with {} wei", to.to_hex(), value);
        let mut root = self.root.clone();
        let hash = self.send(&mut root, TxBuilder::transfer(to, value))?;
        self.root = root;
        Ok(hash)
    }

    /// Sign and submit a built transaction. The sender's tracked nonce
    /// is used and advanced unless the builder pinned one.
    pub fn send(&mut self, from: &mut TestAccount, builder: TxBuilder) -> E2EResult<H256> {
        let nonce = match builder.nonce {
            Some(nonce) => nonce,
            None => from.next_nonce(),
        };
        let transaction = builder.build(self.rpc.node().chain_id(), nonce, self.gas_price());
        let signature = from.sign(&transaction.signing_hash())?;
        let raw = transaction.encode_signed(&signature);

        tracing::debug!(
            "Submitting a {} byte transaction from {}",
            raw.len(),
            from.address().to_hex()
        );
        let result = self.request(
            "eth_sendRawTransaction",
            &[json!(format!("0x{}", hex::encode(raw)))],
        )?;
        hash_of(&result)
    }

    /// Transfer and return the wire-form receipt. The receipt is `null`
    /// while automatic mining is off.
    pub fn transfer(
        &mut self,
        from: &mut TestAccount,
        to: Address,
        value: U256,
    ) -> E2EResult<Value> {
        let hash = self.send(from, TxBuilder::transfer(to, value))?;
        self.receipt(&hash)
    }

    /// Latest balance of an address
    pub fn balance(&mut self, address: &Address) -> E2EResult<U256> {
        let result = self.request(
            "eth_getBalance",
            &[json!(address.to_hex()), json!("latest")],
        )?;
        wei_quantity(&result)
    }

    /// Wire-form receipt of a transaction
    pub fn receipt(&mut self, hash: &H256) -> E2EResult<Value> {
        self.request("eth_getTransactionReceipt", &[json!(hash.to_hex())])
    }

    /// The node's current fee suggestion
    pub fn gas_price(&self) -> U256 {
        self.rpc.node().gas_price()
    }

    /// Typed access to the node, for arranging scenarios
    pub fn node(&self) -> &Node<LocalChain> {
        self.rpc.node()
    }

    /// Mutable typed access to the node
    pub fn node_mut(&mut self) -> &mut Node<LocalChain> {
        self.rpc.node_mut()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a JSON hex quantity into a number
pub fn quantity(value: &Value) -> E2EResult<u64> {
    let digits = hex_digits(value)?;
    u64::from_str_radix(digits, 16)
        .map_err(|err| E2EError::Response(format!("bad quantity {value}: {err}")))
}

/// Decode a JSON hex quantity into a wei amount
pub fn wei_quantity(value: &Value) -> E2EResult<U256> {
    let digits = hex_digits(value)?;
    U256::from_str_radix(digits, 16)
        .map_err(|err| E2EError::Response(format!("bad quantity {value}: {err}")))
}

/// Decode a JSON hex string into a 32-byte hash
pub fn hash_of(value: &Value) -> E2EResult<H256> {
    let text = value
        .as_str()
        .ok_or_else(|| E2EError::Response(format!("expected a hash, got {value}")))?;
    H256::from_hex(text).map_err(|err| E2EError::Response(format!("bad hash {text}: {err}")))
}

fn hex_digits(value: &Value) -> E2EResult<&str> {
    let text = value
        .as_str()
        .ok_or_else(|| E2EError::Response(format!("expected a hex quantity, got {value}")))?;
    text.strip_prefix("0x")
        .ok_or_else(|| E2EError::Response(format!("expected a 0x prefix in {text}")))
}

/// Assertion helpers over wire-form receipts
pub trait ReceiptAssertions {
    /// Assert the transaction succeeded
    fn assert_success(&self) -> &Self;

    /// Gas used by the transaction
    fn gas_used(&self) -> u64;

    /// Number of the block the transaction landed in
    fn block_number(&self) -> u64;

    /// Assert a contract was created and return its address
    fn assert_contract_created(&self) -> Address;
}

impl ReceiptAssertions for Value {
    fn assert_success(&self) -> &Self {
        assert_eq!(
            self["status"],
            json!("0x1"),
            "Expected the transaction to succeed, receipt: {self}"
        );
        self
    }

    fn gas_used(&self) -> u64 {
        match quantity(&self["gasUsed"]) {
            Ok(gas) => gas,
            Err(err) => panic!("Receipt without a usable gasUsed field: {err}"),
        }
    }

    fn block_number(&self) -> u64 {
        match quantity(&self["blockNumber"]) {
            Ok(number) => number,
            Err(err) => panic!("Receipt without a usable blockNumber field: {err}"),
        }
    }

    fn assert_contract_created(&self) -> Address {
        match self["contractAddress"].as_str() {
            Some(text) => match Address::from_hex(text) {
                Ok(address) => address,
                Err(err) => panic!("Receipt with a malformed contractAddress: {err}"),
            },
            None => panic!("Expected a contract creation, receipt: {self}"),
        }
    }
}
