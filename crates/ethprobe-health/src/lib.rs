//! ethprobe-health — JSON-RPC health checking for Ethereum execution clients.
//!
//! Confirms that a node is live (`eth_blockNumber` answers) and serving
//! the expected network (`eth_chainId` matches), retrying a bounded
//! number of times with a fixed delay.
//!
//! # Architecture
//!
//! ```text
//! HealthChecker<T: RpcTransport>
//!   ├── check_block_number() ── eth_blockNumber ─┐
//!   ├── check_chain_id()     ── eth_chainId ─────┤
//!   │                                            ▼
//!   │                     RpcTransport::post(body) → raw JSON
//!   │                       └── HttpTransport (hyper, rustls for https)
//!   │                     RpcResponse::into_result → hex string
//!   │                     decode_quantity → u64
//!   └── run_health_check() → ChainStatus | HealthError::Exhausted
//! ```
//!
//! Chain ids are compared as decoded integers only. A node answering
//! `"0x1"` for an expected chain id of `1` is healthy.

pub mod checker;
pub mod error;
pub mod quantity;
pub mod rpc;
pub mod transport;

pub use checker::HealthChecker;
pub use error::{HealthError, HealthResult};
pub use quantity::{decode_quantity, encode_quantity};
pub use transport::{HttpTransport, RpcTransport};
