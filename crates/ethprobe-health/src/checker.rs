//! Health check operations and the bounded retry loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use ethprobe_core::{ChainStatus, RetryPolicy, RpcEndpoint, describe_chain};

use crate::error::{HealthError, HealthResult};
use crate::quantity::decode_quantity;
use crate::rpc::{ETH_BLOCK_NUMBER, ETH_CHAIN_ID, RpcRequest, RpcResponse};
use crate::transport::{HttpTransport, RpcTransport};

/// Probes a single JSON-RPC endpoint for liveness and chain identity.
pub struct HealthChecker<T> {
    endpoint: RpcEndpoint,
    transport: T,
    next_id: AtomicU64,
}

impl HealthChecker<HttpTransport> {
    /// Checker over HTTP(S) with the given per-request timeout.
    pub fn http(endpoint: RpcEndpoint, request_timeout: Duration) -> Self {
        let transport = HttpTransport::new(endpoint.clone(), request_timeout);
        Self::new(endpoint, transport)
    }
}

impl<T: RpcTransport> HealthChecker<T> {
    /// `endpoint` is used for log context; `transport` must already be
    /// bound to it.
    pub fn new(endpoint: RpcEndpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    /// Current head block of the node (`eth_blockNumber`).
    pub async fn check_block_number(&self) -> HealthResult<u64> {
        let block_number = self.call_quantity(ETH_BLOCK_NUMBER).await?;
        debug!(endpoint = %self.endpoint, block_number, "block number");
        Ok(block_number)
    }

    /// Chain id of the node (`eth_chainId`), which must equal `expected`.
    pub async fn check_chain_id(&self, expected: u64) -> HealthResult<u64> {
        let actual = self.call_quantity(ETH_CHAIN_ID).await?;
        if actual != expected {
            return Err(HealthError::NetworkMismatch { expected, actual });
        }
        debug!(endpoint = %self.endpoint, chain_id = actual, "chain id matches");
        Ok(actual)
    }

    /// Run both checks until one attempt passes them both, or give up
    /// after `policy.max_attempts`.
    ///
    /// Sleeps `policy.retry_delay` between attempts, never after the last
    /// one. A chain id mismatch is retried like any other failure unless
    /// `policy.fail_fast_on_mismatch` is set.
    pub async fn run_health_check(
        &self,
        expected_chain_id: u64,
        policy: &RetryPolicy,
    ) -> HealthResult<ChainStatus> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        info!(
            endpoint = %self.endpoint,
            expected_chain = %describe_chain(expected_chain_id),
            max_attempts,
            "starting health check"
        );

        loop {
            let err = match self.attempt(expected_chain_id).await {
                Ok(status) => {
                    info!(
                        endpoint = %self.endpoint,
                        attempt,
                        block_number = status.block_number,
                        chain = %describe_chain(status.chain_id),
                        "node is healthy"
                    );
                    return Ok(status);
                }
                Err(err) => err,
            };

            warn!(
                endpoint = %self.endpoint,
                attempt,
                max_attempts,
                error = %err,
                "health check attempt failed"
            );

            if policy.fail_fast_on_mismatch && matches!(err, HealthError::NetworkMismatch { .. }) {
                error!(endpoint = %self.endpoint, "wrong network, not retrying");
                return Err(err);
            }

            if attempt >= max_attempts {
                error!(endpoint = %self.endpoint, attempts = attempt, "health check exhausted");
                return Err(HealthError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            debug!(delay = ?policy.retry_delay, next_attempt = attempt + 1, "retrying");
            tokio::time::sleep(policy.retry_delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, expected_chain_id: u64) -> HealthResult<ChainStatus> {
        let block_number = self.check_block_number().await?;
        let chain_id = self.check_chain_id(expected_chain_id).await?;
        Ok(ChainStatus {
            block_number,
            chain_id,
        })
    }

    async fn call_quantity(&self, method: &str) -> HealthResult<u64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::to_vec(&RpcRequest::new(method, id))
            .map_err(|e| HealthError::Protocol(format!("{method}: failed to encode request: {e}")))?;

        let raw = self.transport.post(Bytes::from(body)).await?;
        let hex = RpcResponse::from_slice(method, &raw)?.into_result(method)?;
        decode_quantity(&hex)
    }
}
