use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::gateway::error::GatewayError;
use crate::traits::ClaimGateway;
use crate::types::{ClaimReceipt, MembershipProof};

/// One recorded submission.
#[derive(Debug, Clone)]
pub struct SubmittedClaim {
    pub holder_address: String,
    pub token_ids: Vec<u64>,
}

/// What the mock should do with the next submission.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Accept,
    Reject(String),
    /// Never answer, so submission timeouts are testable.
    Hang,
}

/// Mock claim gateway for testing: records every call, replays queued
/// outcomes, accepts by default.
#[derive(Clone)]
pub struct MockClaimGateway {
    calls: Arc<Mutex<Vec<SubmittedClaim>>>,
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
}

impl MockClaimGateway {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn queue_outcome(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<SubmittedClaim> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockClaimGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaimGateway for MockClaimGateway {
    fn name(&self) -> &'static str {
        "mock-gateway"
    }

    async fn submit_claim(
        &self,
        holder_address: &str,
        token_ids: &[u64],
        _proof: &MembershipProof,
    ) -> Result<ClaimReceipt> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(SubmittedClaim {
                holder_address: holder_address.to_string(),
                token_ids: token_ids.to_vec(),
            });
            calls.len()
        };

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockOutcome::Accept);

        match outcome {
            MockOutcome::Accept => Ok(ClaimReceipt {
                tx_hash: format!("0x{call_index:064x}"),
                block_number: Some(call_index as u64),
            }),
            MockOutcome::Reject(reason) => Err(GatewayError::Rejected(reason).into()),
            MockOutcome::Hang => {
                tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
                Err(GatewayError::Timeout.into())
            }
        }
    }
}
