//! The confirmation tracker: polls signature statuses until they reach a
//! requested commitment level and notifies the subscriber.
//!
//! Each subscription runs as its own task owning its remaining-signature
//! set; nothing is shared. On every tick the task partitions the polled
//! statuses three ways:
//!
//! * **failed**: a non-null `err`; dropped silently,
//! * **done**: the status satisfies the requested commitment; sent to
//!   the subscriber, preserving the order the RPC returned,
//! * **retry**: everything else, null statuses included; polled again
//!   after the interval.
//!
//! The task ends when nothing is left to retry, or when the subscriber
//! drops the receiving end.

use {
    crate::rpc_client::RpcClient,
    log::*,
    lumos_sdk::{commitment_config::CommitmentLevel, signature::Signature},
    std::time::Duration,
    tokio::sync::mpsc,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How deep the notification mailbox buffers before the poller awaits the
/// subscriber.
const NOTIFICATION_BUFFER: usize = 16;

#[derive(Debug, Clone)]
pub struct SignatureSubscription {
    pub signatures: Vec<Signature>,
    pub commitment: CommitmentLevel,
    pub poll_interval: Duration,
}

impl SignatureSubscription {
    pub fn new(signatures: Vec<Signature>, commitment: CommitmentLevel) -> Self {
        Self {
            signatures,
            commitment,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Spawn a tracking task for `subscription`; confirmed signatures arrive
/// on the returned channel in batches, in confirmation order.
pub fn track(client: RpcClient, subscription: SignatureSubscription) -> mpsc::Receiver<Vec<Signature>> {
    let (notifications, receiver) = mpsc::channel(NOTIFICATION_BUFFER);
    tokio::spawn(run(client, subscription, notifications));
    receiver
}

async fn run(
    client: RpcClient,
    subscription: SignatureSubscription,
    notifications: mpsc::Sender<Vec<Signature>>,
) {
    let SignatureSubscription {
        mut signatures,
        commitment,
        poll_interval,
    } = subscription;

    while !signatures.is_empty() {
        tokio::time::sleep(poll_interval).await;

        let statuses = match client.get_signature_statuses(&signatures).await {
            Ok(response) => response.value,
            Err(err) => {
                warn!("signature status poll failed, will retry: {err}");
                continue;
            }
        };

        let mut done = Vec::new();
        let mut retry = Vec::new();
        for (signature, status) in signatures.iter().zip(statuses) {
            match status {
                Some(status) if status.err.is_some() => {
                    debug!("signature {signature} failed on-chain, dropping");
                }
                Some(status) if status.satisfies_commitment(commitment) => {
                    done.push(*signature);
                }
                _ => retry.push(*signature),
            }
        }

        if !done.is_empty() && notifications.send(done).await.is_err() {
            // subscriber went away; polling for no one
            break;
        }
        signatures = retry;
    }
}
