//! # Compute Service
//!
//! Transaction runtime around the message server. Owns the dispatcher and
//! the keeper and decides commit or rollback:
//!
//! - every message of a transaction is validated before any is handled
//! - keeper state is checkpointed before the first message
//! - the first failing message reverts the keeper and discards every event
//!   the transaction produced
//! - transactions of a block are processed strictly in sequence; one
//!   failing transaction never aborts the others

use crate::adapters::{InMemoryKeeper, JsonCommandEngine};
use crate::config::ComputeConfig;
use crate::domain::context::{BlockInfo, Context};
use crate::domain::events::Event;
use crate::domain::messages::{MsgResponse, Tx};
use crate::domain::outcome::ReplyPayload;
use crate::domain::validation::ValidateBasic;
use crate::errors::{DecodeError, IpcError, KeeperError, CODESPACE};
use crate::events::{DeliverTxRequest, TxFailure, TxReceipt};
use crate::metrics;
use crate::msg_server::MsgServer;
use crate::ports::inbound::ComputeMsgServer;
use crate::ports::outbound::{Keeper, ReceiptPublisher, Transactional};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Counters kept by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Transactions handed to `deliver_tx`.
    pub txs_delivered: u64,
    /// Transactions committed.
    pub txs_committed: u64,
    /// Transactions rolled back after a keeper failure.
    pub txs_rolled_back: u64,
    /// Transactions rejected before dispatch (decode or validation).
    pub txs_rejected: u64,
    /// Dispatched messages by type.
    pub messages_by_type: BTreeMap<&'static str, u64>,
}

/// Result of delivering a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    /// One response per message; empty unless committed.
    pub responses: Vec<MsgResponse>,
    /// Reply echoes of dispatched messages.
    pub replies: Vec<ReplyPayload>,
    /// Committed events; empty unless committed.
    pub events: Vec<Event>,
    /// First failure, if the transaction did not commit.
    pub failure: Option<TxFailure>,
}

impl TxResult {
    fn rejected(msg_index: usize, err: &KeeperError) -> Self {
        Self {
            responses: Vec::new(),
            replies: Vec::new(),
            events: Vec::new(),
            failure: Some(TxFailure {
                msg_index,
                code: err.code(),
                error: err.to_string(),
                response: None,
            }),
        }
    }

    /// Returns true if the transaction committed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    /// Attach a correlation id, producing the wire receipt.
    #[must_use]
    pub fn into_receipt(self, correlation_id: Uuid) -> TxReceipt {
        let (code, codespace, log) = match &self.failure {
            None => (0, String::new(), String::new()),
            Some(failure) => (
                failure.code,
                CODESPACE.to_string(),
                format!("message {} failed: {}", failure.msg_index, failure.error),
            ),
        };
        TxReceipt {
            correlation_id,
            code,
            codespace,
            log,
            responses: self.responses,
            replies: self.replies,
            failure: self.failure,
            events: self.events,
        }
    }
}

/// Results of a block, in transaction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockResult {
    /// Per-transaction results.
    pub txs: Vec<TxResult>,
}

impl BlockResult {
    /// Number of committed transactions.
    #[must_use]
    pub fn committed(&self) -> usize {
        self.txs.iter().filter(|tx| tx.is_ok()).count()
    }

    /// Number of transactions that did not commit.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.txs.len() - self.committed()
    }
}

/// Transaction runtime for the compute module.
#[derive(Debug)]
pub struct ComputeService<K> {
    server: MsgServer<K>,
    config: ComputeConfig,
    stats: ServiceStats,
}

impl<K: Keeper + Transactional> ComputeService<K> {
    /// Create a service over a keeper.
    pub fn new(keeper: K, config: ComputeConfig) -> Self {
        Self {
            server: MsgServer::new(keeper),
            config,
            stats: ServiceStats::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// Counters since start.
    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// Shared access to the keeper.
    pub fn keeper(&self) -> &K {
        self.server.keeper()
    }

    /// Exclusive access to the keeper (genesis setup, queries).
    pub fn keeper_mut(&mut self) -> &mut K {
        self.server.keeper_mut()
    }

    /// Deliver one transaction atomically.
    #[instrument(skip(self, block, tx), fields(msgs = tx.msgs.len()))]
    pub fn deliver_tx(&mut self, block: &BlockInfo, tx_index: u32, tx: &Tx) -> TxResult {
        self.stats.txs_delivered += 1;

        for (msg_index, msg) in tx.msgs.iter().enumerate() {
            if let Err(err) = msg.validate_basic(&self.config) {
                self.stats.txs_rejected += 1;
                warn!(
                    tx_index,
                    msg_index,
                    sender = %msg.sender(),
                    error = %err,
                    "message rejected"
                );
                return TxResult::rejected(msg_index, &err);
            }
        }

        let snapshot = self.server.keeper().snapshot();
        let mut ctx = Context::new(block.clone(), tx_index);
        let mut responses = Vec::with_capacity(tx.msgs.len());
        let mut replies = Vec::with_capacity(tx.msgs.len());

        for (msg_index, msg) in tx.msgs.iter().enumerate() {
            *self.stats.messages_by_type.entry(msg.kind()).or_default() += 1;

            let outcome = self.server.dispatch(&mut ctx, msg);
            replies.push(ReplyPayload::from_outcome(msg_index, &outcome));

            let (response, error) = outcome.into_parts();
            if let Some(err) = error {
                self.server.keeper_mut().revert(snapshot);
                self.stats.txs_rolled_back += 1;
                metrics::record_tx_rolled_back();
                warn!(
                    tx_index,
                    msg_index,
                    msg_type = msg.type_url(),
                    code = err.code(),
                    error = %err,
                    discarded_events = ctx.event_manager().len(),
                    "transaction rolled back"
                );
                return TxResult {
                    responses: Vec::new(),
                    replies,
                    events: Vec::new(),
                    failure: Some(TxFailure {
                        msg_index,
                        code: err.code(),
                        error: err.to_string(),
                        response: Some(response),
                    }),
                };
            }
            responses.push(response);
        }

        self.stats.txs_committed += 1;
        let events = ctx.into_events();
        debug!(tx_index, msgs = responses.len(), events = events.len(), "transaction committed");

        TxResult {
            responses,
            replies,
            events,
            failure: None,
        }
    }

    /// Deliver every transaction of a block in order.
    #[instrument(skip(self, block, txs), fields(height = block.height, txs = txs.len()))]
    pub fn execute_block(&mut self, block: &BlockInfo, txs: &[Tx]) -> BlockResult {
        let mut result = BlockResult::default();
        for (tx_index, tx) in txs.iter().enumerate() {
            let tx_index = u32::try_from(tx_index).unwrap_or(u32::MAX);
            result.txs.push(self.deliver_tx(block, tx_index, tx));
        }

        info!(
            committed = result.committed(),
            failed = result.failed(),
            "block executed"
        );
        result
    }

    /// Bounded request channel sized by `channel_capacity`, to feed [`Self::run`].
    pub fn request_channel(
        &self,
    ) -> (
        mpsc::Sender<DeliverTxRequest>,
        mpsc::Receiver<DeliverTxRequest>,
    ) {
        mpsc::channel(self.config.channel_capacity)
    }

    /// Decode and deliver one inbound request.
    #[instrument(skip(self, request), fields(correlation_id = %request.correlation_id))]
    pub fn handle_request(&mut self, request: DeliverTxRequest) -> TxReceipt {
        match Tx::decode(request.tx_bytes.as_slice()) {
            Ok(tx) => self
                .deliver_tx(&request.block, request.tx_index, &tx)
                .into_receipt(request.correlation_id),
            Err(err) => {
                self.stats.txs_delivered += 1;
                self.stats.txs_rejected += 1;
                warn!(error = %err, "undecodable transaction");
                decode_failure_receipt(request.correlation_id, &err)
            }
        }
    }

    /// Serve requests until the channel closes, publishing one receipt per
    /// request in arrival order.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error if a receipt cannot be delivered.
    pub async fn run<P: ReceiptPublisher + ?Sized>(
        &mut self,
        mut rx: mpsc::Receiver<DeliverTxRequest>,
        publisher: &P,
    ) -> Result<(), IpcError> {
        info!("compute service started");

        while let Some(request) = rx.recv().await {
            let receipt = self.handle_request(request);
            if let Err(err) = publisher.publish(receipt).await {
                error!(error = %err, "failed to publish receipt");
                return Err(err);
            }
        }

        info!(
            delivered = self.stats.txs_delivered,
            committed = self.stats.txs_committed,
            "request channel closed, compute service stopping"
        );
        Ok(())
    }
}

fn decode_failure_receipt(correlation_id: Uuid, err: &DecodeError) -> TxReceipt {
    TxReceipt {
        correlation_id,
        code: err.code(),
        codespace: CODESPACE.to_string(),
        log: err.to_string(),
        responses: Vec::new(),
        replies: Vec::new(),
        failure: None,
        events: Vec::new(),
    }
}

/// Service over the in-memory keeper and the JSON command engine.
pub fn create_test_service() -> ComputeService<InMemoryKeeper<JsonCommandEngine>> {
    let config = ComputeConfig::default();
    let keeper = InMemoryKeeper::with_config(JsonCommandEngine::new(), &config);
    ComputeService::new(keeper, config)
}

// =============================================================================
// TESTS
// =============================================================================
