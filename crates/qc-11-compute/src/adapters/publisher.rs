//! Receipt publisher backed by a bounded tokio channel.

use crate::errors::IpcError;
use crate::events::TxReceipt;
use crate::ports::outbound::ReceiptPublisher;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Forwards receipts to an `mpsc` receiver, preserving order.
#[derive(Clone, Debug)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<TxReceipt>,
}

impl ChannelPublisher {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<TxReceipt>) -> Self {
        Self { tx }
    }

    /// Create a publisher together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TxReceipt>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ReceiptPublisher for ChannelPublisher {
    async fn publish(&self, receipt: TxReceipt) -> Result<(), IpcError> {
        self.tx
            .send(receipt)
            .await
            .map_err(|_| IpcError::ChannelClosed)
    }
}
