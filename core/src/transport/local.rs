// ## 📂 File: `src/transport/local.rs`
// ## In-process worker set over crossbeam channels

//! One unbounded crossbeam channel per ordered (sender, receiver) pair gives
//! reliable FIFO delivery per pair, which is all the protocol relies on.
//! Each rank also owns an abort channel; every blocking receive selects on it,
//! so a coordinated abort wakes whoever is waiting.

use std::sync::{Arc, OnceLock};

use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::warn;

use crate::constants::MAX_WORKERS;
use crate::transport::types::{AbortSignal, Communicator, Envelope, Message, Tag, TransportError};

/// Factory for a fixed-size in-process worker set.
pub struct LocalWorld;

impl LocalWorld {
    /// Build `size` fully connected endpoints, indexed by rank.
    pub fn create(size: usize) -> Result<Vec<LocalEndpoint>, TransportError> {
        if size == 0 || size > MAX_WORKERS {
            return Err(TransportError::InvalidWorld(format!(
                "worker count {size} outside 1..={MAX_WORKERS}"
            )));
        }

        // outboxes[src][dst] / inboxes[dst][src]
        let mut outboxes: Vec<Vec<Sender<Envelope>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inboxes: Vec<Vec<Receiver<Envelope>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = unbounded();
                outboxes[src].push(tx);
                inboxes[dst].push(rx);
            }
        }

        let (abort_txs, abort_rxs): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded::<()>()).unzip();
        let abort_txs = Arc::new(abort_txs);
        let abort_state = Arc::new(OnceLock::new());

        let endpoints = outboxes
            .into_iter()
            .zip(inboxes)
            .zip(abort_rxs)
            .enumerate()
            .map(|(rank, ((outboxes, inboxes), abort_rx))| LocalEndpoint {
                rank,
                size,
                outboxes,
                inboxes,
                abort_txs: Arc::clone(&abort_txs),
                abort_rx,
                abort_state: Arc::clone(&abort_state),
            })
            .collect();

        Ok(endpoints)
    }
}

/// One rank's view of the in-process worker set.
///
/// Owned by exactly one worker thread; dropping it disconnects that rank's
/// outgoing links (already-sent messages are still delivered).
pub struct LocalEndpoint {
    rank: usize,
    size: usize,
    outboxes: Vec<Sender<Envelope>>,
    inboxes: Vec<Receiver<Envelope>>,
    abort_txs: Arc<Vec<Sender<()>>>,
    abort_rx: Receiver<()>,
    abort_state: Arc<OnceLock<AbortSignal>>,
}

impl LocalEndpoint {
    fn check_rank(&self, rank: usize) -> Result<(), TransportError> {
        if rank >= self.size {
            return Err(TransportError::InvalidRank { rank, size: self.size });
        }
        Ok(())
    }

    fn check_aborted(&self) -> Result<(), TransportError> {
        match self.abort_state.get() {
            Some(sig) => Err(sig.clone().into()),
            None => Ok(()),
        }
    }

    fn aborted_error(&self) -> TransportError {
        match self.abort_state.get() {
            Some(sig) => sig.clone().into(),
            None => TransportError::Aborted { by: self.rank, reason: "abort signalled".into() },
        }
    }
}

impl Communicator for LocalEndpoint {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, dest: usize, message: Message) -> Result<(), TransportError> {
        self.check_rank(dest)?;
        self.check_aborted()?;

        self.outboxes[dest]
            .send(Envelope { from: self.rank, message })
            .map_err(|_| TransportError::Disconnected { peer: dest })
    }

    fn recv(&self, src: usize, expected: Tag) -> Result<Message, TransportError> {
        self.check_rank(src)?;
        self.check_aborted()?;

        let inbox = &self.inboxes[src];
        crossbeam::select! {
            recv(inbox) -> envelope => {
                let envelope = envelope.map_err(|_| TransportError::Disconnected { peer: src })?;
                let got = envelope.message.tag();
                if got != expected {
                    return Err(TransportError::UnexpectedMessage { from: envelope.from, expected, got });
                }
                Ok(envelope.message)
            }
            recv(self.abort_rx) -> _ => Err(self.aborted_error()),
        }
    }

    fn abort(&self, reason: &str) {
        let signal = AbortSignal { from: self.rank, reason: reason.to_string() };
        if self.abort_state.set(signal).is_ok() {
            warn!(rank = self.rank, reason, "aborting worker set");
            for tx in self.abort_txs.iter() {
                let _ = tx.send(());
            }
        }
    }
}
