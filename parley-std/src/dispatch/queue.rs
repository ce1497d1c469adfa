//! Serialized dispatch.
//!
//! Producers prepare requests on their own task and enqueue the bound
//! context. One consumer task runs queued requests strictly one at a time,
//! so outcomes are produced in submission order across all producers.
//!
//! The queue is unbounded and applies no backpressure. [`QueueDispatcher::pending`]
//! reports how many requests are waiting so callers can shed load
//! themselves.

use super::{Dispatcher, Prepared};
use parley_core::{Outcome, TokenizeError};
use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors raised by [`QueueDispatcher`].
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The input was malformed.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// The consumer has stopped.
    #[error("dispatch queue is closed")]
    Closed,
}

struct Job {
    prepared: Prepared,
    cancel: CancellationToken,
    reply: oneshot::Sender<Outcome>,
}

/// A FIFO front for a [`Dispatcher`].
pub struct QueueDispatcher {
    tx: mpsc::UnboundedSender<Job>,
    dispatcher: Dispatcher,
    pending: Arc<AtomicUsize>,
    consumer: JoinHandle<()>,
}

impl QueueDispatcher {
    /// Start the consumer task on the current runtime.
    pub fn spawn(dispatcher: Dispatcher) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let pending = Arc::new(AtomicUsize::new(0));

        let consumer = tokio::spawn({
            let dispatcher = dispatcher.clone();
            let pending = pending.clone();
            async move {
                while let Some(job) = rx.recv().await {
                    pending.fetch_sub(1, Ordering::AcqRel);
                    let outcome = dispatcher.run(job.prepared, &job.cancel).await;
                    // the submitter may have dropped its ticket
                    let _ = job.reply.send(outcome);
                }
                debug!("dispatch queue drained");
            }
        });

        Self {
            tx,
            dispatcher,
            pending,
            consumer,
        }
    }

    /// Prepare `input` on the calling task and enqueue it.
    ///
    /// Lexical errors are returned immediately. Requests that resolve to an
    /// early outcome skip the queue and their ticket is ready at once.
    pub fn submit(
        &self,
        input: impl Into<Arc<str>>,
        cancel: CancellationToken,
    ) -> Result<Ticket, DispatchError> {
        let prepared = self.dispatcher.prepare(input, &cancel)?;
        let (reply, rx) = oneshot::channel();

        if let Prepared::Done(outcome) = prepared {
            let _ = reply.send(outcome);
            return Ok(Ticket { rx });
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        let job = Job {
            prepared,
            cancel,
            reply,
        };
        if self.tx.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(DispatchError::Closed);
        }
        Ok(Ticket { rx })
    }

    /// Requests queued but not yet started.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// The dispatcher behind the queue.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Stop accepting work, run everything already queued, then stop the
    /// consumer.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.consumer.await {
            debug!(error = %err, "dispatch consumer ended abnormally");
        }
    }
}

/// Resolves to the outcome of one queued request.
///
/// Dropping a ticket does not cancel the request; use its cancellation token.
#[must_use = "dropping a ticket discards the outcome, not the request"]
#[derive(Debug)]
pub struct Ticket {
    rx: oneshot::Receiver<Outcome>,
}

impl Future for Ticket {
    type Output = Result<Outcome, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| DispatchError::Closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Journal;
    use parley_core::{Command, Invocation, Parameter, Reply};
    use tokio::sync::Notify;

    fn recorder(journal: &Journal) -> Command {
        let journal = journal.clone();
        Command::builder("log")
            .parameter(Parameter::of::<u32>("n"))
            .handler(move |mut inv: Invocation| {
                let journal = journal.clone();
                async move {
                    let n: u32 = inv.arguments.require("n")?;
                    tokio::task::yield_now().await;
                    journal.record(n.to_string());
                    Ok::<_, parley_core::ArgumentError>(Reply::empty())
                }
            })
            .build()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fifo_across_submissions() {
        let journal = Journal::new();
        let queue = QueueDispatcher::spawn(
            Dispatcher::builder().commands([recorder(&journal)]).build(),
        );

        let tickets: Vec<_> = (0..20)
            .map(|n| queue.submit(format!("log {n}"), CancellationToken::new()).unwrap())
            .collect();
        for ticket in tickets {
            assert!(ticket.await.unwrap().is_success());
        }

        let expected: Vec<String> = (0..20).map(|n| n.to_string()).collect();
        assert_eq!(journal.entries(), expected);
        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_early_outcomes_skip_the_queue() {
        let queue = QueueDispatcher::spawn(Dispatcher::builder().build());
        let outcome = queue
            .submit("missing", CancellationToken::new())
            .unwrap()
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::NotFound));
        assert_eq!(queue.pending(), 0);

        let err = queue.submit("\"open", CancellationToken::new()).unwrap_err();
        assert!(matches!(err, DispatchError::Tokenize(_)));
    }

    #[tokio::test]
    async fn test_pending_counts_waiting_requests() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let command = Command::builder("slow")
            .handler({
                let entered = entered.clone();
                let release = release.clone();
                move |_: Invocation| {
                    let entered = entered.clone();
                    let release = release.clone();
                    async move {
                        entered.notify_one();
                        release.notified().await;
                    }
                }
            })
            .build()
            .unwrap();
        let queue = QueueDispatcher::spawn(Dispatcher::builder().commands([command]).build());

        let first = queue.submit("slow", CancellationToken::new()).unwrap();
        entered.notified().await;
        let second = queue.submit("slow", CancellationToken::new()).unwrap();
        let third = queue.submit("slow", CancellationToken::new()).unwrap();
        assert_eq!(queue.pending(), 2);

        release.notify_one();
        assert!(first.await.unwrap().is_success());
        entered.notified().await;
        release.notify_one();
        assert!(second.await.unwrap().is_success());
        entered.notified().await;
        release.notify_one();
        assert!(third.await.unwrap().is_success());
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let journal = Journal::new();
        let queue = QueueDispatcher::spawn(
            Dispatcher::builder().commands([recorder(&journal)]).build(),
        );
        let tickets: Vec<_> = (0..3)
            .map(|n| queue.submit(format!("log {n}"), CancellationToken::new()).unwrap())
            .collect();
        queue.shutdown().await;

        assert_eq!(journal.entries(), ["0", "1", "2"]);
        for ticket in tickets {
            assert!(ticket.await.unwrap().is_success());
        }
    }
}
