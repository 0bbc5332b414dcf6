//! Debounced event queue.
//!
//! Callers push events through a cloneable [`EventSender`]; a single consumer
//! thread owns the [`ContentTypesGenerator`] and runs one batch at a time.
//!
//! ```text
//! EventSender ──┐
//! EventSender ──┼──► mpsc ──► Debouncer ──(quiet period)──► run_events
//! watcher ──────┘
//! ```
//!
//! Every event restarts the quiet period, so a burst becomes one batch.
//! Events arriving while a batch runs wait for the next one.

use super::{
    event::{BatchReport, EventOpts, QueuedEvent, RawContentEvent, RunMode},
    generator::ContentTypesGenerator,
};
use crate::log;
use anyhow::{Context, Result, anyhow};
use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// How long the consumer sleeps when nothing is pending.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// Debounce State
// =============================================================================

/// Accumulates items until no new one arrived for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
    pending: Vec<T>,
    last_event: Option<Instant>,
    delay: Duration,
}

impl<T> Debouncer<T> {
    pub const fn new(delay: Duration) -> Self {
        Self {
            pending: Vec::new(),
            last_event: None,
            delay,
        }
    }

    /// Append an item and restart the quiet period.
    pub fn add(&mut self, item: T) {
        self.pending.push(item);
        self.last_event = Some(Instant::now());
    }

    pub fn ready(&self) -> bool {
        !self.pending.is_empty() && self.last_event.is_some_and(|t| t.elapsed() >= self.delay)
    }

    /// Take the whole batch, leaving an empty one behind.
    pub fn take(&mut self) -> Vec<T> {
        self.last_event = None;
        std::mem::take(&mut self.pending)
    }

    /// Time until the batch becomes ready, or a long idle wait.
    pub fn timeout(&self) -> Duration {
        match self.last_event {
            Some(t) if !self.pending.is_empty() => self.delay.saturating_sub(t.elapsed()),
            _ => IDLE_TIMEOUT,
        }
    }
}

// =============================================================================
// Queue
// =============================================================================

#[derive(Debug)]
enum Message {
    Event(QueuedEvent),
    Close,
}

/// Cloneable handle for pushing events into the queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<Message>,
    content_dir: PathBuf,
}

impl EventSender {
    /// Queue an event. Never blocks.
    ///
    /// Returns `false` when the event was dropped: its path lies outside the
    /// content root, or the queue is closed.
    pub fn queue_event(&self, raw: RawContentEvent, opts: Option<EventOpts>) -> bool {
        let event = raw.normalize();
        if !event.is_within(&self.content_dir) {
            return false;
        }

        let queued = QueuedEvent {
            event,
            opts: opts.unwrap_or_default(),
        };
        self.tx.send(Message::Event(queued)).is_ok()
    }
}

/// The running queue: its sender and the consumer thread.
pub struct EventQueue {
    sender: EventSender,
    handle: JoinHandle<ContentTypesGenerator>,
}

impl EventQueue {
    /// Start the consumer thread. Batches run in lenient mode.
    #[cfg(test)]
    pub fn spawn(generator: ContentTypesGenerator, delay: Duration) -> Result<Self> {
        Self::spawn_with(generator, delay, |_| {})
    }

    /// Like [`EventQueue::spawn`], calling `on_batch` after every batch.
    pub fn spawn_with<F>(generator: ContentTypesGenerator, delay: Duration, on_batch: F) -> Result<Self>
    where
        F: FnMut(&BatchReport) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let content_dir = generator.context().paths.content_dir.clone();

        let handle = thread::Builder::new()
            .name("content-queue".into())
            .spawn(move || consume(generator, &rx, delay, on_batch))
            .context("Failed to spawn content queue thread")?;

        Ok(Self {
            sender: EventSender { tx, content_dir },
            handle,
        })
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// See [`EventSender::queue_event`].
    #[cfg(test)]
    pub fn queue_event(&self, raw: RawContentEvent, opts: Option<EventOpts>) -> bool {
        self.sender.queue_event(raw, opts)
    }

    /// Run whatever is pending, stop the consumer and hand the generator back.
    pub fn close(self) -> Result<ContentTypesGenerator> {
        // The consumer may already be gone after a disconnect; join reports that
        self.sender.tx.send(Message::Close).ok();
        self.handle
            .join()
            .map_err(|_| anyhow!("content queue thread panicked"))
    }
}

fn consume<F>(
    mut generator: ContentTypesGenerator,
    rx: &Receiver<Message>,
    delay: Duration,
    mut on_batch: F,
) -> ContentTypesGenerator
where
    F: FnMut(&BatchReport),
{
    let mut debouncer = Debouncer::new(delay);

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Message::Event(event)) => debouncer.add(event),
            Ok(Message::Close) | Err(RecvTimeoutError::Disconnected) => {
                flush(&mut generator, &mut debouncer, &mut on_batch);
                break;
            }
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                flush(&mut generator, &mut debouncer, &mut on_batch);
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    generator
}

/// Run the pending batch. The options of the last queued event gate the
/// batch-level warnings.
fn flush<F>(
    generator: &mut ContentTypesGenerator,
    debouncer: &mut Debouncer<QueuedEvent>,
    on_batch: &mut F,
) where
    F: FnMut(&BatchReport),
{
    let batch = debouncer.take();
    let Some(opts) = batch.last().map(|queued| queued.opts) else {
        return;
    };

    match generator.run_events(batch, opts, RunMode::Lenient) {
        Ok(report) => on_batch(&report),
        Err(err) => log!("error"; "content update failed: {err:#}"),
    }
}
