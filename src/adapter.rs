//! Pull-based access to a push-based event source.
//!
//! [`PullAdapter::new`] returns two handles over one shared buffer:
//!
//! - an [`EventSink`] that the upstream source pushes data, end and error
//!   events into, at its own pace
//! - the [`PullAdapter`] itself, which a consumer awaits one item at a time
//!   with [`next`](PullAdapter::next)
//!
//! Every push and every pull re-evaluates the buffer's tides and pauses or
//! resumes the upstream source, so the producer never runs more than the
//! buffer's capacity ahead of the consumer.
//!
//! Everything runs on one thread: the handles are `!Send`, and suspension
//! only happens inside `next()` while the buffer is empty.
//!
//! # Examples
//!
//! ```
//! use fix880::{BufferConfig, PullAdapter, UpstreamSource};
//! use futures::executor::block_on;
//! use std::cell::Cell;
//!
//! #[derive(Default)]
//! struct Parser {
//!     paused: Cell<bool>,
//! }
//!
//! impl UpstreamSource for Parser {
//!     fn pause(&self) { self.paused.set(true) }
//!     fn resume(&self) { self.paused.set(false) }
//!     fn is_paused(&self) -> bool { self.paused.get() }
//!     fn close(&self) {}
//! }
//!
//! let (adapter, sink) = PullAdapter::<&str, String>::new(BufferConfig::default(), Parser::default()).unwrap();
//! sink.data("first").unwrap();
//! sink.data("second").unwrap();
//! sink.end().unwrap();
//!
//! block_on(async {
//!     assert_eq!(adapter.next().await.unwrap(), Some("first"));
//!     assert_eq!(adapter.next().await.unwrap(), Some("second"));
//!     assert_eq!(adapter.next().await.unwrap(), None);
//!     // Completion is sticky
//!     assert_eq!(adapter.next().await.unwrap(), None);
//! });
//! ```

use crate::config::BufferConfig;
use crate::error::{BufferError, PullError, Result};
use crate::event::Event;
use crate::flow::FlowController;
use crate::slot_store::{Delivery, Read, SlotStore};
use crate::source::UpstreamSource;
use futures::stream::{self, Stream};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// How a closed adapter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    /// End of stream was delivered, or the consumer closed the adapter
    Done,
    /// An upstream error was delivered
    Failed,
}

/// Lifecycle of a [`PullAdapter`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Delivering events
    Open,
    /// No further events will be delivered
    Closed(Closure),
}

impl AdapterState {
    /// Whether the adapter has reached its terminal state.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, AdapterState::Closed(_))
    }
}

struct Core<T, E> {
    store: RefCell<SlotStore<T, E>>,
    flow: FlowController,
    source: Box<dyn UpstreamSource>,
    state: Cell<AdapterState>,
}

impl<T, E> Core<T, E> {
    fn is_closed(&self) -> bool {
        self.state.get().is_closed()
    }

    /// Re-evaluate the tides. The store borrow is released before the source
    /// is called.
    fn regulate(&self) {
        let fill = self.store.borrow().fill();
        self.flow.apply(fill, self.source.as_ref());
    }
}

/// Consumer handle: pulls events one at a time.
///
/// Dropping the adapter closes it, as [`close`](PullAdapter::close) does.
pub struct PullAdapter<T, E> {
    core: Rc<Core<T, E>>,
}

/// Producer handle: the upstream source pushes events through it.
pub struct EventSink<T, E> {
    core: Rc<Core<T, E>>,
}

impl<T, E> PullAdapter<T, E> {
    /// Create an adapter over `source`, returning it with the sink the
    /// source must push into.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::InvalidConfig` if `config` does not validate.
    pub fn new<S>(config: BufferConfig, source: S) -> Result<(Self, EventSink<T, E>)>
    where
        S: UpstreamSource + 'static,
    {
        config.validate()?;
        let core = Rc::new(Core {
            store: RefCell::new(SlotStore::new(config.capacity)?),
            flow: FlowController::new(&config),
            source: Box::new(source),
            state: Cell::new(AdapterState::Open),
        });
        let sink = EventSink {
            core: Rc::clone(&core),
        };
        Ok((PullAdapter { core }, sink))
    }

    /// Wait for the next event.
    ///
    /// - `Ok(Some(item))` for a data event
    /// - `Ok(None)` once the stream has ended or the adapter is closed; every
    ///   later call returns `Ok(None)` without touching the source
    /// - `Err(PullError::Upstream(e))` for the upstream error, exactly once;
    ///   later calls return `Ok(None)`
    ///
    /// Only one call may be outstanding at a time.
    ///
    /// # Errors
    ///
    /// Returns `PullError::Upstream` as described above, and
    /// `PullError::Buffer(BufferError::ReentrantRead)` if another `next()` is
    /// still waiting. A rejected call changes nothing.
    pub async fn next(&self) -> std::result::Result<Option<T>, PullError<E>> {
        if self.core.is_closed() {
            return Ok(None);
        }

        let read = self.core.store.borrow_mut().read()?;
        self.core.regulate();

        let event = match read {
            Read::Ready(event) => {
                tracing::trace!(kind = event.kind(), "read immediate");
                event
            },
            Read::Pending(receiver) => {
                tracing::trace!("read delayed, buffer empty");
                match receiver.await {
                    // Handed over, but close() ran before this task resumed
                    Ok(_) if self.core.is_closed() => return Ok(None),
                    Ok(event) => event,
                    // Waiter dropped by close()
                    Err(_) => return Ok(None),
                }
            },
        };

        match event {
            Event::Data(item) => Ok(Some(item)),
            Event::End => {
                self.core.state.set(AdapterState::Closed(Closure::Done));
                tracing::debug!("end of stream delivered");
                Ok(None)
            },
            Event::Error(err) => {
                self.core.state.set(AdapterState::Closed(Closure::Failed));
                tracing::debug!("upstream error delivered");
                Err(PullError::Upstream(err))
            },
        }
    }

    /// Stop early: discard buffered events, close the upstream source and
    /// mark the adapter closed.
    ///
    /// Only the first call on an open adapter has any effect. A pending
    /// [`next`](PullAdapter::next) resolves to `Ok(None)`, even if an event
    /// was already handed to it.
    pub fn close(&self) {
        if self.core.is_closed() {
            return;
        }
        self.core.state.set(AdapterState::Closed(Closure::Done));
        let discarded = self.core.store.borrow_mut().clear();
        tracing::debug!(discarded, "adapter closed by consumer");
        self.core.source.close();
    }

    /// The events as a [`Stream`], ending at completion.
    ///
    /// The stream yields the upstream error once and then ends. It borrows the
    /// adapter, so the owner can still [`close`](PullAdapter::close) it.
    pub fn stream(&self) -> impl Stream<Item = std::result::Result<T, PullError<E>>> + '_ {
        stream::unfold(self, |adapter| async move {
            match adapter.next().await {
                Ok(Some(item)) => Some((Ok(item), adapter)),
                Ok(None) => None,
                Err(err) => Some((Err(err), adapter)),
            }
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AdapterState {
        self.core.state.get()
    }

    /// Whether the adapter is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.core.store.borrow().fill()
    }

    /// Buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.core.store.borrow().capacity()
    }
}

impl<T, E> Drop for PullAdapter<T, E> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T, E> EventSink<T, E> {
    /// Push an event.
    ///
    /// Events pushed after the adapter closed are dropped.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Overflow` if the buffer is full and no reader is
    /// waiting, which means the source ignored a pause.
    pub fn write(&self, event: Event<T, E>) -> Result<()> {
        if self.core.is_closed() {
            tracing::trace!(kind = event.kind(), "adapter closed, dropping event");
            return Ok(());
        }

        let kind = event.kind();
        let delivery = self.core.store.borrow_mut().write(event);
        match delivery {
            Ok(Delivery::Handed) => tracing::trace!(kind, "handed to waiting reader"),
            Ok(Delivery::Buffered) => tracing::trace!(kind, fill = self.buffered(), "buffered"),
            Err(err) => {
                tracing::error!(kind, %err, "event rejected; source ignored pause");
                return Err(err);
            },
        }

        self.core.regulate();
        Ok(())
    }

    /// Push a data event.
    ///
    /// # Errors
    ///
    /// See [`EventSink::write`].
    pub fn data(&self, item: T) -> Result<()> {
        self.write(Event::Data(item))
    }

    /// Push the end-of-stream event.
    ///
    /// # Errors
    ///
    /// See [`EventSink::write`].
    pub fn end(&self) -> Result<()> {
        self.write(Event::End)
    }

    /// Push an error event.
    ///
    /// # Errors
    ///
    /// See [`EventSink::write`].
    pub fn error(&self, err: E) -> Result<()> {
        self.write(Event::Error(err))
    }

    /// Whether the adapter is closed; a source may stop emitting.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.core.store.borrow().fill()
    }
}

impl<T, E> Clone for EventSink<T, E> {
    fn clone(&self) -> Self {
        EventSink {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T, E> fmt::Debug for Core<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("store", &*self.store.borrow())
            .field("flow", &self.flow)
            .field("paused", &self.source.is_paused())
            .field("state", &self.state.get())
            .finish()
    }
}

impl<T, E> fmt::Debug for PullAdapter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullAdapter").field("core", &self.core).finish()
    }
}

impl<T, E> fmt::Debug for EventSink<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("state", &self.core.state.get())
            .finish_non_exhaustive()
    }
}
