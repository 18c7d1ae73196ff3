//! The upstream source capability and a reference source over an iterator.
//!
//! An upstream source is whatever produces events at its own pace: a record
//! parser reading a file, a socket decoder, a test fixture. The adapter never
//! owns its lifecycle; it only asks it to pause, resume and close through
//! [`UpstreamSource`]. Events themselves travel the other way, through an
//! [`EventSink`](crate::adapter::EventSink).
//!
//! Sources are shared between the adapter (which controls them) and the task
//! that drives them, so every method takes `&self` and implementations keep
//! their state in `Cell`s. A source held in an [`Rc`] is itself a source.
//!
//! # Contract
//!
//! - Exactly one terminal event (end or error), and no data after it
//! - At most a small, bounded number of events after `pause()`
//! - `close()` stops emission and is idempotent

use crate::adapter::EventSink;
use crate::error::Result;
use futures::future::poll_fn;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::task::{Poll, Waker};

/// Control surface of a push-based event producer.
pub trait UpstreamSource {
    /// Stop emitting events until [`resume`](UpstreamSource::resume).
    fn pause(&self);

    /// Emit events again.
    fn resume(&self);

    /// Whether the source is currently paused.
    fn is_paused(&self) -> bool;

    /// Stop emitting for good and release resources. Idempotent.
    fn close(&self);
}

impl<S: UpstreamSource + ?Sized> UpstreamSource for Rc<S> {
    fn pause(&self) {
        (**self).pause();
    }

    fn resume(&self) {
        (**self).resume();
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn close(&self) {
        (**self).close();
    }
}

/// Upstream source emitting the items of an iterator.
///
/// `Ok` items become data events, the first `Err` becomes the error event,
/// and exhaustion becomes the end event. [`IterSource::run`] emits one event
/// per turn of the executor, waits while paused, and stops once closed.
///
/// # Examples
///
/// ```
/// use fix880::{BufferConfig, IterSource, PullAdapter};
/// use futures::executor::LocalPool;
/// use futures::task::LocalSpawnExt;
/// use std::rc::Rc;
///
/// let source = Rc::new(IterSource::new(vec![Ok::<_, String>(1), Ok(2)]));
/// let (adapter, sink) = PullAdapter::new(BufferConfig::default(), Rc::clone(&source)).unwrap();
///
/// let mut pool = LocalPool::new();
/// pool.spawner()
///     .spawn_local(async move {
///         let _ = source.run(&sink).await;
///     })
///     .unwrap();
///
/// let items = pool.run_until(async {
///     let mut items = Vec::new();
///     while let Some(item) = adapter.next().await.unwrap() {
///         items.push(item);
///     }
///     items
/// });
/// assert_eq!(items, vec![1, 2]);
/// ```
pub struct IterSource<I> {
    items: RefCell<I>,
    paused: Cell<bool>,
    closed: Cell<bool>,
    emitted: Cell<usize>,
    resume_waker: RefCell<Option<Waker>>,
}

impl<I> IterSource<I> {
    /// Number of events emitted so far, terminal event included.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted.get()
    }

    /// Whether [`close`](UpstreamSource::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn wake(&self) {
        if let Some(waker) = self.resume_waker.borrow_mut().take() {
            waker.wake();
        }
    }

    async fn flowing(&self) {
        poll_fn(|cx| {
            if !self.paused.get() || self.closed.get() {
                Poll::Ready(())
            } else {
                *self.resume_waker.borrow_mut() = Some(cx.waker().clone());
                Poll::Pending
            }
        })
        .await;
    }
}

impl<I, T, E> IterSource<I>
where
    I: Iterator<Item = std::result::Result<T, E>>,
{
    /// Create a source over `items`.
    pub fn new(items: impl IntoIterator<IntoIter = I>) -> Self {
        IterSource {
            items: RefCell::new(items.into_iter()),
            paused: Cell::new(false),
            closed: Cell::new(false),
            emitted: Cell::new(0),
            resume_waker: RefCell::new(None),
        }
    }

    /// Emit every item into `sink`, honoring pause and close.
    ///
    /// Returns the number of events emitted during this run.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Overflow` if the sink rejects an event.
    pub async fn run(&self, sink: &EventSink<T, E>) -> Result<usize> {
        let start = self.emitted.get();
        loop {
            self.flowing().await;
            if self.closed.get() || sink.is_closed() {
                tracing::debug!(emitted = self.emitted.get() - start, "source closed, stopping");
                break;
            }

            let next = self.items.borrow_mut().next();
            self.emitted.set(self.emitted.get() + 1);
            match next {
                Some(Ok(item)) => sink.data(item)?,
                Some(Err(err)) => {
                    sink.error(err)?;
                    break;
                },
                None => {
                    sink.end()?;
                    break;
                },
            }

            yield_now().await;
        }
        Ok(self.emitted.get() - start)
    }
}

impl<I> UpstreamSource for IterSource<I> {
    fn pause(&self) {
        self.paused.set(true);
    }

    fn resume(&self) {
        self.paused.set(false);
        self.wake();
    }

    fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn close(&self) {
        self.closed.set(true);
        self.wake();
    }
}

impl<I> fmt::Debug for IterSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterSource")
            .field("paused", &self.paused.get())
            .field("closed", &self.closed.get())
            .field("emitted", &self.emitted.get())
            .finish_non_exhaustive()
    }
}

/// Give the executor one turn so a waiting consumer can run.
async fn yield_now() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}
