//! Fixed-capacity ring buffer of tagged event slots.
//!
//! The [`SlotStore`] holds events pushed by the upstream source until the
//! consumer pulls them. It also holds at most one *waiter*: the sending half
//! of a oneshot channel, parked when a read finds the buffer empty. The next
//! write goes straight to the waiter instead of into a slot, so a waiter can
//! only exist while `fill == 0` and the bypass can never overtake buffered
//! events.
//!
//! Both cursors advance modulo `2 * capacity`; the slot index is the cursor
//! modulo `capacity`. Occupancy is always derived from the two cursors, which
//! keeps a full buffer distinguishable from an empty one without giving up a
//! slot.
//!
//! The store does not talk to the upstream source. Flow control is applied
//! by the adapter after each successful [`write`](SlotStore::write) or
//! [`read`](SlotStore::read).

use crate::error::{BufferError, Result};
use crate::event::{Event, Slot};
use futures::channel::oneshot;
use std::fmt;

/// Outcome of [`SlotStore::read`].
#[derive(Debug)]
pub enum Read<T, E> {
    /// An event was buffered and has been removed from its slot.
    Ready(Event<T, E>),
    /// The buffer was empty; the next written event will arrive here.
    Pending(oneshot::Receiver<Event<T, E>>),
}

/// Where [`SlotStore::write`] put an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed directly to a parked reader
    Handed,
    /// Stored in a slot
    Buffered,
}

/// Ring buffer of [`Slot`]s with a single parked reader.
pub struct SlotStore<T, E> {
    slots: Box<[Slot<T, E>]>,
    write_cursor: usize,
    read_cursor: usize,
    waiter: Option<oneshot::Sender<Event<T, E>>>,
}

impl<T, E> SlotStore<T, E> {
    /// Create an empty store with `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::InvalidConfig` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(SlotStore {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
            write_cursor: 0,
            read_cursor: 0,
            waiter: None,
        })
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of buffered events.
    #[must_use]
    pub fn fill(&self) -> usize {
        let span = 2 * self.capacity();
        (self.write_cursor + span - self.read_cursor) % span
    }

    /// Number of free slots.
    #[must_use]
    pub fn free(&self) -> usize {
        self.capacity() - self.fill()
    }

    /// Whether no events are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fill() == 0
    }

    /// Whether every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.fill() == self.capacity()
    }

    /// Slot index the next buffered write will use.
    #[must_use]
    pub fn write_index(&self) -> usize {
        self.write_cursor % self.capacity()
    }

    /// Slot index the next buffered read will use.
    #[must_use]
    pub fn read_index(&self) -> usize {
        self.read_cursor % self.capacity()
    }

    /// Whether a reader is parked and still listening.
    #[must_use]
    pub fn has_waiter(&self) -> bool {
        self.waiter
            .as_ref()
            .is_some_and(|waiter| !waiter.is_canceled())
    }

    /// Store an event, or hand it to the parked reader if there is one.
    ///
    /// A parked reader that has gone away (its receiver was dropped) is
    /// discarded and the event is buffered instead.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::Overflow` if every slot is occupied and no reader
    /// is parked. The event is not stored.
    pub fn write(&mut self, event: Event<T, E>) -> Result<Delivery> {
        let event = match self.waiter.take() {
            Some(waiter) => match waiter.send(event) {
                Ok(()) => return Ok(Delivery::Handed),
                Err(unsent) => unsent,
            },
            None => event,
        };

        if self.is_full() {
            return Err(BufferError::Overflow {
                capacity: self.capacity(),
            });
        }

        let index = self.write_index();
        debug_assert!(self.slots[index].is_empty());
        self.slots[index] = event.into();
        self.write_cursor = self.advance(self.write_cursor);
        Ok(Delivery::Buffered)
    }

    /// Take the oldest buffered event, or park a reader if none is buffered.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::ReentrantRead` if a reader is already parked.
    /// Nothing is mutated in that case.
    pub fn read(&mut self) -> Result<Read<T, E>> {
        if let Some(waiter) = &self.waiter {
            if !waiter.is_canceled() {
                return Err(BufferError::ReentrantRead);
            }
            // Reader went away before anything arrived
            self.waiter = None;
        }

        if self.is_empty() {
            let (sender, receiver) = oneshot::channel();
            self.waiter = Some(sender);
            return Ok(Read::Pending(receiver));
        }

        let index = self.read_index();
        let Some(event) = self.slots[index].take() else {
            unreachable!("slot {index} is inside the occupied range but empty");
        };
        self.read_cursor = self.advance(self.read_cursor);
        Ok(Read::Ready(event))
    }

    /// Drop every buffered event and any parked reader.
    ///
    /// Returns the number of events discarded. A parked reader observes the
    /// drop as a cancelled receiver.
    pub fn clear(&mut self) -> usize {
        let discarded = self.fill();
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.read_cursor = self.write_cursor;
        self.waiter = None;
        discarded
    }

    fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % (2 * self.capacity())
    }
}

impl<T, E> fmt::Debug for SlotStore<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotStore")
            .field("capacity", &self.capacity())
            .field("fill", &self.fill())
            .field("write_index", &self.write_index())
            .field("read_index", &self.read_index())
            .field("has_waiter", &self.has_waiter())
            .finish()
    }
}
