//! Events pushed by an upstream source and the slots that hold them.
//!
//! An [`Event`] is one unit handed from the upstream source to the buffer: a
//! data item, the end-of-stream marker, or an error. A [`Slot`] is one ring
//! buffer position and may also be [`Slot::Empty`]. The explicit tag keeps
//! "nothing buffered" apart from "a data event whose payload is empty".

/// One event from the upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T, E> {
    /// A data item
    Data(T),
    /// End of stream; no further events follow
    End,
    /// Upstream failure; no further events follow
    Error(E),
}

impl<T, E> Event<T, E> {
    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Data(_))
    }

    /// Short name of the event kind, for log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Data(_) => "data",
            Event::End => "end",
            Event::Error(_) => "error",
        }
    }
}

/// One position in the ring buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T, E> {
    /// No pending event
    Empty,
    /// A pending data item
    Data(T),
    /// A pending end-of-stream marker
    End,
    /// A pending upstream error
    Error(E),
}

// Not derived: the derive would demand `T: Default + E: Default`.
impl<T, E> Default for Slot<T, E> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T, E> Slot<T, E> {
    /// Whether the slot holds no event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Take the pending event out, leaving the slot empty.
    pub fn take(&mut self) -> Option<Event<T, E>> {
        match std::mem::take(self) {
            Slot::Empty => None,
            Slot::Data(value) => Some(Event::Data(value)),
            Slot::End => Some(Event::End),
            Slot::Error(err) => Some(Event::Error(err)),
        }
    }
}

impl<T, E> From<Event<T, E>> for Slot<T, E> {
    fn from(event: Event<T, E>) -> Self {
        match event {
            Event::Data(value) => Slot::Data(value),
            Event::End => Slot::End,
            Event::Error(err) => Slot::Error(err),
        }
    }
}
