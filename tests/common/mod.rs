//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use fix880::{BufferConfig, EventSink, Field, PullAdapter, Record, UpstreamSource};
use futures::future::poll_fn;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::task::Poll;

/// A control call the adapter made on its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Pause,
    Resume,
    Close,
}

/// Source that records every control call and otherwise does nothing.
///
/// Tests push events through the sink by hand.
#[derive(Debug, Default)]
pub struct MockSource {
    paused: Cell<bool>,
    calls: RefCell<Vec<Call>>,
}

impl MockSource {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }
}

impl UpstreamSource for MockSource {
    fn pause(&self) {
        self.paused.set(true);
        self.calls.borrow_mut().push(Call::Pause);
    }

    fn resume(&self) {
        self.paused.set(false);
        self.calls.borrow_mut().push(Call::Resume);
    }

    fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn close(&self) {
        self.calls.borrow_mut().push(Call::Close);
    }
}

/// Wraps a real source and records the control calls passed through.
#[derive(Debug)]
pub struct Counted<S> {
    pub inner: Rc<S>,
    pub log: Rc<MockSource>,
}

impl<S: UpstreamSource> UpstreamSource for Counted<S> {
    fn pause(&self) {
        self.log.pause();
        self.inner.pause();
    }

    fn resume(&self) {
        self.log.resume();
        self.inner.resume();
    }

    fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    fn close(&self) {
        self.log.close();
        self.inner.close();
    }
}

pub type TestAdapter = PullAdapter<u32, String>;
pub type TestSink = EventSink<u32, String>;

/// Adapter over a fresh [`MockSource`].
pub fn mock_adapter(
    capacity: usize,
    low_tide: usize,
    high_tide: usize,
) -> (TestAdapter, TestSink, Rc<MockSource>) {
    let source = Rc::new(MockSource::default());
    let config = BufferConfig::new(capacity, low_tide, high_tide).unwrap();
    let (adapter, sink) = PullAdapter::new(config, Rc::clone(&source)).unwrap();
    (adapter, sink, source)
}

/// Give the executor one turn.
pub async fn yield_now() {
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

pub const TEST_LEADER: &str = "00714cam a2200205 a 4500";

/// Record with one linked 245/880 pair; the 880 carries `ind_880` as its
/// first indicator and the 907 carries `number`.
pub fn linked_record(number: usize, ind_880: char) -> Record {
    Record::builder(TEST_LEADER)
        .field(
            Field::builder("245".to_string(), '1', '0')
                .subfield_str('6', "880-01")
                .subfield_str('a', "Kitab ʻan al-hayah")
                .build(),
        )
        .field(
            Field::builder("880".to_string(), ind_880, '0')
                .subfield_str('6', "245-01/(3/r")
                .subfield_str('a', "كتاب عن الحياة")
                .build(),
        )
        .field(
            Field::builder("907".to_string(), ' ', ' ')
                .subfield_str('a', &format!(".b{number:08}"))
                .build(),
        )
        .build()
}
