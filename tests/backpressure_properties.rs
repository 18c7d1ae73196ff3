//! Property tests for flow control under arbitrary push/pull interleavings.
//!
//! The producer here is well behaved: it only pushes while the source is not
//! paused. Under that contract the buffer must never overflow. Pulls on an
//! empty buffer park a read, so the direct handoff path is mixed in with
//! buffered delivery.

mod common;

use common::{mock_adapter, Call};
use fix880::{PullError, UpstreamSource};
use futures::executor::block_on;
use futures::future::{FutureExt, LocalBoxFuture};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Push,
    Pull,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Push), Just(Op::Pull)]
}

/// `(capacity, low_tide, high_tide)` that pass validation.
fn tides() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..16).prop_flat_map(|capacity| (Just(capacity), 0..capacity, 0..=capacity))
}

proptest! {
    #[test]
    fn test_conforming_producer_never_overflows(
        (capacity, low_tide, high_tide) in tides(),
        ops in prop::collection::vec(op(), 0..200),
    ) {
        let (adapter, sink, source) = mock_adapter(capacity, low_tide, high_tide);
        let mut produced = 0u32;
        let mut consumed = Vec::new();
        // A pull on an empty buffer parks here until the next push
        let mut parked: Option<LocalBoxFuture<'_, Result<Option<u32>, PullError<String>>>> = None;

        for op in ops {
            match op {
                Op::Push if !source.is_paused() => {
                    prop_assert!(sink.data(produced).is_ok());
                    produced += 1;
                    if let Some(mut waiting) = parked.take() {
                        // Delivered straight to the parked read, never buffered
                        prop_assert_eq!(adapter.buffered(), 0);
                        let item = waiting.as_mut().now_or_never();
                        prop_assert!(matches!(item, Some(Ok(Some(_)))));
                        if let Some(Ok(Some(item))) = item {
                            consumed.push(item);
                        }
                    }
                },
                Op::Pull if parked.is_none() => {
                    if adapter.buffered() > 0 {
                        let item = block_on(adapter.next()).unwrap();
                        consumed.push(item.unwrap());
                    } else {
                        let mut waiting = adapter.next().boxed_local();
                        prop_assert!(waiting.as_mut().now_or_never().is_none());
                        parked = Some(waiting);
                    }
                },
                _ => {},
            }

            prop_assert!(adapter.buffered() <= capacity);
            prop_assert_eq!(adapter.buffered(), produced as usize - consumed.len());
        }

        // Drain, then finish the stream
        while adapter.buffered() > 0 {
            consumed.push(block_on(adapter.next()).unwrap().unwrap());
        }
        prop_assert!(!source.is_paused());
        sink.end().unwrap();
        match parked.take() {
            Some(mut waiting) => {
                prop_assert!(matches!(waiting.as_mut().now_or_never(), Some(Ok(None))));
            },
            None => {
                prop_assert_eq!(block_on(adapter.next()).unwrap(), None);
            },
        }

        prop_assert_eq!(consumed, (0..produced).collect::<Vec<_>>());

        let calls = source.calls();
        if let Some(first) = calls.first() {
            prop_assert_eq!(*first, Call::Pause);
        }
        for pair in calls.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }
        prop_assert_eq!(source.count(Call::Close), 0);
    }

    #[test]
    fn test_close_mid_stream_closes_source_once(
        (capacity, low_tide, high_tide) in tides(),
        pushes in 0usize..16,
        pulls in 0usize..16,
    ) {
        let (adapter, sink, source) = mock_adapter(capacity, low_tide, high_tide);
        let mut produced = 0u32;
        while (produced as usize) < pushes && !source.is_paused() {
            sink.data(produced).unwrap();
            produced += 1;
        }
        for expected in 0..pulls.min(adapter.buffered()) as u32 {
            prop_assert_eq!(block_on(adapter.next()).unwrap(), Some(expected));
        }

        adapter.close();
        adapter.close();
        prop_assert_eq!(adapter.buffered(), 0);
        prop_assert_eq!(source.count(Call::Close), 1);
        prop_assert_eq!(block_on(adapter.next()).unwrap(), None);
    }
}
