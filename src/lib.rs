#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Pulling records from a pushing parser
//!
//! Record parsers usually push: they call back with each record as soon as
//! it is decoded. A processing loop wants to pull: ask for the next record,
//! deal with it, ask again. [`PullAdapter`] sits in between with a bounded
//! ring buffer, and pauses the parser whenever the buffer nears full.
//!
//! ## Quick Start
//!
//! ```
//! use fix880::{process_records, BufferConfig, Field, IterSource, PullAdapter, Record};
//! use futures::executor::LocalPool;
//! use futures::task::LocalSpawnExt;
//! use std::rc::Rc;
//!
//! let record = Record::builder("00714cam a2200205 a 4500")
//!     .field(Field::builder("245".to_string(), '1', '0').subfield_str('6', "880-01").build())
//!     .field(Field::builder("880".to_string(), ' ', ' ').subfield_str('6', "245-01").build())
//!     .build();
//!
//! // Any push-based parser works; IterSource stands in for one here
//! let source = Rc::new(IterSource::new(vec![Ok::<_, String>(record)]));
//! let (adapter, sink) = PullAdapter::new(BufferConfig::default(), Rc::clone(&source)).unwrap();
//!
//! let mut pool = LocalPool::new();
//! pool.spawner()
//!     .spawn_local(async move {
//!         let _ = source.run(&sink).await;
//!     })
//!     .unwrap();
//!
//! let mut written = Vec::new();
//! let summary = pool
//!     .run_until(process_records(&adapter, |record| {
//!         written.push(record.clone());
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! assert_eq!(summary.written, 1);
//! assert_eq!(written[0].fields[1].indicators(), ('1', '0'));
//! ```
//!
//! ## Modules
//!
//! - [`adapter`] — The pull adapter and the sink the source pushes into
//! - [`slot_store`] — Ring buffer of tagged slots with a single parked reader
//! - [`flow`] — Two-watermark pause/resume decisions
//! - [`source`] — The upstream source capability and an iterator-backed source
//! - [`event`] — Events and slots
//! - [`config`] — Capacity and watermarks
//! - [`record`] — MARC record structures (`Record`, `Field`, `Subfield`)
//! - [`linkage`] — Subfield 6 linkage parsing
//! - [`repair`] — 880 indicator repair
//! - [`process`] — The record processing loop
//! - [`error`] — Error types and result type

pub mod adapter;
pub mod config;
pub mod error;
pub mod event;
pub mod flow;
pub mod linkage;
pub mod process;
/// Core MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod repair;
pub mod slot_store;
pub mod source;

pub use adapter::{AdapterState, Closure, EventSink, PullAdapter};
pub use config::BufferConfig;
pub use error::{BufferError, ProcessError, PullError, Result};
pub use event::{Event, Slot};
pub use flow::{FlowAction, FlowController};
pub use linkage::LinkageInfo;
pub use process::{process_records, ProcessSummary};
pub use record::{Field, Record, Subfield};
pub use repair::{find_linked_field, fix_880_indicators, FixReport};
pub use slot_store::SlotStore;
pub use source::{IterSource, UpstreamSource};
