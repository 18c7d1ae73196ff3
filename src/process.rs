//! Record processing loop: pull, skip deleted, repair 880s, write changed.
//!
//! [`process_records`] drives a [`PullAdapter`] of [`Record`]s to completion.
//! It awaits one record at a time, so the adapter's flow control keeps the
//! upstream parser at most a buffer's length ahead of the writer.

use crate::adapter::PullAdapter;
use crate::error::ProcessError;
use crate::record::Record;
use crate::repair::fix_880_indicators;
use std::io;

/// Records between progress log lines.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Counts from one run of [`process_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Records pulled from the adapter
    pub processed: usize,
    /// Records skipped because their leader marks them deleted
    pub deleted: usize,
    /// Records with at least one repaired 880, handed to the writer
    pub written: usize,
    /// 880 fields repaired across all records
    pub fields_changed: usize,
    /// 880 fields left alone because their linked field was missing
    pub fields_unlinked: usize,
}

/// Pull every record from `adapter`, repair its 880 indicators, and pass the
/// records that changed to `write`.
///
/// Deleted records are skipped; unchanged records are not written.
///
/// # Errors
///
/// Returns `ProcessError::Read` if the adapter yields an error and
/// `ProcessError::Write` if `write` fails. Either way the adapter is closed
/// first, which closes the upstream source.
pub async fn process_records<E, W>(
    adapter: &PullAdapter<Record, E>,
    mut write: W,
) -> Result<ProcessSummary, ProcessError<E>>
where
    W: FnMut(&Record) -> io::Result<()>,
{
    let mut summary = ProcessSummary::default();

    loop {
        let mut record = match adapter.next().await {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(err) => {
                adapter.close();
                return Err(ProcessError::Read(err));
            },
        };

        summary.processed += 1;
        if summary.processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(processed = summary.processed, "processed records so far");
        }

        if record.is_deleted() {
            summary.deleted += 1;
            continue;
        }

        let report = fix_880_indicators(&mut record);
        summary.fields_changed += report.changed;
        summary.fields_unlinked += report.unlinked;
        if !report.is_changed() {
            continue;
        }

        if let Err(err) = write(&record) {
            adapter.close();
            return Err(ProcessError::Write(err));
        }
        summary.written += 1;
    }

    tracing::info!(processed = summary.processed, "processed records in total");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;
    use crate::record::Field;
    use crate::source::IterSource;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use std::rc::Rc;

    fn linked_pair(status: char, ind_880: char) -> Record {
        Record::builder(format!("00714{status}am a2200205 a 4500"))
            .field(
                Field::builder("245".to_string(), '1', '0')
                    .subfield_str('6', "880-01")
                    .build(),
            )
            .field(
                Field::builder("880".to_string(), ind_880, '0')
                    .subfield_str('6', "245-01")
                    .build(),
            )
            .build()
    }

    fn run(
        records: Vec<Result<Record, String>>,
        write: impl FnMut(&Record) -> io::Result<()>,
    ) -> Result<ProcessSummary, ProcessError<String>> {
        let source = Rc::new(IterSource::new(records));
        let config = BufferConfig::new(3, 1, 1).unwrap();
        let (adapter, sink) = PullAdapter::new(config, Rc::clone(&source)).unwrap();

        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(async move {
                let _ = source.run(&sink).await;
            })
            .unwrap();
        pool.run_until(process_records(&adapter, write))
    }

    #[test]
    fn test_only_changed_live_records_are_written() {
        let records = vec![
            Ok(linked_pair('c', ' ')),
            Ok(linked_pair('c', '1')),
            Ok(linked_pair('d', ' ')),
        ];
        let mut written = Vec::new();
        let summary = run(records, |record| {
            written.push(record.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(
            summary,
            ProcessSummary {
                processed: 3,
                deleted: 1,
                written: 1,
                fields_changed: 1,
                fields_unlinked: 0,
            }
        );
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].fields[1].indicators(), ('1', '0'));
    }

    #[test]
    fn test_read_error_stops_processing() {
        let records = vec![Ok(linked_pair('c', ' ')), Err("bad directory".to_string())];
        let err = run(records, |_| Ok(())).unwrap_err();
        assert!(matches!(err, ProcessError::Read(_)));
    }

    #[test]
    fn test_write_error_stops_processing() {
        let records = vec![Ok(linked_pair('c', ' ')), Ok(linked_pair('c', ' '))];
        let mut calls = 0;
        let err = run(records, |_| {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        })
        .unwrap_err();
        assert!(matches!(err, ProcessError::Write(_)));
        assert_eq!(calls, 1);
    }
}
