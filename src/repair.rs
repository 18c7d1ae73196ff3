//! Repair of 880 field indicators from their linked fields.
//!
//! Catalogers often key the vernacular 880 field with blank or stale
//! indicators while the romanized original carries the right ones. For every
//! 880 field whose subfield 6 links it to another field of the same record,
//! [`fix_880_indicators`] copies both indicators from that linked field.
//!
//! An 880 whose linked field cannot be found is left unchanged and reported
//! with a warning naming the record number (907 $a).

use crate::linkage::LinkageInfo;
use crate::record::{Field, Record};

/// Tag of Alternate Graphical Representation fields.
pub const ALTERNATE_GRAPHIC_TAG: &str = "880";

/// What [`fix_880_indicators`] did to one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixReport {
    /// 880 fields whose indicators were rewritten
    pub changed: usize,
    /// 880 fields with no findable linked field
    pub unlinked: usize,
}

impl FixReport {
    /// Whether any field was rewritten.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed > 0
    }
}

/// Find the field that `field_880` is linked to.
///
/// The linked field carries the tag named in the 880's subfield 6, and its
/// own subfield 6 points back at 880 with the same occurrence number.
#[must_use]
pub fn find_linked_field<'a>(record: &'a Record, field_880: &Field) -> Option<&'a Field> {
    linked_index(record, field_880).map(|index| &record.fields[index])
}

fn linked_index(record: &Record, field_880: &Field) -> Option<usize> {
    let linkage = LinkageInfo::find_in(field_880)?;
    record.fields.iter().position(|other| {
        other.tag == linkage.tag
            && LinkageInfo::find_in(other)
                .is_some_and(|back| linkage.pairs_with(&field_880.tag, &back, &other.tag))
    })
}

/// Copy indicators onto every linked 880 field of `record` whose indicators
/// differ from its linked field.
pub fn fix_880_indicators(record: &mut Record) -> FixReport {
    let mut report = FixReport::default();

    for index in 0..record.fields.len() {
        if record.fields[index].tag != ALTERNATE_GRAPHIC_TAG {
            continue;
        }

        let Some(linked) = linked_index(record, &record.fields[index]) else {
            report.unlinked += 1;
            tracing::warn!(
                record = record.record_number().unwrap_or("<unknown>"),
                field = ?record.fields[index],
                "ignoring 880 field: linked field not found"
            );
            continue;
        };

        let indicators = record.fields[linked].indicators();
        let field = &mut record.fields[index];
        if field.indicators() != indicators {
            field.set_indicators(indicators);
            report.changed += 1;
        }
    }

    report
}
