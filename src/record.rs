//! MARC bibliographic record structures.
//!
//! This module provides the record types the processing loop works on:
//! - [`Record`] — leader, control fields and data fields in stream order
//! - [`Field`] — a variable data field (010+) with two indicators
//! - [`Subfield`] — a coded data element within a field
//!
//! Parsing and serialization are left to the upstream source and the writer;
//! this is only the in-memory shape.
//!
//! # Examples
//!
//! ```
//! use fix880::{Field, Record};
//!
//! let record = Record::builder("00000nam a2200000 a 4500")
//!     .control_field_str("001", "12345")
//!     .field(
//!         Field::builder("245".to_string(), '1', '0')
//!             .subfield_str('6', "880-01")
//!             .subfield_str('a', "Title")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.fields_by_tag("245").count(), 1);
//! assert!(!record.is_deleted());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Leader position holding the record status.
const RECORD_STATUS_POSITION: usize = 5;

/// Local field carrying the system record number in subfield `a`.
const RECORD_NUMBER_TAG: &str = "907";

/// A MARC bibliographic record
///
/// Data fields keep the order in which they were added, which is the order
/// the upstream parser emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 characters)
    pub leader: String,
    /// Control fields (000-009) - tag -> value, preserves insertion order
    pub control_fields: IndexMap<String, String>,
    /// Data fields (010+) in record order
    pub fields: Vec<Field>,
}

/// A data field in a MARC record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new MARC record with the given leader
    #[must_use]
    pub fn new(leader: impl Into<String>) -> Self {
        Record {
            leader: leader.into(),
            control_fields: IndexMap::new(),
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing MARC records
    #[must_use]
    pub fn builder(leader: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Add a control field (000-009)
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.control_fields.insert(tag, value);
    }

    /// Add a control field using string slices
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Get a control field value
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .get(tag)
            .map(std::string::String::as_str)
    }

    /// Append a data field
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Iterate over all data fields in record order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Iterate mutably over all data fields in record order
    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut()
    }

    /// Iterate over fields matching a specific tag
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> {
        self.fields.iter().filter(move |f| f.tag == tag)
    }

    /// Get first field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Record status from leader position 5, if the leader is long enough
    #[must_use]
    pub fn record_status(&self) -> Option<char> {
        self.leader.chars().nth(RECORD_STATUS_POSITION)
    }

    /// Whether the leader marks the record as deleted (status `d`)
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.record_status() == Some('d')
    }

    /// System record number from the first 907 $a, used in diagnostics
    #[must_use]
    pub fn record_number(&self) -> Option<&str> {
        self.fields_by_tag(RECORD_NUMBER_TAG)
            .find_map(|f| f.get_subfield('a'))
    }
}

/// Builder for fluently constructing MARC records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field to the record being built
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field to the record being built
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for fluently constructing fields
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Add a subfield using a string slice
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Iterate over values of subfields with a specific code
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Both indicators as a pair
    #[must_use]
    pub fn indicators(&self) -> (char, char) {
        (self.indicator1, self.indicator2)
    }

    /// Replace both indicators
    pub fn set_indicators(&mut self, (indicator1, indicator2): (char, char)) {
        self.indicator1 = indicator1;
        self.indicator2 = indicator2;
    }
}

/// Builder for fluently constructing fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield using a string slice
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}
