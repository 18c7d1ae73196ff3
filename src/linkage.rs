//! Field linkage via subfield 6 for MARC 880 (Alternate Graphical Representation) fields.
//!
//! An 880 field carries the same data as another field of the record in a
//! different script. The pair is tied together by **subfield 6** (Linkage):
//!
//! - `100: $6 880-01 $a Smith, John` (original field, points at 880 occurrence 01)
//! - `880: $6 100-01 $a سميث، جون` (880 field, points back at 100 occurrence 01)
//!
//! The value format is `TAG-OCC[/script][/r]`: the linked tag, an occurrence
//! number shared by both fields, an optional script identification code and
//! an optional right-to-left orientation flag.

use crate::record::Field;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // TAG-OCC may sit anywhere in the value; surrounding text is ignored.
    // Both parts are digit runs of any length. Occurrences compare as text,
    // so "01" and "1" differ.
    // SCRIPT = optional MARC script identification code:
    //   - Parenthesized: (2 (Hebrew), (3 (Arabic), (B (Latin),
    //     (N (Cyrillic), (S (Greek), (4 (Devanagari), etc.
    //   - Dollar-sign: $1 (CJK)
    // /r = optional field orientation (right-to-left)
    static ref LINKAGE: Regex =
        Regex::new(r"(\d+)-(\d+)(?:/([\(\$][A-Za-z0-9]))?(/r)?")
            .unwrap_or_else(|e| panic!("linkage pattern does not compile: {e}"));
}

/// Information extracted from MARC subfield 6 (Linkage).
///
/// # Examples
///
/// ```
/// use fix880::LinkageInfo;
///
/// let info = LinkageInfo::parse("245-01/(2/r").unwrap();
/// assert_eq!(info.tag(), "245");
/// assert_eq!(info.occurrence(), "01");
/// assert_eq!(info.script_id(), "(2");
/// assert!(info.is_reverse());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkageInfo {
    /// The 3-digit tag of the linked field (e.g., "880", "245")
    pub tag: String,

    /// Occurrence number shared by both fields of the pair
    pub occurrence: String,

    /// Script identification code (e.g., "(2" for Hebrew, "$1" for CJK),
    /// empty when absent
    pub script_id: String,

    /// Whether the right-to-left flag (`/r`) is present
    pub is_reverse: bool,
}

impl LinkageInfo {
    /// Parse a subfield 6 value.
    ///
    /// Returns `None` if the value contains no `TAG-OCC` pair. Text around
    /// the pair is ignored.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let caps = LINKAGE.captures(value)?;

        Some(LinkageInfo {
            tag: caps.get(1)?.as_str().to_string(),
            occurrence: caps.get(2)?.as_str().to_string(),
            script_id: caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            is_reverse: caps.get(4).is_some(),
        })
    }

    /// Linkage of the first subfield 6 on `field` that parses.
    #[must_use]
    pub fn find_in(field: &Field) -> Option<Self> {
        field.subfields_by_code('6').find_map(Self::parse)
    }

    /// Get the linked field tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the occurrence number.
    #[must_use]
    pub fn occurrence(&self) -> &str {
        &self.occurrence
    }

    /// Get the script identification code.
    #[must_use]
    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    /// Check if the right-to-left flag is set.
    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.is_reverse
    }

    /// Whether `other` is the reverse link of this one: this linkage, found
    /// on a field tagged `self_tag`, points at `other`'s field tag with the
    /// same occurrence, and `other` points back at `self_tag`.
    #[must_use]
    pub fn pairs_with(&self, self_tag: &str, other: &LinkageInfo, other_tag: &str) -> bool {
        self.tag == other_tag && other.tag == self_tag && self.occurrence == other.occurrence
    }
}
