//! Sheet naming: derive a human-readable name for each extracted frame,
//! sanitize it, disambiguate collisions, and order the result.
//!
//! Content-derived names (taken from a frame's first column, which is
//! usually a label or category heading) are far more useful than positional
//! numbering, so frames that yield one are listed first. Detection noise
//! commonly produces a literal "table" header cell or nothing usable at all;
//! those frames drop into the auto-numbered group at the end.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::frame::{Frame, NamedFrame, SheetCollection};

/// Maximum length of a sanitized candidate name, in characters.
///
/// One below the workbook format's 31-character sheet limit so that the
/// serializer can always append a collision suffix without truncating.
pub const CANDIDATE_MAX_LEN: usize = 30;

/// A candidate starting with this prefix (case-insensitive) carries no real
/// meaning and is demoted to the auto group.
pub const AUTO_NAME_PREFIX: &str = "table";

/// Characters that survive sanitization: letters, digits, underscore, space.
const SANITIZE_PATTERN: &str = r"[^A-Za-z0-9_ ]+";

/// Assign names to frames and partition them into the named-first,
/// auto-numbered-second [`SheetCollection`].
///
/// Per frame at 1-based position `i`:
/// 1. candidate = first column label, or `Sheet_{i}` for a zero-column frame
/// 2. sanitize (strip disallowed characters, trim, spaces to underscores,
///    truncate to [`CANDIDATE_MAX_LEN`])
/// 3. empty or [`AUTO_NAME_PREFIX`]-prefixed candidates become `Table_{i}` in
///    the auto group
/// 4. anything else joins the named group, with `_1`, `_2`, ... suffixes
///    (counted per distinct base name) on repeats
///
/// Both groups preserve the frames' original relative order.
pub fn name_sheets(frames: Vec<Frame>) -> SheetCollection {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut named: Vec<NamedFrame> = Vec::new();
    let mut auto: Vec<NamedFrame> = Vec::new();

    for (idx, frame) in frames.into_iter().enumerate() {
        let position = idx + 1;
        let candidate = match frame.columns().first() {
            Some(label) => sanitize_name(label),
            None => sanitize_name(&format!("Sheet_{}", position)),
        };

        if candidate.is_empty() || candidate.to_lowercase().starts_with(AUTO_NAME_PREFIX) {
            auto.push(NamedFrame {
                name: format!("Table_{}", position),
                frame,
            });
        } else {
            let name = match seen.get_mut(&candidate) {
                Some(count) => {
                    *count += 1;
                    format!("{}_{}", candidate, count)
                }
                None => {
                    seen.insert(candidate.clone(), 0);
                    candidate
                }
            };
            named.push(NamedFrame { name, frame });
        }
    }

    SheetCollection::from_groups(named, auto)
}

/// Sanitize a raw candidate: keep letters, digits, underscores and spaces,
/// trim, replace interior spaces with underscores, truncate to
/// [`CANDIDATE_MAX_LEN`] characters.
pub fn sanitize_name(raw: &str) -> String {
    static SANITIZER: OnceLock<Regex> = OnceLock::new();
    let sanitizer = SANITIZER.get_or_init(|| Regex::new(SANITIZE_PATTERN).unwrap());
    sanitizer
        .replace_all(raw, "")
        .trim()
        .replace(' ', "_")
        .chars()
        .take(CANDIDATE_MAX_LEN)
        .collect()
}
