//! Match engine for folder name queries
//!
//! Matches a query against catalog items with two strategies, both
//! case-insensitive:
//!
//! 1. **Contiguous substring**: the query appears literally inside the name.
//! 2. **Acronym**: the name is segmented on uppercase boundaries and the
//!    query is consumed greedily segment-by-segment, one initial letter per
//!    segment, with the tail of the query allowed to run as a prefix of the
//!    last consumed segment ("na" hits the N and A of "NetworkAdapter",
//!    "mdoc" hits the M and "Doc" of "MyDocuments").
//!
//! When both strategies succeed the substring highlight wins; it is never
//! more spread out than the acronym one. Results are ranked by path length
//! (shallower matches first) with an ordinal path tie-break, capped at
//! [`MAX_RESULTS`], and shaped with the sentinel placeholders from the
//! models module so callers never receive an empty list.

use std::cmp::Ordering;
use std::ops::Range;

use crate::models::{FileSystemItem, MatchSpan, MatchedItem};
use crate::segment::segment;

/// Maximum number of real results returned from a search.
pub const MAX_RESULTS: usize = 20;

/// Match a query against a candidate list and return ranked, highlighted
/// results.
///
/// An empty query matches every item with no highlighted span. Unmatched
/// items are dropped entirely. Zero matches yield exactly one "no matches"
/// sentinel; more than [`MAX_RESULTS`] matches yield the cap plus one
/// "too many matches" sentinel.
pub fn search(items: &[FileSystemItem], query: &str) -> Vec<MatchedItem> {
    let mut matches: Vec<MatchedItem> = items
        .iter()
        .filter_map(|item| match_item(item, query))
        .collect();

    matches.sort_by(compare_rank);

    if matches.is_empty() {
        return vec![MatchedItem::no_matches()];
    }

    if matches.len() > MAX_RESULTS {
        matches.truncate(MAX_RESULTS);
        matches.push(MatchedItem::too_many_matches());
    }

    matches
}

/// Shorter full paths rank first; ties fall back to an ordinal path
/// comparison so equal-length results stay in a stable order.
fn compare_rank(a: &MatchedItem, b: &MatchedItem) -> Ordering {
    let len_a = a.item.full_path.as_os_str().len();
    let len_b = b.item.full_path.as_os_str().len();
    len_a
        .cmp(&len_b)
        .then_with(|| a.item.full_path.as_os_str().cmp(b.item.full_path.as_os_str()))
}

fn match_item(item: &FileSystemItem, query: &str) -> Option<MatchedItem> {
    if query.is_empty() {
        let spans = if item.name.is_empty() {
            Vec::new()
        } else {
            vec![MatchSpan::unmatched(item.name.as_str())]
        };
        return Some(MatchedItem::new(item.clone(), spans));
    }

    let ranges =
        substring_ranges(&item.name, query).or_else(|| acronym_ranges(&item.name, query))?;

    let spans = spans_from_ranges(&item.name, &ranges);
    Some(MatchedItem::new(item.clone(), spans))
}

/// Case-insensitive comparison of two characters.
fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Locate the query as a contiguous substring of the name.
///
/// Returns the byte range of the first occurrence, scanning left to right
/// over characters so multi-byte names highlight correctly.
fn substring_ranges(name: &str, query: &str) -> Option<Vec<Range<usize>>> {
    let name_chars: Vec<(usize, char)> = name.char_indices().collect();
    let query_chars: Vec<char> = query.chars().collect();

    if query_chars.is_empty() || query_chars.len() > name_chars.len() {
        return None;
    }

    for start in 0..=(name_chars.len() - query_chars.len()) {
        let hit = query_chars
            .iter()
            .enumerate()
            .all(|(j, &qc)| chars_eq_ignore_case(name_chars[start + j].1, qc));

        if hit {
            let begin = name_chars[start].0;
            let end = match name_chars.get(start + query_chars.len()) {
                Some(&(offset, _)) => offset,
                None => name.len(),
            };
            return Some(vec![begin..end]);
        }
    }

    None
}

/// Consume the query across the name's segments.
///
/// Starting at the first segment, each step either consumes the remaining
/// query as a prefix of the current segment (final step) or consumes one
/// query character against the segment's initial letter and moves on. The
/// query must be fully consumed; a segment that consumes nothing fails the
/// match.
fn acronym_ranges(name: &str, query: &str) -> Option<Vec<Range<usize>>> {
    let segments = segment(name);
    let query_chars: Vec<char> = query.chars().collect();

    let mut ranges = Vec::new();
    let mut consumed = 0;
    let mut offset = 0;

    for seg in segments {
        if consumed == query_chars.len() {
            break;
        }

        let rest = &query_chars[consumed..];

        if let Some(prefix_len) = segment_prefix_len(seg, rest) {
            ranges.push(offset..offset + prefix_len);
            consumed = query_chars.len();
            break;
        }

        let first = seg.chars().next()?;
        if !chars_eq_ignore_case(first, rest[0]) {
            return None;
        }
        ranges.push(offset..offset + first.len_utf8());
        consumed += 1;

        offset += seg.len();
    }

    if consumed == query_chars.len() {
        Some(ranges)
    } else {
        None
    }
}

/// Byte length of `rest` as a prefix of `seg`, if the whole of `rest` fits.
fn segment_prefix_len(seg: &str, rest: &[char]) -> Option<usize> {
    let mut seg_chars = seg.chars();
    let mut len = 0;

    for &qc in rest {
        let sc = seg_chars.next()?;
        if !chars_eq_ignore_case(sc, qc) {
            return None;
        }
        len += sc.len_utf8();
    }

    Some(len)
}

/// Expand sorted matched byte ranges into alternating highlight spans.
///
/// Touching ranges are merged first so adjacent spans never share the same
/// `is_matched` value; the concatenated span text reconstructs `name`.
fn spans_from_ranges(name: &str, ranges: &[Range<usize>]) -> Vec<MatchSpan> {
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.end == range.start => last.end = range.end,
            _ => merged.push(range.clone()),
        }
    }

    let mut spans = Vec::new();
    let mut cursor = 0;

    for range in merged {
        if range.start > cursor {
            spans.push(MatchSpan::unmatched(&name[cursor..range.start]));
        }
        spans.push(MatchSpan::matched(&name[range.start..range.end]));
        cursor = range.end;
    }

    if cursor < name.len() {
        spans.push(MatchSpan::unmatched(&name[cursor..]));
    }

    spans
}
