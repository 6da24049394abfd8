//! Command parser: free-text message to [`ParsedCommand`]
//!
//! A single left-to-right scanning pass per element, no regex engine:
//!
//! - **ratings**: the first five standalone integers. A digit run counts only
//!   when neither neighbour is a word character, so `100mg` is not a rating
//!   while `(100)` is.
//! - **additions / removals**: from a `+` (or `-`) up to and including the
//!   next `)`. The marker itself is dropped. A token never spans a newline.
//! - **note**: text inside the first `Note(...)`, case-insensitive.
//! - **flags**: `help me`/`help-me`/`helpme`, `see meds`/`see-meds`/`seemeds`
//!   and `amend`, all case-insensitive and independent of each other.

use crate::model::{CommandFlags, MedicationToken, ParsedCommand, RATING_COUNT};

const ADD_MARKER: char = '+';
const REMOVE_MARKER: char = '-';
const NOTE_OPEN: &str = "note(";

/// Parse one inbound message
///
/// Total: every input yields a command. A standalone integer too large for
/// a `u32` (a pasted phone number, say) is kept as `u32::MAX` so it still
/// counts towards the five ratings.
///
/// # Example
///
/// ```
/// use healthlog_core::parser::parse;
///
/// let cmd = parse("8 3 2 9 5 +Aspirin(100mg) Note(slept well)");
/// assert_eq!(cmd.ratings, vec![8, 3, 2, 9, 5]);
/// assert_eq!(cmd.add_meds[0].as_str(), "Aspirin(100mg)");
/// assert_eq!(cmd.note, "slept well");
/// ```
pub fn parse(text: &str) -> ParsedCommand {
    let lowered = text.to_ascii_lowercase();

    ParsedCommand {
        ratings: scan_ratings(text),
        add_meds: scan_medications(text, ADD_MARKER),
        remove_meds: scan_medications(text, REMOVE_MARKER),
        note: scan_note(text, &lowered).unwrap_or_default(),
        flags: CommandFlags {
            help: has_keyword_pair(&lowered, "help", "me"),
            see_meds: has_keyword_pair(&lowered, "see", "meds"),
            amend: lowered.contains("amend"),
        },
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn scan_ratings(text: &str) -> Vec<u32> {
    let mut ratings = Vec::with_capacity(RATING_COUNT);
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_ascii_digit() {
            prev = Some(c);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = i + d.len_utf8();
            chars.next();
        }

        let next = chars.peek().map(|&(_, n)| n);
        let bounded_left = !prev.is_some_and(is_word_char);
        let bounded_right = !next.is_some_and(is_word_char);
        prev = text[..end].chars().next_back();

        if bounded_left && bounded_right {
            // All ASCII digits, so overflow is the only way this fails
            let value = text[start..end].parse::<u32>().unwrap_or(u32::MAX);
            ratings.push(value);
            if ratings.len() == RATING_COUNT {
                break;
            }
        }
    }

    ratings
}

fn scan_medications(text: &str, marker: char) -> Vec<MedicationToken> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(marker) {
        let start = pos + offset + marker.len_utf8();
        match closing_paren(text, start) {
            Some(end) => {
                tokens.push(MedicationToken::new(&text[start..end]));
                pos = end;
            }
            None => pos = start,
        }
    }

    tokens
}

/// Byte index just past the first `)` at or after `from`, unless a newline comes first
fn closing_paren(text: &str, from: usize) -> Option<usize> {
    let rel = text[from..].find([')', '\n'])?;
    let at = from + rel;
    text[at..].starts_with(')').then_some(at + 1)
}

fn scan_note(text: &str, lowered: &str) -> Option<String> {
    let mut pos = 0;
    while let Some(offset) = lowered[pos..].find(NOTE_OPEN) {
        let body_start = pos + offset + NOTE_OPEN.len();
        if let Some(end) = closing_paren(text, body_start) {
            return Some(text[body_start..end - 1].to_string());
        }
        pos = body_start;
    }
    None
}

/// `first` and `second` joined directly, by a space, or by a hyphen
fn has_keyword_pair(lowered: &str, first: &str, second: &str) -> bool {
    ["", " ", "-"]
        .iter()
        .any(|sep| lowered.contains(&format!("{first}{sep}{second}")))
}
