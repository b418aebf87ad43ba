//! Name template expansion and truncation.
//!
//! Templates are plain text with `{name}` placeholders. Expansion goes through
//! an explicit substitution map built from the track:
//!
//! | placeholder     | value                                              |
//! |-----------------|----------------------------------------------------|
//! | `{title}`       | title without parenthetical segments like `(feat. X)` |
//! | `{title_clean}` | same as `{title}`                                  |
//! | `{title_raw}`   | track title as reported                            |
//! | `{artist}`      | all artists joined with `", "`                     |
//! | `{artist_first}`| first artist, empty when there are none            |
//! | `{album}`       | album name                                         |
//!
//! Anything the map does not contain is rendered verbatim, braces included.
//! `{{` and `}}` produce literal braces. A `{` with no closing `}` before the
//! next `{` is literal text, so rendering never fails.

use crate::shared::track::Track;
use std::collections::BTreeMap;

pub const DEFAULT_TEMPLATE: &str = "| {artist_first} - {title}";
pub const DEFAULT_TRUNCATE_LENGTH: usize = 64;

const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder(String),
}

/// A parsed name template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(ch) = rest.chars().next() {
            match ch {
                '{' if rest.starts_with("{{") => {
                    text.push('{');
                    rest = &rest[2..];
                }
                '}' if rest.starts_with("}}") => {
                    text.push('}');
                    rest = &rest[2..];
                }
                '{' => match rest[1..].find(|c| c == '{' || c == '}') {
                    Some(end) if rest[1 + end..].starts_with('}') => {
                        flush_text(&mut segments, &mut text);
                        segments.push(Segment::Placeholder(rest[1..=end].to_string()));
                        rest = &rest[end + 2..];
                    }
                    Some(_) => {
                        text.push('{');
                        rest = &rest[1..];
                    }
                    None => {
                        text.push_str(rest);
                        rest = "";
                    }
                },
                _ => {
                    text.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        flush_text(&mut segments, &mut text);

        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expand the template against `track`
    pub fn render(&self, track: &Track) -> String {
        self.render_with(&placeholders(track))
    }

    /// Expand against an explicit substitution map
    pub fn render_with(&self, values: &BTreeMap<&'static str, String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(key) => match values.get(key.trim()) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                },
            }
        }
        out
    }
}

impl Default for NameTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE)
    }
}

fn flush_text(segments: &mut Vec<Segment>, text: &mut String) {
    if text.is_empty() {
        return;
    }
    segments.push(Segment::Text(std::mem::take(text)));
}

/// The substitution map for a track
pub fn placeholders(track: &Track) -> BTreeMap<&'static str, String> {
    let title = clean_title(&track.title);
    BTreeMap::from([
        ("title", title.clone()),
        ("title_clean", title),
        ("title_raw", track.title.clone()),
        ("artist", track.artist_line()),
        ("artist_first", track.artist_first().to_string()),
        ("album", track.album.clone()),
    ])
}

/// Remove parenthetical segments and the whitespace before them
pub fn clean_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut rest = title;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(rest[..open].trim_end());
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Truncate to at most `max_chars` characters without splitting a character.
///
/// With `ellipsis`, an over-long value keeps `max_chars - 3` characters and
/// ends in `...`; limits of 3 or less cut without the ellipsis.
pub fn truncate(value: &str, max_chars: usize, ellipsis: bool) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    if ellipsis && max_chars > ELLIPSIS.len() {
        let mut out = take_chars(value, max_chars - ELLIPSIS.len()).to_string();
        out.push_str(ELLIPSIS);
        return out;
    }
    take_chars(value, max_chars).to_string()
}

fn take_chars(value: &str, count: usize) -> &str {
    match value.char_indices().nth(count) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
