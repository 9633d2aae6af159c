//! # Podfile Scanner
//!
//! Locates the two kinds of places airone writes to inside a Podfile:
//!
//! - the **owned region**, delimited by a start marker line and an end
//!   marker line, whose content airone regenerates on every run, and
//! - **target blocks** (`target 'App' do ... end`), each of which receives
//!   exactly one injection marker recording whether the generated
//!   `airone_modules!` method is invoked there.
//!
//! Scanning works in two layers. `tokenize` classifies each line into a
//! `Token` without looking at its neighbours. The block scan then walks the
//! token stream with an explicit stack of open blocks, so a nested `do` or
//! `if` inside a target never closes that target early, and a stray `end`
//! outside any block is ignored.
//!
//! The scanner never caches positions: callers re-scan after every mutation
//! of the document.

use regex::Regex;
use std::sync::LazyLock;

use crate::document::TextDocument;

/// Text identifying the first line of the owned region.
pub const REGION_START_TOKEN: &str = "generate by airone";

/// Text identifying the last line of the owned region.
pub const REGION_END_TOKEN: &str = "end of airone";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#\s*)?airone_\w+!").expect("valid marker regex"));

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:abstract_)?target\s+(.+?)\s+do(?:\s*\|[^|]*\|)?\s*(?:#.*)?$")
        .expect("valid declaration regex")
});

static TERMINATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^end(?:\s*#.*)?$").expect("valid terminator regex"));

static DO_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdo(?:\s*\|[^|]*\|)?$").expect("valid do-block regex"));

static KEYWORD_OPENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:def|if|unless|case|begin|while|until|class|module)\b")
        .expect("valid opener regex")
});

static INLINE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;\s]end$").expect("valid inline end regex"));

/// Which decision an injection marker records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The target invokes the generated method.
    Enabled,
    /// The target was explicitly left out.
    Skipped,
}

/// Classification of a single Podfile line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opens a target block; carries the target name without quotes.
    Declaration(String),
    /// An injection marker.
    Marker(MarkerKind),
    /// Opens some other block that will be closed by an `end`.
    Opener,
    /// A bare `end`.
    Terminator,
    Plain,
}

/// Classify one line.
pub fn tokenize_line(line: &str) -> Token {
    let code = line.trim();

    if let Some(caps) = MARKER_RE.captures(code) {
        return if caps.get(1).is_some() {
            Token::Marker(MarkerKind::Skipped)
        } else {
            Token::Marker(MarkerKind::Enabled)
        };
    }

    if code.is_empty() || code.starts_with('#') {
        return Token::Plain;
    }

    if let Some(caps) = DECLARATION_RE.captures(code) {
        return Token::Declaration(unquote(&caps[1]));
    }

    if TERMINATOR_RE.is_match(code) {
        return Token::Terminator;
    }

    let code = strip_comment(code);
    let opens = DO_BLOCK_RE.is_match(code) || KEYWORD_OPENER_RE.is_match(code);
    if opens && !INLINE_END_RE.is_match(code) {
        return Token::Opener;
    }

    Token::Plain
}

/// `code` up to its trailing `#` comment, if any. A `#` inside a string
/// literal does not start a comment.
fn strip_comment(code: &str) -> &str {
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in code.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '#' => return code[..i].trim_end(),
            None => {}
        }
    }
    code
}

/// Classify every line of `doc`.
pub fn tokenize(doc: &TextDocument) -> Vec<Token> {
    doc.lines().iter().map(|line| tokenize_line(line)).collect()
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(':').unwrap_or(trimmed);
    trimmed
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string()
}

/// Line indices of the owned region's marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedRegion {
    pub start: usize,
    pub end: usize,
}

/// Detailed result of looking for the owned region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionScan {
    Found(OwnedRegion),
    /// A start marker with no end marker after it.
    StartOnly(usize),
    /// An end marker with no start marker anywhere.
    EndOnly(usize),
    Missing,
}

/// Look for the owned region, reporting half-present markers.
///
/// The first start marker wins; the end is the first end marker after it.
pub fn scan_owned_region(doc: &TextDocument) -> RegionScan {
    let lines = doc.lines();
    let start = lines
        .iter()
        .position(|line| line.contains(REGION_START_TOKEN));

    match start {
        Some(start) => lines[start + 1..]
            .iter()
            .position(|line| line.contains(REGION_END_TOKEN))
            .map(|offset| {
                RegionScan::Found(OwnedRegion {
                    start,
                    end: start + 1 + offset,
                })
            })
            .unwrap_or(RegionScan::StartOnly(start)),
        None => lines
            .iter()
            .position(|line| line.contains(REGION_END_TOKEN))
            .map(RegionScan::EndOnly)
            .unwrap_or(RegionScan::Missing),
    }
}

/// Find the owned region, if both of its markers are present.
pub fn find_owned_region(doc: &TextDocument) -> Option<OwnedRegion> {
    match scan_owned_region(doc) {
        RegionScan::Found(region) => Some(region),
        _ => None,
    }
}

/// Injection state of a target block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    Uninjected,
    Injected,
    ExplicitlySkipped,
}

impl From<Option<MarkerKind>> for InjectionState {
    fn from(marker: Option<MarkerKind>) -> Self {
        match marker {
            None => InjectionState::Uninjected,
            Some(MarkerKind::Enabled) => InjectionState::Injected,
            Some(MarkerKind::Skipped) => InjectionState::ExplicitlySkipped,
        }
    }
}

/// A `target ... do` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBlock {
    /// Index of the declaration line.
    pub start: usize,
    /// Index of the matching `end`, or of the last line when unterminated.
    pub end: usize,
    pub name: String,
    pub state: InjectionState,
}

#[derive(Debug)]
struct Frame {
    start: usize,
    target: Option<String>,
    marker: Option<MarkerKind>,
}

impl Frame {
    fn into_block(self, end: usize) -> Option<TargetBlock> {
        let name = self.target?;
        Some(TargetBlock {
            start: self.start,
            end,
            name,
            state: self.marker.into(),
        })
    }
}

/// Walk the token stream, handing each target block to `visit` as soon as
/// its `end` is seen. Stops early when `visit` returns `true`.
fn walk_targets<F>(tokens: &[Token], mut visit: F)
where
    F: FnMut(TargetBlock) -> bool,
{
    let mut stack: Vec<Frame> = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Declaration(name) => stack.push(Frame {
                start: index,
                target: Some(name.clone()),
                marker: None,
            }),
            Token::Opener => stack.push(Frame {
                start: index,
                target: None,
                marker: None,
            }),
            Token::Marker(kind) => {
                if let Some(frame) = stack.iter_mut().rev().find(|f| f.target.is_some()) {
                    frame.marker.get_or_insert(*kind);
                }
            }
            Token::Terminator => {
                // An `end` with nothing open is stray text; ignore it.
                if let Some(frame) = stack.pop() {
                    if let Some(block) = frame.into_block(index) {
                        if visit(block) {
                            return;
                        }
                    }
                }
            }
            Token::Plain => {}
        }
    }

    let last = tokens.len().saturating_sub(1);
    while let Some(frame) = stack.pop() {
        if let Some(block) = frame.into_block(last) {
            if visit(block) {
                return;
            }
        }
    }
}

/// Find the first target block (in closing order) that carries no
/// injection marker yet.
pub fn find_next_uninjected_target(doc: &TextDocument) -> Option<TargetBlock> {
    let tokens = tokenize(doc);
    let mut found = None;
    walk_targets(&tokens, |block| {
        if block.state == InjectionState::Uninjected {
            found = Some(block);
            true
        } else {
            false
        }
    });
    found
}

/// All target blocks of `doc`, ordered by declaration line.
pub fn target_blocks(doc: &TextDocument) -> Vec<TargetBlock> {
    let tokens = tokenize(doc);
    let mut blocks = Vec::new();
    walk_targets(&tokens, |block| {
        blocks.push(block);
        false
    });
    blocks.sort_by_key(|block| block.start);
    blocks
}

/// Line index of the first target declaration that is not nested in any
/// other block.
pub fn first_top_level_target(doc: &TextDocument) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokenize(doc).iter().enumerate() {
        match token {
            Token::Declaration(_) if depth == 0 => return Some(index),
            Token::Declaration(_) | Token::Opener => depth += 1,
            Token::Terminator => depth = depth.saturating_sub(1),
            Token::Marker(_) | Token::Plain => {}
        }
    }
    None
}
