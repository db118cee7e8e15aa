//! Progress events emitted while cloning.
//!
//! libgit2 reports transfer counters, server sideband text, and checkout
//! counters through separate callbacks; this module folds them into one
//! `(phase, current, total)` event stream for the UI to render.

use std::sync::OnceLock;

use regex::Regex;

/// A recognizable phase of the clone network transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClonePhase {
    /// Server is counting objects.
    Counting,
    /// Server is compressing objects.
    Compressing,
    /// Client is receiving the pack.
    Receiving,
    /// Client is resolving deltas.
    ResolvingDeltas,
    /// Server is finding pack sources.
    FindingSources,
    /// Files are being checked out into the working tree.
    CheckingOut,
    /// Anything not recognized above.
    Other,
}

impl ClonePhase {
    /// Human-readable label for the progress line.
    pub fn label(&self) -> &'static str {
        match self {
            ClonePhase::Counting => "Counting objects",
            ClonePhase::Compressing => "Compressing objects",
            ClonePhase::Receiving => "Receiving objects",
            ClonePhase::ResolvingDeltas => "Resolving deltas",
            ClonePhase::FindingSources => "Finding sources",
            ClonePhase::CheckingOut => "Checking out files",
            ClonePhase::Other => "Processing",
        }
    }

    fn from_label(label: &str) -> Self {
        match label {
            "Counting objects" => ClonePhase::Counting,
            "Compressing objects" => ClonePhase::Compressing,
            "Receiving objects" => ClonePhase::Receiving,
            "Resolving deltas" => ClonePhase::ResolvingDeltas,
            "Finding sources" => ClonePhase::FindingSources,
            _ => ClonePhase::Other,
        }
    }
}

/// One progress observation. `total == 0` means the phase total is
/// unknown (indeterminate) and the event carries no percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// The phase the engine reported.
    pub phase: ClonePhase,
    /// Completed units so far.
    pub current: usize,
    /// Total units, or 0 when unknown.
    pub total: usize,
}

/// Callback consuming progress events during clone.
pub type ProgressSink<'a> = &'a mut dyn FnMut(ProgressEvent);

/// Map libgit2 transfer counters to an event.
///
/// While the pack is still arriving the received-object counters apply;
/// once everything is received the delta counters take over.
pub fn transfer_event(progress: &git2::Progress<'_>) -> ProgressEvent {
    if progress.received_objects() < progress.total_objects() {
        ProgressEvent {
            phase: ClonePhase::Receiving,
            current: progress.received_objects(),
            total: progress.total_objects(),
        }
    } else {
        ProgressEvent {
            phase: ClonePhase::ResolvingDeltas,
            current: progress.indexed_deltas(),
            total: progress.total_deltas(),
        }
    }
}

/// Parse one line of server sideband text, e.g.
/// `"Compressing objects:  50% (12/24)"`.
///
/// Lines without a `(current/total)` counter are reported with an
/// unknown total so the renderer can skip them.
pub fn parse_sideband(line: &str) -> Option<ProgressEvent> {
    static COUNTED: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();

    let counted = COUNTED.get_or_init(|| {
        Regex::new(r"^(?P<label>[A-Za-z][A-Za-z ]*?):\s+\d+%\s+\((?P<current>\d+)/(?P<total>\d+)\)")
            .expect("sideband regex")
    });
    let bare = BARE
        .get_or_init(|| Regex::new(r"^(?P<label>[A-Za-z][A-Za-z ]*?):\s+\d+").expect("sideband regex"));

    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(captures) = counted.captures(line) {
        let current = captures["current"].parse().ok()?;
        let total = captures["total"].parse().ok()?;
        return Some(ProgressEvent {
            phase: ClonePhase::from_label(&captures["label"]),
            current,
            total,
        });
    }

    bare.captures(line).map(|captures| ProgressEvent {
        phase: ClonePhase::from_label(&captures["label"]),
        current: 0,
        total: 0,
    })
}

/// Split a raw sideband buffer into events.
///
/// The server interleaves `\r`-overwritten updates and `\n`-terminated
/// lines in a single chunk; every fragment is parsed independently.
pub fn parse_sideband_chunk(data: &[u8]) -> Vec<ProgressEvent> {
    String::from_utf8_lossy(data)
        .split(['\r', '\n'])
        .filter_map(parse_sideband)
        .collect()
}
