//! ## `togglediff`: switching-activity comparison
//!
//! This contains the core functionalities and data structures
//! for toggle-count based hardware trojan screening.
//!
//! A [`ToggleDB`] holds per-signal toggle counts extracted from
//! VCD traces; the [`compare`] module matches a clean reference
//! database against a candidate one and scores the deviations.
//!
//! See the binaries for example usage.

pub mod compare;

pub use compare::{ compare_toggles, Comparison, SignalDeviation };

use indexmap::IndexMap;
use std::collections::HashMap;
use compact_str::CompactString;
use serde::{ Serialize, Deserialize };
use std::fs::File;
use std::io::{ self, BufRead, BufReader, Seek, SeekFrom };
use std::path::PathBuf;

/// Error raised when a VCD trace cannot be read.
///
/// This is the only failure the parser surfaces: every line it
/// does not recognize is skipped, not rejected.
#[derive(Debug, thiserror::Error)]
pub enum VcdError {
    #[error("cannot read vcd file {path:?}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error
    },
}

/// The toggle count database.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ToggleDB {
    /// Signal name to accumulated toggle count, in declaration
    /// order of the trace that first declared the signal.
    pub toggles: IndexMap<CompactString, u64>,
}

impl ToggleDB {
    /// Create a new empty toggle database.
    #[inline]
    pub fn new() -> ToggleDB {
        ToggleDB {
            toggles: IndexMap::new()
        }
    }

    /// Feed a VCD file to this database and accumulate the
    /// toggle counts of every signal it declares.
    ///
    /// Signals that never change value keep an explicit zero
    /// entry, so they still take part in later comparisons.
    pub fn feed_vcd(
        &mut self, vcd_file: &str
    ) -> Result<(), VcdError> {
        let wrap = |e| VcdError::FileAccess {
            path: vcd_file.into(), source: e
        };
        let f = File::open(vcd_file).map_err(wrap)?;
        let mut f = BufReader::with_capacity(65536, f);
        self.feed_read(&mut f).map_err(wrap)
    }

    /// Feed VCD text from any seekable reader.
    ///
    /// Two passes over the input: the declaration header is
    /// scanned for `$var` identifier/name pairs until the
    /// `$enddefinitions` marker, then the input is rewound and
    /// every value change of a declared identifier is counted.
    /// The first value seen for an identifier is its baseline;
    /// each later value that differs from the previous token
    /// (exact string comparison) counts one toggle. Lines that
    /// fit neither shape are skipped.
    pub fn feed_read<R: BufRead + Seek>(
        &mut self, input: &mut R
    ) -> io::Result<()> {
        let start = input.stream_position()?;

        // identifier -> signal name, scoped to this trace
        let mut signal_map =
            HashMap::<CompactString, CompactString>::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            if input.read_line(&mut buf)? == 0 {
                break;
            }
            let line = buf.trim();
            if line.starts_with("$var") {
                let mut tokens = line.split_whitespace();
                if let (Some(id), Some(name)) =
                    (tokens.nth(3), tokens.next())
                {
                    // a redeclared identifier takes the new
                    // name; an already known name keeps its
                    // position and count
                    signal_map.insert(id.into(), name.into());
                    self.toggles.entry(name.into()).or_insert(0);
                }
            }
            if line.starts_with("$enddefinitions") {
                break;
            }
        }

        // last seen value token per identifier
        let mut prev_values =
            HashMap::<CompactString, CompactString>::new();
        input.seek(SeekFrom::Start(start))?;
        loop {
            buf.clear();
            if input.read_line(&mut buf)? == 0 {
                break;
            }
            let (value, id) =
                match split_value_change(buf.trim()) {
                    Some(vi) => vi,
                    None => continue
                };
            let name = match signal_map.get(id) {
                Some(name) => name,
                None => continue
            };
            match prev_values.get_mut(id) {
                Some(prev) => if prev.as_str() != value {
                    if let Some(count) =
                        self.toggles.get_mut(name.as_str())
                    {
                        *count += 1;
                    }
                    *prev = value.into();
                },
                None => {
                    prev_values.insert(id.into(), value.into());
                }
            }
        }
        clilog::info!(
            TGDF_FEED,
            "counted toggles of {} signals (db total {})",
            signal_map.len(), self.toggles.len()
        );
        Ok(())
    }
}

/// Split a trimmed line into its value token and identifier,
/// if the line is a value change.
///
/// A value change is a non-empty maximal prefix of characters
/// from `{b, 0, 1, x}` followed by an identifier token; the
/// whitespace in between is optional (`b0000 !` and `0!` both
/// match). When the whole line consists of prefix characters,
/// its last character is taken as the identifier (`b00` reads
/// as value `b0` of identifier `0`). Anything else is not a
/// value change.
#[inline]
fn split_value_change(line: &str) -> Option<(&str, &str)> {
    let n = line.bytes()
        .take_while(|&b| matches!(b, b'b' | b'0' | b'1' | b'x'))
        .count();
    if n == 0 {
        return None;
    }
    let rest = line[n..].trim_start();
    match rest.split_whitespace().next() {
        Some(id) => Some((&line[..n], id)),
        None if n >= 2 => Some((&line[..n - 1], &line[n - 1..])),
        None => None
    }
}
