//! Named-content capture.
//!
//! A [`BlockStack`] replaces output buffering: every open section owns a string
//! buffer on the stack and all output goes to the top buffer. Closing a section
//! pops its buffer into the blocks map with replace or append semantics.

use std::collections::HashMap;

/// LIFO stack of open captures plus the map of finished blocks.
///
/// One instance per render; nothing is shared between renders.
#[derive(Debug, Default)]
pub struct BlockStack {
    open: Vec<(String, String)>,
    blocks: HashMap<String, String>,
    /// Output written while no capture is open (only reachable after `exit`)
    root: String,
}

impl BlockStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new capture named `name`.
    pub fn begin_block(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::trace!("begin_block({name}) at depth {}", self.open.len());
        self.open.push((name, String::new()));
    }

    /// Close the innermost capture and return its name.
    ///
    /// The captured text replaces the stored block when `overwrite` is set or no
    /// block of that name exists yet; otherwise it is appended. Returns `None`
    /// (and changes nothing) when no capture is open.
    pub fn end_block(&mut self, overwrite: bool) -> Option<String> {
        let (name, captured) = self.open.pop()?;
        tracing::trace!("end_block({name}, overwrite={overwrite})");

        match self.blocks.get_mut(&name) {
            Some(existing) if !overwrite => existing.push_str(&captured),
            _ => {
                self.blocks.insert(name.clone(), captured);
            }
        }
        Some(name)
    }

    /// Read a finished block, falling back to `default`. Never mutates.
    #[must_use]
    pub fn block<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.blocks.get(name).map_or(default, String::as_str)
    }

    /// Whether a finished block named `name` exists.
    #[must_use]
    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Write output to the innermost open capture.
    pub fn write(&mut self, text: &str) {
        match self.open.last_mut() {
            Some((_, buffer)) => buffer.push_str(text),
            None => self.root.push_str(text),
        }
    }

    /// Number of open captures.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Name of the innermost open capture.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.open.last().map(|(name, _)| name.as_str())
    }

    /// Discard every open capture, concatenating their buffers bottom to top,
    /// and return everything written so far outside of finished blocks.
    pub fn flush(&mut self) -> String {
        let mut output = std::mem::take(&mut self.root);
        for (_, buffer) in self.open.drain(..) {
            output.push_str(&buffer);
        }
        output
    }
}
