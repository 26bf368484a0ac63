//! Human-readable rendering of testcases and run results.

use std::fmt::{self, Display};

use itertools::Itertools;

use crate::driver::{Mismatch, RunReport};
use crate::testcase::{InBeat, OutBeat, PacketType, SymbolMatch, TestCase};

/// An ordered key/value list rendered as `'{k:v, k:v}`, the shape log lines
/// and failure dumps use throughout.
#[derive(Debug, Default)]
pub struct KvList {
    fields: Vec<(String, String)>,
}

impl KvList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }
}

impl Display for KvList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{{{}}}",
            self.fields.iter().map(|(k, v)| format!("{k}:{v}")).join(", ")
        )
    }
}

fn flag(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

impl Display for InBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return write!(f, "'{{bubble}}");
        }
        let mut kv = KvList::new();
        kv.add("sop", flag(self.sop))
            .add("eop", flag(self.eop))
            .add("length", self.length)
            .add("data", format_args!("{:#x}", self.data));
        kv.fmt(f)
    }
}

impl Display for OutBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kv = KvList::new();
        kv.add("sop", flag(self.sop))
            .add("eop", flag(self.eop))
            .add("length", self.length)
            .add("data", format_args!("{:#x}", self.data))
            .add("buffer", format_args!("{:#x}", self.buffer));
        kv.fmt(f)
    }
}

impl Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kv = KvList::new();
        kv.add("offset", self.offset)
            .add("value", format_args!("{:#x}", self.value));
        kv.fmt(f)
    }
}

impl Display for SymbolMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kv = KvList::new();
        kv.add("vld", flag(self.valid))
            .add("offset", self.offset)
            .add("value", format_args!("{:#x}", self.value))
            .add("buffer", format_args!("{:#x}", self.buffer));
        kv.fmt(f)
    }
}

impl Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kv = KvList::new();
        kv.add("id", self.id)
            .add("beats", self.expect.len())
            .add("type", &self.packet_type)
            .add("symbols", self.symbols.len())
            .add("should_match", flag(self.should_match))
            .add("predicted", format_args!("{:#x}", self.predicted_match));
        kv.fmt(f)
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kv = KvList::new();
        kv.add("t", self.time)
            .add("beat", self.beat)
            .add("field", self.field)
            .add("expected", format_args!("{:#x}", self.expected))
            .add("actual", format_args!("{:#x}", self.actual));
        kv.fmt(f)
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kv = KvList::new();
        kv.add("ticks", self.ticks)
            .add("beats_checked", self.beats_checked)
            .add("mismatches", self.mismatches.len())
            .add("residual_expect", self.residual_expect)
            .add("passed", flag(self.passed()));
        kv.fmt(f)
    }
}
