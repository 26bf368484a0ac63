//! Randomized, self-checking testcase generation.
//!
//! Each generated [`TestCase`] carries both the input stimulus for one packet
//! and the provably correct expected response, so a run needs no external
//! golden data. "Failure" scenarios (corrupted type word, unmatched symbol
//! table) are deliberately constructed valid outcomes, not errors.

use std::collections::VecDeque;

use serde::Deserialize;

use crate::random::{RandomStream, UniqueRandom};
use crate::testcase::{InBeat, OutBeat, PacketType, SYMBOL_SLOTS, SymbolMatch, TestCase};

/// Knobs for the randomized generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Number of testcases (packets) to generate.
    pub n: usize,
    /// Maximum number of bytes within a packet.
    pub max_len: usize,
    /// Maximum number of armed symbol slots `[0, 4]`; with 0 no symbol match
    /// can ever occur.
    pub symbol_n: usize,
    /// Probability of an idle cycle between beats (typically low).
    pub bubble_probability: f64,
    /// Probability of deliberately constructing a non-matching scenario.
    pub fail_match_probability: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            n: 1024,
            max_len: 1500,
            symbol_n: SYMBOL_SLOTS,
            bubble_probability: 0.05,
            fail_match_probability: 0.1,
        }
    }
}

/// Produces independent self-checking testcases from a seeded stream.
#[derive(Debug)]
pub struct TestcaseBuilder {
    config: BuilderConfig,
}

fn mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

impl TestcaseBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        assert!(config.max_len >= 1, "max_len must be at least one byte");
        assert!(
            config.symbol_n <= SYMBOL_SLOTS,
            "the device has {SYMBOL_SLOTS} symbol slots"
        );
        assert!(
            (0.0..=1.0).contains(&config.bubble_probability),
            "bubble_probability must be a probability"
        );
        assert!(
            (0.0..=1.0).contains(&config.fail_match_probability),
            "fail_match_probability must be a probability"
        );
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Generates `config.n` testcases, eagerly, in queue order.
    pub fn build(&self, rs: &mut RandomStream) -> VecDeque<TestCase> {
        (0..self.config.n).map(|id| self.generate(id, rs)).collect()
    }

    fn generate(&self, id: usize, rs: &mut RandomStream) -> TestCase {
        // Packet data and symbol-table decoys come from the same unique-value
        // generator, so an unbound slot can never accidentally match.
        let mut unique = UniqueRandom::new();

        let input = self.generate_input(rs, &mut unique);
        let mut expect: Vec<OutBeat> = input
            .iter()
            .filter(|b| b.valid)
            .map(|b| OutBeat {
                valid: true,
                sop: b.sop,
                eop: b.eop,
                length: b.length,
                data: b.data,
                buffer: 0,
            })
            .collect();

        let fail_type = rs.chance(self.config.fail_match_probability);
        let (packet_type, type_voided) = self.generate_type(&expect, fail_type, rs);

        let fail_symbol = rs.chance(self.config.fail_match_probability);
        let (symbols, symbol_buffer) =
            self.generate_symbols(&expect, fail_symbol, rs, &mut unique);

        // The two fail predicates are independent negative-test toggles; a
        // corrupted type word silences the symbol result as well.
        let should_match = !type_voided && symbol_buffer.is_some();
        let predicted_match = if should_match {
            symbol_buffer.unwrap_or(0)
        } else {
            0
        };
        expect
            .last_mut()
            .expect("a packet has at least one beat")
            .buffer = predicted_match;

        TestCase {
            id,
            input,
            expect,
            packet_type,
            symbols,
            should_match,
            predicted_match,
        }
    }

    /// Emits input beats until the drawn byte count is consumed, with bubbles
    /// interleaved at `bubble_probability`. Bubbles never precede the `sop`
    /// beat and never follow the `eop` beat.
    fn generate_input(&self, rs: &mut RandomStream, unique: &mut UniqueRandom) -> Vec<InBeat> {
        let mut remaining = rs.uniform(1, self.config.max_len) as i64;
        let mut beats = Vec::new();
        let mut started = false;
        while remaining > 0 {
            if started && rs.chance(self.config.bubble_probability) {
                beats.push(InBeat::bubble());
                continue;
            }
            let eop = remaining <= 8;
            let bytes = remaining.min(8) as u32;
            beats.push(InBeat {
                valid: true,
                sop: !started,
                eop,
                length: if eop { bytes as u8 - 1 } else { 0 },
                data: unique.draw(rs) & mask(bytes * 8),
            });
            started = true;
            remaining -= 8;
        }
        beats
    }

    /// Predicts the 32-bit type field at a random byte offset, optionally
    /// corrupting it so a match cannot possibly occur. Returns the operand
    /// and whether the prediction is a non-match.
    fn generate_type(
        &self,
        expect: &[OutBeat],
        fail: bool,
        rs: &mut RandomStream,
    ) -> (PacketType, bool) {
        let word_index = rs.index(expect.len());
        let off = rs.uniform(0usize, 4);
        let beat = &expect[word_index];
        let mut value = ((beat.data >> (off * 8)) & 0xFFFF_FFFF) as u32;
        if fail {
            value = !value;
        }
        let mut voided = fail;
        // A field read that spills past the final beat's valid bytes can
        // never match, regardless of the probability draw.
        if word_index == expect.len() - 1 && (beat.length as usize + 1) < off + 4 {
            voided = true;
        }
        (
            PacketType {
                offset: word_index * 8 + off,
                value,
            },
            voided,
        )
    }

    /// Populates up to `symbol_n` slots with guaranteed non-matching values,
    /// then (unless failing) binds one slot to a random packet word. Returns
    /// the slots and the buffer byte expected on `eop`, if the bind holds.
    fn generate_symbols(
        &self,
        expect: &[OutBeat],
        fail: bool,
        rs: &mut RandomStream,
        unique: &mut UniqueRandom,
    ) -> (Vec<SymbolMatch>, Option<u8>) {
        let count = rs.uniform(0, self.config.symbol_n);
        let mut slots: Vec<SymbolMatch> = (0..count)
            .map(|_| SymbolMatch {
                valid: true,
                offset: 0,
                value: unique.draw(rs),
                buffer: rs.uniform(0u8, u8::MAX),
            })
            .collect();

        if fail || slots.is_empty() {
            return (slots, None);
        }

        let slot_index = rs.index(slots.len());
        let word_index = rs.index(expect.len());
        let beat = expect[word_index];
        slots[slot_index].offset = word_index;
        slots[slot_index].value = beat.data;

        // A partial final beat is never matched against the symbol table.
        let voided = word_index == expect.len() - 1 && beat.length != 7;
        let buffer = if voided {
            None
        } else {
            Some(slots[slot_index].buffer)
        };
        (slots, buffer)
    }
}
