//! Data model shared by the testcase generator and the co-simulation driver.

/// Number of symbol-match operand slots the device exposes.
pub const SYMBOL_SLOTS: usize = 4;

/// One transfer cycle on the input channel.
///
/// `valid == false` denotes an idle/bubble cycle carrying no payload. Exactly
/// one beat per packet carries `sop` (the first valid beat) and exactly one
/// carries `eop` (the last valid beat).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InBeat {
    pub valid: bool,
    pub sop: bool,
    pub eop: bool,
    /// Valid bytes in this beat minus one; meaningful only when `eop` is set.
    pub length: u8,
    pub data: u64,
}

impl InBeat {
    /// An idle cycle carrying no payload.
    pub fn bubble() -> Self {
        Self::default()
    }
}

/// One transfer cycle on the output channel.
///
/// Mirrors [`InBeat`] plus the `buffer` byte carrying the device's match
/// result, set only on the `eop` beat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutBeat {
    pub valid: bool,
    pub sop: bool,
    pub eop: bool,
    pub length: u8,
    pub data: u64,
    pub buffer: u8,
}

/// The type-classification operand: a 32-bit word expected at a byte-granular
/// offset into the packet. One per packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketType {
    pub offset: usize,
    pub value: u32,
}

/// One symbol-match operand: a candidate 64-bit value the device compares
/// against the packet word at `offset`. A slot with `valid == false` never
/// contributes to the match result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolMatch {
    pub valid: bool,
    /// Packet word index the candidate is compared against.
    pub offset: usize,
    pub value: u64,
    /// Byte reported on the `eop` output beat when this slot matches.
    pub buffer: u8,
}

/// One self-checking scenario: a packet's input stimulus together with the
/// provably correct expected response. Built once, immutable once queued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    pub id: usize,
    pub input: Vec<InBeat>,
    pub expect: Vec<OutBeat>,
    pub packet_type: PacketType,
    pub symbols: Vec<SymbolMatch>,
    /// Whether any match was expected to succeed.
    pub should_match: bool,
    /// The buffer byte expected on the `eop` output beat.
    pub predicted_match: u8,
}
