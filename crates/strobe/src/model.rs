//! Cycle-level reference model of the packet engine.
//!
//! [`MatcherModel`] implements [`Device`] in plain Rust so the full harness
//! can be exercised without real hardware. It is edge triggered: each call to
//! `eval` compares the clock pins against the values seen last call and runs
//! the per-domain logic on rising edges.

use std::collections::VecDeque;

use crate::device::{Device, DeviceIo, MatchPort};
use crate::testcase::{OutBeat, SYMBOL_SLOTS};

#[derive(Debug, Default)]
pub struct MatcherModel {
    io: DeviceIo,
    prev_clk_net: bool,
    prev_clk_host: bool,

    // Per-packet state, latched at sop on the net clock.
    type_off: usize,
    type_val: u32,
    slots: [MatchPort; SYMBOL_SLOTS],
    word_index: usize,
    type_hit: bool,
    symbol_hit: Option<u8>,

    // Beats crossing from the net domain to the host domain.
    egress: VecDeque<OutBeat>,
}

impl MatcherModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Beats accepted but not yet presented on the output channel.
    pub fn backlog(&self) -> usize {
        self.egress.len()
    }

    fn on_net_posedge(&mut self) {
        if self.io.rst_net {
            self.word_index = 0;
            self.type_hit = false;
            self.symbol_hit = None;
            return;
        }
        if !self.io.in_vld {
            return;
        }

        if self.io.in_sop {
            // Operands are sampled once per packet, at the first beat.
            self.type_off = self.io.type_off;
            self.type_val = self.io.type_val;
            self.slots = self.io.match_ports;
            self.word_index = 0;
            self.type_hit = false;
            self.symbol_hit = None;
        }

        let valid_bytes = if self.io.in_eop {
            self.io.in_length as usize + 1
        } else {
            8
        };

        // Type field: a 32-bit read at a byte offset, confined to one beat
        // and to the beat's valid bytes.
        let type_word = self.type_off / 8;
        let type_byte = self.type_off % 8;
        if type_word == self.word_index && type_byte + 4 <= valid_bytes {
            let field = ((self.io.in_data >> (type_byte * 8)) & 0xFFFF_FFFF) as u32;
            if field == self.type_val {
                self.type_hit = true;
            }
        }

        // Symbol slots compare whole words only; a partial beat never
        // participates. Lowest-numbered matching slot wins.
        if valid_bytes == 8 && self.symbol_hit.is_none() {
            self.symbol_hit = self
                .slots
                .iter()
                .find(|s| s.vld && s.off == self.word_index && s.value == self.io.in_data)
                .map(|s| s.buffer);
        }

        let buffer = if self.io.in_eop && self.type_hit {
            self.symbol_hit.unwrap_or(0)
        } else {
            0
        };
        self.egress.push_back(OutBeat {
            valid: true,
            sop: self.io.in_sop,
            eop: self.io.in_eop,
            length: self.io.in_length,
            data: self.io.in_data,
            buffer,
        });
        self.word_index += 1;
    }

    fn on_host_posedge(&mut self) {
        if self.io.rst_host {
            self.egress.clear();
            self.drive_out(None);
            return;
        }
        let next = self.egress.pop_front();
        self.drive_out(next);
    }

    fn drive_out(&mut self, beat: Option<OutBeat>) {
        let beat = beat.unwrap_or_default();
        self.io.out_vld = beat.valid;
        self.io.out_sop = beat.sop;
        self.io.out_eop = beat.eop;
        self.io.out_length = beat.length;
        self.io.out_data = beat.data;
        self.io.out_buffer = beat.buffer;
    }
}

impl Device for MatcherModel {
    fn io(&self) -> &DeviceIo {
        &self.io
    }

    fn io_mut(&mut self) -> &mut DeviceIo {
        &mut self.io
    }

    fn eval(&mut self) {
        let net_rising = self.io.clk_net && !self.prev_clk_net;
        let host_rising = self.io.clk_host && !self.prev_clk_host;
        self.prev_clk_net = self.io.clk_net;
        self.prev_clk_host = self.io.clk_host;

        // Host before net: a beat accepted this cycle is presented on the
        // output no earlier than the next host edge.
        if host_rising {
            self.on_host_posedge();
        }
        if net_rising {
            self.on_net_posedge();
        }
    }
}
