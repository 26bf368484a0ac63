//! Signal-level interface between the driver and the device under test.

use crate::testcase::{InBeat, OutBeat, PacketType, SYMBOL_SLOTS, SymbolMatch};

/// One symbol-match operand slot as seen on the device pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPort {
    pub vld: bool,
    pub off: usize,
    pub value: u64,
    pub buffer: u8,
}

/// The flat pin bundle of the packet engine. The driver writes the input
/// side, the device implementation writes the output side, and both clocks
/// and resets are owned by the driver.
#[derive(Debug, Clone, Default)]
pub struct DeviceIo {
    pub clk_net: bool,
    pub rst_net: bool,
    pub clk_host: bool,
    pub rst_host: bool,

    pub in_vld: bool,
    pub in_sop: bool,
    pub in_eop: bool,
    pub in_length: u8,
    pub in_data: u64,

    pub type_off: usize,
    pub type_val: u32,
    pub match_ports: [MatchPort; SYMBOL_SLOTS],

    pub out_vld: bool,
    pub out_sop: bool,
    pub out_eop: bool,
    pub out_length: u8,
    pub out_data: u64,
    pub out_buffer: u8,
}

impl DeviceIo {
    /// Clears every driver-owned input to its idle value.
    pub fn drive_idle(&mut self) {
        self.drive_in(&InBeat::default());
        self.drive_type(&PacketType::default());
        self.drive_matches(&[]);
    }

    pub fn drive_in(&mut self, beat: &InBeat) {
        self.in_vld = beat.valid;
        self.in_sop = beat.sop;
        self.in_eop = beat.eop;
        self.in_length = beat.length;
        self.in_data = beat.data;
    }

    pub fn drive_type(&mut self, ty: &PacketType) {
        self.type_off = ty.offset;
        self.type_val = ty.value;
    }

    /// Drives the slot pins from `slots`; unsupplied slots are disarmed.
    pub fn drive_matches(&mut self, slots: &[SymbolMatch]) {
        for (i, port) in self.match_ports.iter_mut().enumerate() {
            *port = match slots.get(i) {
                Some(s) => MatchPort {
                    vld: s.valid,
                    off: s.offset,
                    value: s.value,
                    buffer: s.buffer,
                },
                None => MatchPort::default(),
            };
        }
    }

    pub fn sample_out(&self) -> OutBeat {
        OutBeat {
            valid: self.out_vld,
            sop: self.out_sop,
            eop: self.out_eop,
            length: self.out_length,
            data: self.out_data,
            buffer: self.out_buffer,
        }
    }
}

/// A device under test. Implementations own a [`DeviceIo`] and recompute
/// their outputs in [`eval`](Device::eval), reacting to clock edges by
/// comparing against the pin values seen at the previous call.
pub trait Device {
    fn io(&self) -> &DeviceIo;
    fn io_mut(&mut self) -> &mut DeviceIo;
    fn eval(&mut self);
}
