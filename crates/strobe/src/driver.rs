//! Dual-clock co-simulation driver.
//!
//! [`CoSim`] owns the device's clocks and resets, feeds queued testcases on
//! the network domain, and checks output beats on the host domain against
//! the queued expectations. Expectation mismatches are collected into the
//! [`RunReport`]; only structural failures (an output beat with nothing
//! queued, a broken trace file) abort the run.

use std::collections::VecDeque;
use std::path::PathBuf;

use log::{debug, info};
use serde::Deserialize;

use crate::device::Device;
use crate::error::DriverError;
use crate::testcase::{InBeat, OutBeat, PacketType, SymbolMatch, TestCase};
use crate::vcd::VcdWriter;

/// Clock ticks each domain holds reset asserted.
const RESET_TICKS: u32 = 10;
/// Clock ticks the network domain idles before stopping, letting in-flight
/// beats drain through the host domain.
const WIND_DOWN_TICKS: u32 = 10;

/// Lifecycle of one clock domain across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    PreReset,
    InReset,
    Active,
    PostActive,
}

#[derive(Debug)]
struct DomainContext {
    state: DomainState,
    ticks: u32,
}

impl DomainContext {
    fn new() -> Self {
        Self {
            state: DomainState::PreReset,
            ticks: 0,
        }
    }

    /// Advances the reset sequencing by one domain tick and returns whether
    /// reset is asserted this tick. Once `Active`, the caller owns the state.
    fn step_reset(&mut self) -> bool {
        match self.state {
            DomainState::PreReset => {
                self.state = DomainState::InReset;
                self.ticks = RESET_TICKS;
                true
            }
            DomainState::InReset => {
                self.ticks -= 1;
                if self.ticks == 0 {
                    self.state = DomainState::Active;
                }
                self.ticks > 0
            }
            DomainState::Active | DomainState::PostActive => false,
        }
    }
}

/// Run-time knobs for the driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Trace file path; no trace is written when unset.
    pub vcd: Option<PathBuf>,
    /// Log every driven and checked beat at debug level.
    pub log_beats: bool,
    /// Half period of the network clock, in ticks.
    pub net_half_period: u64,
    /// Half period of the host clock, in ticks.
    pub host_half_period: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            vcd: None,
            log_beats: false,
            net_half_period: 10,
            host_half_period: 10,
        }
    }
}

/// One field of one output beat that disagreed with its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Simulation time of the offending host edge.
    pub time: u64,
    /// Index of the beat among checked output beats.
    pub beat: usize,
    pub field: &'static str,
    pub expected: u64,
    pub actual: u64,
}

/// Outcome of one co-simulation run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Total simulation ticks elapsed.
    pub ticks: u64,
    /// Output beats checked against an expectation.
    pub beats_checked: usize,
    pub mismatches: Vec<Mismatch>,
    /// Expectations still queued when the run stopped.
    pub residual_expect: usize,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty() && self.residual_expect == 0
    }
}

/// Fluent constructor for [`CoSim`].
pub struct CoSimBuilder<D: Device> {
    device: D,
    options: Options,
}

impl<D: Device> CoSimBuilder<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            options: Options::default(),
        }
    }

    pub fn vcd(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.vcd = Some(path.into());
        self
    }

    pub fn log_beats(mut self) -> Self {
        self.options.log_beats = true;
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<CoSim<D>, DriverError> {
        let vcd = match &self.options.vcd {
            Some(path) => Some(VcdWriter::new(path)?),
            None => None,
        };
        Ok(CoSim {
            device: self.device,
            options: self.options,
            vcd,
            net: DomainContext::new(),
            host: DomainContext::new(),
            pending_in: VecDeque::new(),
            expected: VecDeque::new(),
            cur_type: PacketType::default(),
            cur_matches: Vec::new(),
            time: 0,
            stopped: false,
            beats_checked: 0,
            mismatches: Vec::new(),
        })
    }
}

pub struct CoSim<D: Device> {
    device: D,
    options: Options,
    vcd: Option<VcdWriter>,

    net: DomainContext,
    host: DomainContext,
    pending_in: VecDeque<InBeat>,
    expected: VecDeque<OutBeat>,
    cur_type: PacketType,
    cur_matches: Vec<SymbolMatch>,

    time: u64,
    stopped: bool,
    beats_checked: usize,
    mismatches: Vec<Mismatch>,
}

impl<D: Device> CoSim<D> {
    pub fn builder(device: D) -> CoSimBuilder<D> {
        CoSimBuilder::new(device)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Runs the testcase queue to completion. The network domain stops once
    /// the queue drains and the wind-down elapses; the host domain checks
    /// every output beat until then.
    pub fn run(&mut self, mut tests: VecDeque<TestCase>) -> Result<RunReport, DriverError> {
        self.net = DomainContext::new();
        self.host = DomainContext::new();
        self.pending_in.clear();
        self.expected.clear();
        self.time = 0;
        self.stopped = false;
        self.beats_checked = 0;
        self.mismatches.clear();

        let io = self.device.io_mut();
        io.clk_net = false;
        io.clk_host = false;
        io.rst_net = false;
        io.rst_host = false;
        io.drive_idle();
        self.device.eval();
        if let Some(vcd) = &mut self.vcd {
            vcd.dump(0, self.device.io())?;
        }

        while !self.stopped {
            self.time += 1;
            if self.time % self.options.net_half_period == 0 {
                if self.device.io().clk_net {
                    self.on_net_negedge(&mut tests);
                }
                let io = self.device.io_mut();
                io.clk_net = !io.clk_net;
            }
            if self.time % self.options.host_half_period == 0 {
                if self.device.io().clk_host {
                    self.on_host_negedge()?;
                }
                let io = self.device.io_mut();
                io.clk_host = !io.clk_host;
            }
            self.device.eval();
            if let Some(vcd) = &mut self.vcd {
                vcd.dump(self.time, self.device.io())?;
            }
        }

        let report = RunReport {
            ticks: self.time,
            beats_checked: self.beats_checked,
            mismatches: std::mem::take(&mut self.mismatches),
            residual_expect: self.expected.len(),
        };
        info!("run finished {report}");
        Ok(report)
    }

    fn on_net_negedge(&mut self, tests: &mut VecDeque<TestCase>) {
        if self.net.step_reset() {
            self.device.io_mut().rst_net = true;
            return;
        }
        self.device.io_mut().rst_net = false;

        match self.net.state {
            DomainState::Active => {
                if self.pending_in.is_empty() {
                    let Some(tc) = tests.pop_front() else {
                        self.net.state = DomainState::PostActive;
                        self.net.ticks = WIND_DOWN_TICKS;
                        self.device.io_mut().drive_idle();
                        return;
                    };
                    info!("loading testcase {tc}");
                    self.pending_in.extend(tc.input.iter().copied());
                    self.expected.extend(tc.expect.iter().copied());
                    self.cur_type = tc.packet_type;
                    self.cur_matches = tc.symbols.clone();
                }
                // Operands are held on the pins for the packet's whole
                // duration, bubbles included.
                let io = self.device.io_mut();
                io.drive_type(&self.cur_type);
                io.drive_matches(&self.cur_matches);
                let beat = self
                    .pending_in
                    .pop_front()
                    .unwrap_or_else(InBeat::bubble);
                if self.options.log_beats {
                    debug!("t={} drive {beat}", self.time);
                }
                io.drive_in(&beat);
            }
            DomainState::PostActive => {
                self.device.io_mut().drive_idle();
                self.net.ticks -= 1;
                if self.net.ticks == 0 {
                    self.stopped = true;
                }
            }
            DomainState::PreReset | DomainState::InReset => unreachable!(),
        }
    }

    fn on_host_negedge(&mut self) -> Result<(), DriverError> {
        if self.host.step_reset() {
            self.device.io_mut().rst_host = true;
            return Ok(());
        }
        self.device.io_mut().rst_host = false;

        let out = self.device.io().sample_out();
        if !out.valid {
            return Ok(());
        }
        let Some(exp) = self.expected.pop_front() else {
            return Err(DriverError::UnsolicitedOutput { time: self.time });
        };
        if self.options.log_beats {
            debug!("t={} check {out}", self.time);
        }
        let beat = self.beats_checked;
        self.beats_checked += 1;
        let time = self.time;
        let mismatches = &mut self.mismatches;
        let mut check = |field: &'static str, expected: u64, actual: u64| {
            if expected != actual {
                mismatches.push(Mismatch {
                    time,
                    beat,
                    field,
                    expected,
                    actual,
                });
            }
        };
        check("sop", exp.sop as u64, out.sop as u64);
        check("eop", exp.eop as u64, out.eop as u64);
        check("length", exp.length as u64, out.length as u64);
        check("data", exp.data, out.data);
        check("buffer", exp.buffer as u64, out.buffer as u64);
        Ok(())
    }
}
