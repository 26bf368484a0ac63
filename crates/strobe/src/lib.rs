//! Cycle-level co-verification harness for streaming packet engines.
//!
//! The crate splits into two halves. The testcase side ([`TestcaseBuilder`])
//! generates randomized, self-checking packet scenarios from a seed. The
//! driver side ([`CoSim`]) runs them against any [`Device`] implementation,
//! sequencing the network and host clock domains through reset, stimulus,
//! and wind-down, and checking every output beat. [`MatcherModel`] is a
//! pure-Rust reference device that closes the loop without hardware.
//!
//! ```no_run
//! use std::collections::VecDeque;
//! use strobe::{BuilderConfig, CoSimBuilder, MatcherModel, RandomStream, TestcaseBuilder};
//!
//! let mut rs = RandomStream::new(42);
//! let tests = TestcaseBuilder::new(BuilderConfig::default()).build(&mut rs);
//! let mut sim = CoSimBuilder::new(MatcherModel::new())
//!     .vcd("run.vcd")
//!     .build()
//!     .unwrap();
//! let report = sim.run(tests).unwrap();
//! assert!(report.passed());
//! ```

mod builder;
mod device;
mod driver;
mod error;
mod model;
mod random;
mod report;
mod testcase;
mod vcd;

pub use builder::{BuilderConfig, TestcaseBuilder};
pub use device::{Device, DeviceIo, MatchPort};
pub use driver::{CoSim, CoSimBuilder, DomainState, Mismatch, Options, RunReport};
pub use error::DriverError;
pub use model::MatcherModel;
pub use random::{RandomStream, UniqueRandom};
pub use report::KvList;
pub use testcase::{InBeat, OutBeat, PacketType, SYMBOL_SLOTS, SymbolMatch, TestCase};
pub use vcd::VcdWriter;
