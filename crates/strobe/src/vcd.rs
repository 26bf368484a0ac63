use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::device::DeviceIo;

/// Dumped signals, in declaration order, with their bit widths.
const SIGNALS: &[(&str, usize)] = &[
    ("clk_net", 1),
    ("rst_net", 1),
    ("clk_host", 1),
    ("rst_host", 1),
    ("in_vld", 1),
    ("in_sop", 1),
    ("in_eop", 1),
    ("in_length", 3),
    ("in_data", 64),
    ("type_off", 32),
    ("type_val", 32),
    ("match0_vld", 1),
    ("match0_off", 32),
    ("match0_value", 64),
    ("match0_buffer", 8),
    ("match1_vld", 1),
    ("match1_off", 32),
    ("match1_value", 64),
    ("match1_buffer", 8),
    ("match2_vld", 1),
    ("match2_off", 32),
    ("match2_value", 64),
    ("match2_buffer", 8),
    ("match3_vld", 1),
    ("match3_off", 32),
    ("match3_value", 64),
    ("match3_buffer", 8),
    ("out_vld", 1),
    ("out_sop", 1),
    ("out_eop", 1),
    ("out_length", 3),
    ("out_data", 64),
    ("out_buffer", 8),
];

fn signal_values(io: &DeviceIo) -> Vec<u64> {
    let mut values = vec![
        io.clk_net as u64,
        io.rst_net as u64,
        io.clk_host as u64,
        io.rst_host as u64,
        io.in_vld as u64,
        io.in_sop as u64,
        io.in_eop as u64,
        io.in_length as u64,
        io.in_data,
        io.type_off as u64,
        io.type_val as u64,
    ];
    for port in &io.match_ports {
        values.push(port.vld as u64);
        values.push(port.off as u64);
        values.push(port.value);
        values.push(port.buffer as u64);
    }
    values.extend([
        io.out_vld as u64,
        io.out_sop as u64,
        io.out_eop as u64,
        io.out_length as u64,
        io.out_data,
        io.out_buffer as u64,
    ]);
    values
}

/// Change-detecting VCD trace writer over the device pin bundle.
pub struct VcdWriter {
    writer: BufWriter<File>,
    ids: Vec<String>,
    last_values: Vec<Option<u64>>,
    timestamp: u64,
}

impl VcdWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // VCD Header
        writeln!(writer, "$date")?;
        writeln!(
            writer,
            "  {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(writer, "$end")?;
        writeln!(writer, "$version")?;
        writeln!(writer, "  strobe")?;
        writeln!(writer, "$end")?;
        writeln!(writer, "$timescale 1ns $end")?;

        writeln!(writer, "$scope module tb $end")?;
        let mut ids = Vec::with_capacity(SIGNALS.len());
        for (num, (name, width)) in SIGNALS.iter().enumerate() {
            let vcd_id = Self::generate_vcd_id(num);
            writeln!(writer, "$var wire {} {} {} $end", width, vcd_id, name)?;
            ids.push(vcd_id);
        }
        writeln!(writer, "$upscope $end")?;

        writeln!(writer, "$enddefinitions $end")?;
        writeln!(writer, "$dumpvars")?;
        writeln!(writer, "$end")?;

        Ok(Self {
            writer,
            ids,
            last_values: vec![None; SIGNALS.len()],
            timestamp: 0,
        })
    }

    fn generate_vcd_id(num: usize) -> String {
        let mut id = String::new();
        let mut n = num;
        loop {
            let char = ((n % 94) + 33) as u8 as char;
            id.push(char);
            if n < 94 {
                break;
            }
            n = (n / 94) - 1;
        }
        id.chars().rev().collect()
    }

    pub fn dump(&mut self, timestamp: u64, io: &DeviceIo) -> std::io::Result<()> {
        if timestamp > self.timestamp || timestamp == 0 {
            writeln!(self.writer, "#{}", timestamp)?;
            self.timestamp = timestamp;
        }

        for (i, current_val) in signal_values(io).into_iter().enumerate() {
            if self.last_values[i] != Some(current_val) {
                if SIGNALS[i].1 == 1 {
                    writeln!(self.writer, "{}{}", current_val, self.ids[i])?;
                } else {
                    writeln!(self.writer, "b{:b} {}", current_val, self.ids[i])?;
                }
                self.last_values[i] = Some(current_val);
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
