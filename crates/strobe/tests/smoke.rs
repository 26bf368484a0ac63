use std::collections::VecDeque;

use strobe::{
    CoSimBuilder, InBeat, MatcherModel, OutBeat, PacketType, SymbolMatch, TestCase,
};

/// Builds a hand-written testcase whose expectations mirror `input`, with
/// `buffer` on the final beat.
fn make_case(
    input: Vec<InBeat>,
    packet_type: PacketType,
    symbols: Vec<SymbolMatch>,
    buffer: u8,
) -> TestCase {
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
    expect.last_mut().unwrap().buffer = buffer;
    TestCase {
        id: 0,
        input,
        expect,
        packet_type,
        symbols,
        should_match: buffer != 0,
        predicted_match: buffer,
    }
}

fn two_beat_input(d0: u64, d1: u64, last_length: u8) -> Vec<InBeat> {
    vec![
        InBeat {
            valid: true,
            sop: true,
            eop: false,
            length: 0,
            data: d0,
        },
        InBeat {
            valid: true,
            sop: false,
            eop: true,
            length: last_length,
            data: d1,
        },
    ]
}

#[test]
fn passthru_without_operands() {
    let input = two_beat_input(0x1111_2222_3333_4444, 0x5555_6666_7777_8888, 7);
    // Type value deliberately wrong, no symbol slots armed.
    let tc = make_case(
        input,
        PacketType {
            offset: 0,
            value: 0,
        },
        vec![],
        0,
    );
    let expected_beats = tc.expect.len();
    let mut sim = CoSimBuilder::new(MatcherModel::new()).build().unwrap();
    let report = sim.run(VecDeque::from([tc])).unwrap();
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
    assert_eq!(report.beats_checked, expected_beats);
}

#[test]
fn repeated_packet_has_no_state_leak() {
    let d0 = 0x0102_0304_0506_0708u64;
    let d1 = 0x090A_0B0C_0D0E_0F10u64;
    let tc = make_case(
        two_beat_input(d0, d1, 7),
        PacketType {
            offset: 0,
            value: (d0 & 0xFFFF_FFFF) as u32,
        },
        vec![SymbolMatch {
            valid: true,
            offset: 1,
            value: d1,
            buffer: 0x5C,
        }],
        0x5C,
    );
    let tests: VecDeque<TestCase> = (0..1024)
        .map(|id| TestCase { id, ..tc.clone() })
        .collect();
    let mut sim = CoSimBuilder::new(MatcherModel::new()).build().unwrap();
    let report = sim.run(tests).unwrap();
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
    assert_eq!(report.beats_checked, 2048);
}

#[test]
fn partial_final_beat_never_symbol_matches() {
    let d0 = 0xAAAA_BBBB_CCCC_DDDDu64;
    let d1 = 0x0000_0000_1234_5678u64;
    // Symbol bound to the final beat, but only 4 of its bytes are valid, so
    // the compare is skipped and the buffer stays zero.
    let tc = make_case(
        two_beat_input(d0, d1, 3),
        PacketType {
            offset: 0,
            value: (d0 & 0xFFFF_FFFF) as u32,
        },
        vec![SymbolMatch {
            valid: true,
            offset: 1,
            value: d1,
            buffer: 0x77,
        }],
        0,
    );
    let mut sim = CoSimBuilder::new(MatcherModel::new()).build().unwrap();
    let report = sim.run(VecDeque::from([tc])).unwrap();
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
}

#[test]
fn type_field_past_valid_bytes_never_matches() {
    let d0 = 0x1111_2222_3333_4444u64;
    let d1 = 0x0000_0000_0A0B_0C0Du64;
    // Type read at byte 2 of the final beat needs bytes 2..6, but only 4
    // bytes are valid. Even a symbol hit on beat 0 reports nothing.
    let tc = make_case(
        two_beat_input(d0, d1, 3),
        PacketType {
            offset: 10,
            value: ((d1 >> 16) & 0xFFFF_FFFF) as u32,
        },
        vec![SymbolMatch {
            valid: true,
            offset: 0,
            value: d0,
            buffer: 0x33,
        }],
        0,
    );
    let mut sim = CoSimBuilder::new(MatcherModel::new()).build().unwrap();
    let report = sim.run(VecDeque::from([tc])).unwrap();
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
}

#[test]
fn bubbles_are_transparent() {
    let d0 = 0x0102_0304_0506_0708u64;
    let d1 = 0x1112_1314_1516_1718u64;
    let input = vec![
        InBeat {
            valid: true,
            sop: true,
            eop: false,
            length: 0,
            data: d0,
        },
        InBeat::bubble(),
        InBeat::bubble(),
        InBeat {
            valid: true,
            sop: false,
            eop: true,
            length: 7,
            data: d1,
        },
    ];
    let tc = make_case(
        input,
        PacketType {
            offset: 4,
            value: ((d0 >> 32) & 0xFFFF_FFFF) as u32,
        },
        vec![SymbolMatch {
            valid: true,
            offset: 0,
            value: d0,
            buffer: 0x21,
        }],
        0x21,
    );
    let mut sim = CoSimBuilder::new(MatcherModel::new()).build().unwrap();
    let report = sim.run(VecDeque::from([tc])).unwrap();
    assert!(report.passed(), "mismatches: {:?}", report.mismatches);
    assert_eq!(report.beats_checked, 2);
}
