use std::collections::VecDeque;

use strobe::{
    BuilderConfig, CoSimBuilder, MatcherModel, Options, RandomStream, TestCase,
    TestcaseBuilder,
};

fn expected_beats(tests: &VecDeque<TestCase>) -> usize {
    tests.iter().map(|tc| tc.expect.len()).sum()
}

fn run_seed(seed: u64, config: BuilderConfig, options: Options) {
    let mut rs = RandomStream::new(seed);
    let tests = TestcaseBuilder::new(config).build(&mut rs);
    let beats = expected_beats(&tests);
    let mut sim = CoSimBuilder::new(MatcherModel::new())
        .options(options)
        .build()
        .unwrap();
    let report = sim.run(tests).unwrap();
    assert!(
        report.passed(),
        "seed {seed}: {} mismatches, first: {:?}",
        report.mismatches.len(),
        report.mismatches.first()
    );
    assert_eq!(report.beats_checked, beats, "seed {seed}");
}

#[test]
fn regress_randomized() {
    for seed in 0..10 {
        let config = BuilderConfig {
            n: 64,
            max_len: 256,
            ..Default::default()
        };
        run_seed(seed, config, Options::default());
    }
}

#[test]
fn regress_negative_heavy() {
    // Mostly deliberately non-matching packets, with a dense bubble mix.
    for seed in 100..105 {
        let config = BuilderConfig {
            n: 64,
            max_len: 128,
            bubble_probability: 0.2,
            fail_match_probability: 0.9,
            ..Default::default()
        };
        run_seed(seed, config, Options::default());
    }
}

#[test]
fn regress_faster_host_clock() {
    // The host domain drains faster than the network domain fills; its reset
    // window also completes first, so no accepted beat is ever dropped.
    let config = BuilderConfig {
        n: 32,
        max_len: 64,
        ..Default::default()
    };
    let options = Options {
        host_half_period: 5,
        ..Default::default()
    };
    run_seed(7, config, options);
}

#[test]
fn reseeding_reproduces_a_full_run() {
    let config = BuilderConfig {
        n: 16,
        max_len: 64,
        ..Default::default()
    };
    let mut rs = RandomStream::new(31);
    let first = TestcaseBuilder::new(config.clone()).build(&mut rs);
    rs.reseed(31);
    let second = TestcaseBuilder::new(config).build(&mut rs);
    assert_eq!(first, second);
}
