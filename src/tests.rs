use alloc::vec::Vec;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::generator::{count_primes, primes, sieve_interval, small_primes};
use crate::segment::Segment;
use crate::traits::{CollectSink, CountSink, SegmentSink};
use crate::{Error, SieveConfig, SieveOfEratosthenes};

fn reference_primes(start: u64, stop: u64) -> Vec<u64> {
    small_primes(stop)
        .into_iter()
        .filter(|&p| p >= start && p >= 7)
        .collect()
}

fn engine_primes(start: u64, stop: u64, sieve_size_kib: u32, pre_sieve: u32) -> Vec<u64> {
    let config = SieveConfig {
        sieve_size_kib,
        pre_sieve,
        ..SieveConfig::default()
    };
    sieve_interval(start, stop, &config, CollectSink::default())
        .unwrap()
        .primes
}

#[test]
fn engine_matches_reference_across_configs() {
    for &(start, stop) in &[
        (7u64, 100u64),
        (7, 30_000),
        (100, 200),
        (104_700, 105_000),
        (999, 100_000),
    ] {
        let expected = reference_primes(start, stop);
        for sieve_size_kib in [1, 2, 3, 8] {
            for pre_sieve in [13, 17, 19, 23] {
                assert_eq!(
                    engine_primes(start, stop, sieve_size_kib, pre_sieve),
                    expected,
                    "[{}, {}] {} KiB pre-sieve {}",
                    start,
                    stop,
                    sieve_size_kib,
                    pre_sieve
                );
            }
        }
    }
}

#[test]
fn engine_matches_reference_on_random_intervals() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..40 {
        let start = rng.gen_range(7..2_000_000u64);
        let stop = start + rng.gen_range(0..60_000u64);
        let expected = reference_primes(start, stop);
        assert_eq!(
            engine_primes(start, stop, 1, 13),
            expected,
            "[{}, {}]",
            start,
            stop
        );
    }
}

#[test]
fn split_intervals_report_the_same_primes() {
    let mut rng = StdRng::seed_from_u64(0xCAFE);
    let (start, stop) = (7u64, 50_000u64);
    let whole = engine_primes(start, stop, 1, 13);
    for _ in 0..8 {
        // split points are 29 mod 30 so both halves stay byte-aligned
        let mid = rng.gen_range(1..stop / 30) * 30 - 1;
        let mut joined = engine_primes(start, mid, 1, 13);
        joined.extend(engine_primes(mid + 1, stop, 1, 13));
        assert_eq!(joined, whole, "split at {}", mid);
    }
}

#[test]
fn scenario_counts() {
    // counts exclude 2, 3, 5: the engine reports primes >= 7
    assert_eq!(engine_primes(7, 100, 32, 19).len(), 22);
    assert_eq!(engine_primes(100, 200, 32, 19).len(), 21);
    assert_eq!(engine_primes(7, 1_000_000, 32, 19).len(), 78_498 - 3);
}

#[test]
fn scenario_billion_window() {
    let found = engine_primes(999_999_000, 1_000_000_000, 32, 19);
    assert_eq!(found.len(), 45);
    assert_eq!(found[0], 999_999_001);
    assert_eq!(*found.last().unwrap(), 999_999_937);
}

#[test]
fn scenario_trillion_window_invariant_under_config() {
    let expected = engine_primes(1_000_000_000_000, 1_000_000_000_000 + 100_000, 32, 19);
    assert_eq!(expected.len(), 3614);
    for (sieve_size_kib, pre_sieve) in [(8, 19), (512, 19), (32, 13), (32, 17), (32, 23)] {
        assert_eq!(
            engine_primes(
                1_000_000_000_000,
                1_000_000_000_000 + 100_000,
                sieve_size_kib,
                pre_sieve
            ),
            expected
        );
    }
}

#[test]
fn single_value_intervals() {
    assert_eq!(engine_primes(7, 7, 32, 19), [7]);
    assert_eq!(engine_primes(7919, 7919, 32, 19), [7919]);
    assert_eq!(engine_primes(9, 9, 32, 19), Vec::<u64>::new());
    assert_eq!(engine_primes(997 * 997, 997 * 997, 32, 19), Vec::<u64>::new());
}

#[test]
fn high_windows_complete_without_overflow() {
    // windows just below 2^32 and 2^48; counts pinned by a reference run
    let below_32 = engine_primes((1 << 32) - 200_000, (1 << 32) - 1, 16, 19);
    assert_eq!(below_32.len(), 8864);
    assert_eq!(*below_32.last().unwrap(), 4_294_967_291);
    let below_48 = engine_primes((1 << 48) - 50_000, (1 << 48) - 1, 64, 19);
    assert_eq!(below_48.len(), 1537);
    assert_eq!(*below_48.last().unwrap(), 281_474_976_710_597);
}

/// Records delivery order and lengths, stopping after a fixed number of
/// segments when asked to.
#[derive(Default)]
struct RecordingSink {
    lows: Vec<u64>,
    lengths: Vec<usize>,
    stop_after: Option<usize>,
}

impl SegmentSink for RecordingSink {
    fn segment_processed(&mut self, segment: &Segment<'_>) -> bool {
        self.lows.push(segment.low());
        self.lengths.push(segment.len());
        self.stop_after != Some(self.lows.len())
    }
}

#[test]
fn segments_are_delivered_in_order() {
    let config = SieveConfig {
        sieve_size_kib: 1,
        ..SieveConfig::default()
    };
    let sink = sieve_interval(7, 200_000, &config, RecordingSink::default()).unwrap();
    // 200000 spans ceil(200000 / 30720) = 7 segments from segment_low 0
    assert_eq!(sink.lows.len(), 7);
    assert!(sink.lows.iter().all(|low| low % 30 == 0));
    assert!(sink
        .lows
        .windows(2)
        .all(|pair| pair[1] - pair[0] == 1024 * 30));
    // all but the last segment are full sized
    assert!(sink.lengths[..6].iter().all(|&len| len == 1024));
    assert!(*sink.lengths.last().unwrap() <= 1024);
}

#[test]
fn sink_can_stop_early() {
    let config = SieveConfig {
        sieve_size_kib: 1,
        ..SieveConfig::default()
    };
    let sink = RecordingSink {
        stop_after: Some(2),
        ..RecordingSink::default()
    };
    let sink = sieve_interval(7, 200_000, &config, sink).unwrap();
    assert_eq!(sink.lows.len(), 2);
}

#[test]
fn count_sink_agrees_with_collect_sink() {
    let config = SieveConfig::default();
    let counted = sieve_interval(7, 300_000, &config, CountSink::default())
        .unwrap()
        .count;
    let collected = sieve_interval(7, 300_000, &config, CollectSink::default())
        .unwrap()
        .primes;
    assert_eq!(counted, collected.len() as u64);
}

#[test]
fn generator_includes_tiny_primes() {
    assert_eq!(count_primes(0, 100).unwrap(), 25);
    assert_eq!(count_primes(2, 5).unwrap(), 3);
    assert_eq!(primes(0, 10).unwrap(), [2, 3, 5, 7]);
}

#[test]
fn max_stop_is_published() {
    let max = SieveOfEratosthenes::<CountSink>::max_stop();
    assert_eq!(max, u64::MAX - 10 * u32::MAX as u64);
    assert_eq!(
        SieveOfEratosthenes::new(7, max + 1, &SieveConfig::default(), CountSink::default())
            .unwrap_err(),
        Error::Precondition("stop must be <= max_stop()")
    );
}
