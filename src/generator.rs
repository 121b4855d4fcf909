//! Convenience layer wiring a small-prime producer to the segment driver.

use alloc::vec::Vec;

use crate::bitvec::BitVec;
use crate::config::SieveConfig;
use crate::eratosthenes::SieveOfEratosthenes;
use crate::error::Error;
use crate::traits::{CollectSink, CountSink, SegmentSink};
use crate::util;

/// The primes below 7, which the engine never reports.
const TINY_PRIMES: [u64; 3] = [2, 3, 5];

/// All primes up to `limit` inclusive, ascending, from an odds-only bit
/// vector sieve. This is the producer that feeds sieving primes `<= √stop`
/// to the segment driver; it materializes its range, so keep `limit` to the
/// square-root scale.
#[must_use]
pub fn small_primes(limit: u64) -> Vec<u64> {
    let mut primes = Vec::new();
    if limit < 2 {
        return primes;
    }
    primes.push(2);

    // index i stands for the odd number 2 * i + 3
    let size = ((limit - 1) / 2) as usize;
    let mut is_composite = BitVec::new(size);
    let mut i = 0;
    loop {
        let p = 2 * i as u64 + 3;
        if p * p > limit {
            break;
        }
        if !is_composite.get(i) {
            let mut multiple = ((p * p - 3) / 2) as usize;
            while multiple < size {
                is_composite.set(multiple);
                multiple += p as usize;
            }
        }
        i += 1;
    }
    for i in 0..size {
        if !is_composite.get(i) {
            primes.push(2 * i as u64 + 3);
        }
    }
    primes
}

/// Runs the engine over [start, stop], feeding it sieving primes from
/// [`small_primes`], and returns the sink. Engine preconditions apply
/// (`start >= 7` in particular); primes 2, 3, 5 are the caller's concern.
pub fn sieve_interval<S: SegmentSink>(
    start: u64,
    stop: u64,
    config: &SieveConfig,
    sink: S,
) -> Result<S, Error> {
    let mut sieve = SieveOfEratosthenes::new(start, stop, config, sink)?;
    for prime in small_primes(util::isqrt(stop)) {
        if prime >= 7 {
            sieve.add_sieving_prime(prime)?;
        }
    }
    sieve.finish()
}

/// All primes in [start, stop], including 2, 3, 5 when they fall in range.
pub fn primes(start: u64, stop: u64) -> Result<Vec<u64>, Error> {
    if start > stop {
        return Err(Error::Precondition("start must be <= stop"));
    }
    let mut result = Vec::new();
    for &p in TINY_PRIMES.iter() {
        if start <= p && p <= stop {
            result.push(p);
        }
    }
    if stop >= 7 {
        let sink = sieve_interval(
            u64::max(start, 7),
            stop,
            &SieveConfig::default(),
            CollectSink::default(),
        )?;
        result.extend(sink.primes);
    }
    Ok(result)
}

/// Number of primes in [start, stop].
pub fn count_primes(start: u64, stop: u64) -> Result<u64, Error> {
    if start > stop {
        return Err(Error::Precondition("start must be <= stop"));
    }
    let mut count = TINY_PRIMES
        .iter()
        .filter(|&&p| start <= p && p <= stop)
        .count() as u64;
    if stop >= 7 {
        let sink = sieve_interval(
            u64::max(start, 7),
            stop,
            &SieveConfig::default(),
            CountSink::default(),
        )?;
        count += sink.count;
    }
    Ok(count)
}
