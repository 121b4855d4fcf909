//! Segment driver of the sieve of Eratosthenes.

use alloc::vec::Vec;
use tracing::{event, Level};

use crate::config::SieveConfig;
use crate::erat_big::{EratBig, MAX_STOP};
use crate::erat_medium::EratMedium;
use crate::erat_small::EratSmall;
use crate::error::Error;
use crate::presieve::PreSieve;
use crate::segment::Segment;
use crate::traits::SegmentSink;
use crate::util;
use crate::wheel::{BIT_VALUES, NUMBERS_PER_BYTE};

/// Segmented sieve of Eratosthenes over [start, stop] with a mod-30 wheel.
///
/// The driver owns the segment bitmap, the pre-sieve mask, and up to three
/// cross-off tiers partitioned by sieving-prime size. An external producer
/// feeds it every prime `7 <= p <= √stop` in ascending order through
/// [`add_sieving_prime`]; the driver sieves ahead far enough that `p²` is
/// always inside the current segment window before `p` is stored, which keeps
/// every tier's first-multiple offset small. [`finish`] sieves the remaining
/// segments and hands the sink back.
///
/// Each finalized segment goes to the [`SegmentSink`] exactly once, in
/// ascending order of segment base. The engine reports no prime below 7;
/// callers that want 2, 3, 5 add them separately (cf. [`primes`]).
///
/// [`add_sieving_prime`]: SieveOfEratosthenes::add_sieving_prime
/// [`finish`]: SieveOfEratosthenes::finish
/// [`primes`]: crate::primes
#[derive(Debug)]
pub struct SieveOfEratosthenes<S> {
    start: u64,
    stop: u64,
    sqrt_stop: u64,
    segment_low: u64,
    segment_high: u64,
    sieve_size: usize,
    sieve: Vec<u8>,
    limit_pre_sieve: u64,
    limit_erat_small: u64,
    limit_erat_medium: u64,
    pre_sieve: PreSieve,
    erat_small: Option<EratSmall>,
    erat_medium: Option<EratMedium>,
    erat_big: Option<EratBig>,
    last_prime: u64,
    stopped: bool,
    sink: S,
}

/// `n % 30` mapped into [2, 31], so that `n - byte_remainder(n)` is the
/// multiple of 30 whose byte covers `n`.
fn byte_remainder(n: u64) -> u64 {
    let r = n % NUMBERS_PER_BYTE;
    if r <= 1 {
        r + NUMBERS_PER_BYTE
    } else {
        r
    }
}

impl<S: SegmentSink> SieveOfEratosthenes<S> {
    /// The hard upper bound on `stop`.
    #[must_use]
    pub const fn max_stop() -> u64 {
        MAX_STOP
    }

    pub fn new(start: u64, stop: u64, config: &SieveConfig, sink: S) -> Result<Self, Error> {
        if start < 7 {
            return Err(Error::Precondition("start must be >= 7"));
        }
        if start > stop {
            return Err(Error::Precondition("start must be <= stop"));
        }
        if stop > MAX_STOP {
            return Err(Error::Precondition("stop must be <= max_stop()"));
        }
        if !(1..=4096).contains(&config.sieve_size_kib) {
            return Err(Error::Precondition("sieve size must be in [1, 4096] KiB"));
        }
        if !(13..=23).contains(&config.pre_sieve) {
            return Err(Error::Precondition("pre-sieve limit must be in [13, 23]"));
        }

        let sqrt_stop = util::isqrt(stop);
        let sieve_size = util::floor_pow2(config.sieve_size_kib) as usize * 1024;
        let limit_pre_sieve = config.pre_sieve as u64;
        let limit_erat_small = (sieve_size as f64 * config.factor_small) as u64;
        let limit_erat_medium = (sieve_size as f64 * config.factor_medium) as u64;
        let segment_low = start - byte_remainder(start);

        let mut sieve = Vec::new();
        sieve
            .try_reserve_exact(sieve_size)
            .map_err(|_| Error::Allocation("segment bitmap"))?;
        sieve.resize(sieve_size, 0);

        let pre_sieve = PreSieve::new(limit_pre_sieve)?;
        let erat_small =
            (sqrt_stop > limit_pre_sieve).then(|| EratSmall::new(stop, limit_erat_small));
        let erat_medium =
            (sqrt_stop > limit_erat_small).then(|| EratMedium::new(stop, limit_erat_medium));
        let erat_big = if sqrt_stop > limit_erat_medium {
            Some(EratBig::new(stop, sieve_size, sqrt_stop)?)
        } else {
            None
        };

        event!(
            Level::DEBUG,
            "sieving [{}, {}] with {} byte segments, tier limits {} / {} / {}",
            start,
            stop,
            sieve_size,
            limit_pre_sieve,
            limit_erat_small,
            limit_erat_medium
        );

        Ok(SieveOfEratosthenes {
            start,
            stop,
            sqrt_stop,
            segment_low,
            segment_high: segment_low + sieve_size as u64 * NUMBERS_PER_BYTE + 1,
            sieve_size,
            sieve,
            limit_pre_sieve,
            limit_erat_small,
            limit_erat_medium,
            pre_sieve,
            erat_small,
            erat_medium,
            erat_big,
            last_prime: 0,
            stopped: false,
            sink,
        })
    }

    /// Exact floor of `√stop`; the producer must feed every prime up to it.
    #[must_use]
    pub fn sqrt_stop(&self) -> u64 {
        self.sqrt_stop
    }

    /// Segment size in bytes after power-of-two coercion.
    #[must_use]
    pub fn sieve_size(&self) -> usize {
        self.sieve_size
    }

    /// Registers a sieving prime. Primes must arrive in ascending order and
    /// not exceed `√stop`. Primes covered by the pre-sieve mask are
    /// discarded; the rest are routed to a tier by magnitude, after the
    /// driver has sieved far enough ahead that `p²` lies within the current
    /// segment window.
    pub fn add_sieving_prime(&mut self, prime: u64) -> Result<(), Error> {
        if prime <= self.last_prime {
            return Err(Error::Precondition(
                "sieving primes must be added in ascending order",
            ));
        }
        if prime > self.sqrt_stop {
            return Err(Error::Precondition("sieving primes must be <= sqrt(stop)"));
        }
        self.last_prime = prime;
        if prime <= self.limit_pre_sieve || self.stopped {
            return Ok(());
        }

        let square = prime * prime;
        while self.segment_high < square {
            self.sieve_segment()?;
            if self.stopped {
                return Ok(());
            }
            self.advance();
        }

        if prime <= self.limit_erat_small {
            if let Some(tier) = self.erat_small.as_mut() {
                tier.add(prime, self.segment_low)?;
            }
        } else if prime <= self.limit_erat_medium {
            if let Some(tier) = self.erat_medium.as_mut() {
                tier.add(prime, self.segment_low)?;
            }
        } else if let Some(tier) = self.erat_big.as_mut() {
            tier.add(prime, self.segment_low)?;
        }
        Ok(())
    }

    /// Sieves all remaining segments up to `stop` and returns the sink.
    /// Call after the producer has delivered every prime `<= √stop`.
    pub fn finish(mut self) -> Result<S, Error> {
        while !self.stopped && self.segment_high < self.stop {
            self.sieve_segment()?;
            self.advance();
        }
        if !self.stopped {
            self.finish_last_segment()?;
        }
        Ok(self.sink)
    }

    fn advance(&mut self) {
        self.segment_low += self.sieve_size as u64 * NUMBERS_PER_BYTE;
        self.segment_high += self.sieve_size as u64 * NUMBERS_PER_BYTE;
    }

    fn sieve_segment(&mut self) -> Result<(), Error> {
        self.pre_sieve_segment();
        self.cross_off_multiples()?;
        let segment = Segment::new(self.segment_low, &self.sieve[..self.sieve_size]);
        if !self.sink.segment_processed(&segment) {
            self.stopped = true;
        }
        Ok(())
    }

    /// The last segment is shrunk so it ends just past `stop`, then bits
    /// above `stop` are cleared and the tail is zeroed out to a word
    /// boundary so word-wise consumers read no stale data.
    fn finish_last_segment(&mut self) -> Result<(), Error> {
        let remainder = byte_remainder(self.stop);
        self.sieve_size = (((self.stop - remainder) - self.segment_low) / NUMBERS_PER_BYTE) as usize + 1;
        self.segment_high = self.segment_low + self.sieve_size as u64 * NUMBERS_PER_BYTE + 1;
        self.pre_sieve_segment();
        self.cross_off_multiples()?;

        let mut keep = 0;
        while keep < 8 && BIT_VALUES[keep] as u64 <= remainder {
            keep += 1;
        }
        self.sieve[self.sieve_size - 1] &= !(0xffu32 << keep) as u8;
        let mut i = self.sieve_size;
        while i % 8 != 0 {
            self.sieve[i] = 0;
            i += 1;
        }

        event!(
            Level::DEBUG,
            "sieved up to {} ({} byte final segment)",
            self.stop,
            self.sieve_size
        );
        let segment = Segment::new(self.segment_low, &self.sieve[..self.sieve_size]);
        self.sink.segment_processed(&segment);
        Ok(())
    }

    fn pre_sieve_segment(&mut self) {
        self.pre_sieve
            .apply(&mut self.sieve[..self.sieve_size], self.segment_low);

        // first segment: clear bits below start, but keep byte 0's residues
        // (all prime) when the pre-sieve mask would have wiped them
        if self.segment_low <= self.start {
            if self.start <= self.pre_sieve.limit() {
                self.sieve[0] = 0xff;
            }
            let remainder = byte_remainder(self.start);
            let mut skip = 0;
            while (BIT_VALUES[skip] as u64) < remainder {
                skip += 1;
            }
            self.sieve[0] &= (0xffu32 << skip) as u8;
        }
    }

    /// Tiers always work on the full-size buffer: in the shrunk last segment
    /// the big tier's scheduled offsets still span the full segment, and
    /// strikes past `sieve_size` land in bytes that are never delivered.
    fn cross_off_multiples(&mut self) -> Result<(), Error> {
        let sieve = self.sieve.as_mut_slice();
        if let Some(tier) = self.erat_small.as_mut() {
            tier.cross_off(sieve);
        }
        if let Some(tier) = self.erat_medium.as_mut() {
            tier.cross_off(sieve);
        }
        if let Some(tier) = self.erat_big.as_mut() {
            tier.cross_off(sieve)?;
        }
        Ok(())
    }
}
