//! Cross-off tier for the smallest sieving primes.

use alloc::vec::Vec;

use crate::error::Error;
use crate::wheel::{SievingPrime, WHEEL, WHEEL30};

/// Crosses off multiples of sieving primes up to a small fraction of the
/// segment size. Primes this dense strike dozens of times per segment, so the
/// inner loop runs whole wheel rotations: 8 strikes advance the byte index by
/// exactly the prime, which keeps one bounds comparison per rotation instead
/// of one per strike.
#[derive(Debug)]
pub(crate) struct EratSmall {
    stop: u64,
    limit: u64,
    primes: Vec<SievingPrime>,
}

impl EratSmall {
    pub(crate) fn new(stop: u64, limit: u64) -> EratSmall {
        EratSmall {
            stop,
            limit,
            primes: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, prime: u64, segment_low: u64) -> Result<(), Error> {
        debug_assert!(prime <= self.limit);
        if let Some(sp) = SievingPrime::new(prime, segment_low, self.stop) {
            self.primes
                .try_reserve(1)
                .map_err(|_| Error::Allocation("small-tier primes"))?;
            self.primes.push(sp);
        }
        Ok(())
    }

    /// Crosses off every multiple inside the current segment and leaves each
    /// prime's state pointing into the next segment.
    pub(crate) fn cross_off(&mut self, sieve: &mut [u8]) {
        let size = sieve.len();
        for sp in self.primes.iter_mut() {
            let k = sp.k as usize;
            let row = &WHEEL30[sp.a as usize];
            let prime = k * 30 + WHEEL[sp.a as usize] as usize;
            let mut wheel_index = sp.wheel_index as usize;
            let mut index = sp.multiple_index as usize;
            // every strike of a full rotation lands below index + prime
            while index + prime <= size {
                for _ in 0..8 {
                    let element = &row[wheel_index];
                    sieve[index] &= element.unset_bit;
                    index += k * element.next_multiple_factor as usize + element.correct as usize;
                    wheel_index = (wheel_index + 1) & 7;
                }
            }
            while index < size {
                let element = &row[wheel_index];
                sieve[index] &= element.unset_bit;
                index += k * element.next_multiple_factor as usize + element.correct as usize;
                wheel_index = (wheel_index + 1) & 7;
            }
            sp.multiple_index = (index - size) as u32;
            sp.wheel_index = wheel_index as u8;
        }
    }
}
