//! Cross-off tier for medium sieving primes.

use crate::bucket::{BucketArena, NONE};
use crate::error::Error;
use crate::wheel::{SievingPrime, WHEEL30};

/// Crosses off multiples of sieving primes between the small and big tier
/// thresholds. These primes strike a segment a handful of times, too sparsely
/// for the small tier's rotation unrolling to pay off, so each prime runs a
/// plain strike loop. Primes live in chained buckets walked once per segment.
#[derive(Debug)]
pub(crate) struct EratMedium {
    stop: u64,
    limit: u64,
    head: u32,
    arena: BucketArena,
}

impl EratMedium {
    pub(crate) fn new(stop: u64, limit: u64) -> EratMedium {
        EratMedium {
            stop,
            limit,
            head: NONE,
            arena: BucketArena::new(),
        }
    }

    pub(crate) fn add(&mut self, prime: u64, segment_low: u64) -> Result<(), Error> {
        debug_assert!(prime <= self.limit);
        if let Some(sp) = SievingPrime::new(prime, segment_low, self.stop) {
            let mut head = self.head;
            self.arena.push(&mut head, sp)?;
            self.head = head;
        }
        Ok(())
    }

    /// Crosses off every multiple inside the current segment and leaves each
    /// prime's state pointing into the next segment.
    pub(crate) fn cross_off(&mut self, sieve: &mut [u8]) {
        let size = sieve.len();
        let mut current = self.head;
        while current != NONE {
            let bucket = self.arena.get_mut(current);
            let next = bucket.next;
            let len = bucket.len as usize;
            for sp in bucket.entries[..len].iter_mut() {
                let k = sp.k as usize;
                let row = &WHEEL30[sp.a as usize];
                let mut wheel_index = sp.wheel_index as usize;
                let mut index = sp.multiple_index as usize;
                while index < size {
                    let element = &row[wheel_index];
                    sieve[index] &= element.unset_bit;
                    index += k * element.next_multiple_factor as usize + element.correct as usize;
                    wheel_index = (wheel_index + 1) & 7;
                }
                sp.multiple_index = (index - size) as u32;
                sp.wheel_index = wheel_index as u8;
            }
            current = next;
        }
    }
}
