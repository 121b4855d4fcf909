//! Cross-off tier for the largest sieving primes.

use alloc::vec::Vec;

use crate::bucket::{BucketArena, NONE};
use crate::error::Error;
use crate::wheel::{SievingPrime, WHEEL30};

/// The largest stop the engine supports. One wheel step advances a multiple
/// by at most `6 * prime` with `prime` < 2³², and this headroom keeps that
/// advance, and the first-multiple computation, inside u64.
pub(crate) const MAX_STOP: u64 = u64::MAX - 10 * u32::MAX as u64;

/// Crosses off multiples of sieving primes above the medium threshold, up to
/// `√stop`. Such a prime strikes a segment at most about once, so scanning
/// every prime every segment would be wasted work. Instead each prime is
/// filed, by the segment its next multiple falls into, in a rotating array of
/// bucket lists: list 0 holds this segment's strikes, list d the strikes d
/// segments ahead. Per segment the tier drains list 0, strikes once per
/// entry, re-files each prime by its new segment distance, then rotates.
#[derive(Debug)]
pub(crate) struct EratBig {
    stop: u64,
    log2_size: u32,
    modulo_size: u32,
    lists: Vec<u32>,
    modulo_lists: u32,
    head_index: u32,
    arena: BucketArena,
}

impl EratBig {
    /// `sieve_size` must be a power of two. The list array is sized so that
    /// one wheel step can never overshoot the rotating window.
    pub(crate) fn new(stop: u64, sieve_size: usize, sqrt_stop: u64) -> Result<EratBig, Error> {
        debug_assert!(sieve_size.is_power_of_two());
        let log2_size = sieve_size.trailing_zeros();
        let max_stride = (sqrt_stop / 30) as usize * 6 + 6;
        let max_index = sieve_size - 1 + max_stride;
        let lists_len = ((max_index >> log2_size) + 1).next_power_of_two();
        let mut lists = Vec::new();
        lists
            .try_reserve_exact(lists_len)
            .map_err(|_| Error::Allocation("big-tier lists"))?;
        lists.resize(lists_len, NONE);
        Ok(EratBig {
            stop,
            log2_size,
            modulo_size: sieve_size as u32 - 1,
            lists,
            modulo_lists: lists_len as u32 - 1,
            head_index: 0,
            arena: BucketArena::new(),
        })
    }

    pub(crate) fn add(&mut self, prime: u64, segment_low: u64) -> Result<(), Error> {
        if let Some(sp) = SievingPrime::new(prime, segment_low, self.stop) {
            self.store(sp)?;
        }
        Ok(())
    }

    /// Files a prime into the list of the segment its multiple falls in,
    /// reducing `multiple_index` to an offset within that segment.
    fn store(&mut self, mut sp: SievingPrime) -> Result<(), Error> {
        let segment = sp.multiple_index >> self.log2_size;
        sp.multiple_index &= self.modulo_size;
        let slot = ((self.head_index + segment) & self.modulo_lists) as usize;
        let mut head = self.lists[slot];
        self.arena.push(&mut head, sp)?;
        self.lists[slot] = head;
        Ok(())
    }

    /// Strikes this segment's entries and re-files them. Entries whose next
    /// multiple stays in the current segment land back in list 0, so the
    /// drain loops until the list is empty.
    pub(crate) fn cross_off(&mut self, sieve: &mut [u8]) -> Result<(), Error> {
        let slot = self.head_index as usize;
        while self.lists[slot] != NONE {
            let mut current = self.lists[slot];
            self.lists[slot] = NONE;
            while current != NONE {
                let len = self.arena.get(current).len as usize;
                let next = self.arena.get(current).next;
                for entry in 0..len {
                    let mut sp = self.arena.get(current).entries[entry];
                    let element = WHEEL30[sp.a as usize][sp.wheel_index as usize];
                    sieve[sp.multiple_index as usize] &= element.unset_bit;
                    sp.multiple_index +=
                        sp.k * element.next_multiple_factor as u32 + element.correct as u32;
                    sp.wheel_index = (sp.wheel_index + 1) & 7;
                    self.store(sp)?;
                }
                self.arena.free(current);
                current = next;
            }
        }
        self.head_index = (self.head_index + 1) & self.modulo_lists;
        Ok(())
    }

    /// Total sieving primes filed across all lists.
    #[cfg(test)]
    fn filed_entries(&self) -> usize {
        let mut total = 0;
        for &head in self.lists.iter() {
            let mut current = head;
            while current != NONE {
                total += self.arena.get(current).len as usize;
                current = self.arena.get(current).next;
            }
        }
        total
    }
}
