//! Index-linked bucket storage for sieving primes.
//!
//! The medium and big tiers file primes into fixed-capacity buckets chained
//! into lists. Buckets live in one arena and reference each other by slot
//! index, never by pointer, so list heads stay valid when the arena grows and
//! teardown is a single deallocation. Freed buckets go on an explicit free
//! list and are reused before the arena grows.

use alloc::vec::Vec;

use crate::error::Error;
use crate::wheel::SievingPrime;

pub(crate) const BUCKET_CAPACITY: usize = 1024;

/// Sentinel for "no bucket" in chain links and list heads.
pub(crate) const NONE: u32 = u32::MAX;

#[derive(Debug)]
pub(crate) struct Bucket {
    pub entries: [SievingPrime; BUCKET_CAPACITY],
    pub len: u32,
    pub next: u32,
}

#[derive(Debug)]
pub(crate) struct BucketArena {
    slots: Vec<Bucket>,
    free_head: u32,
}

impl BucketArena {
    pub fn new() -> BucketArena {
        BucketArena {
            slots: Vec::new(),
            free_head: NONE,
        }
    }

    /// Allocates an empty bucket chained in front of `next`, reusing a freed
    /// slot when one is available.
    pub fn alloc(&mut self, next: u32) -> Result<u32, Error> {
        if self.free_head != NONE {
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            self.free_head = slot.next;
            slot.len = 0;
            slot.next = next;
            return Ok(index);
        }
        self.slots
            .try_reserve(1)
            .map_err(|_| Error::Allocation("bucket arena"))?;
        let index = self.slots.len() as u32;
        self.slots.push(Bucket {
            entries: [SievingPrime::NULL; BUCKET_CAPACITY],
            len: 0,
            next,
        });
        Ok(index)
    }

    pub fn free(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.len = 0;
        slot.next = self.free_head;
        self.free_head = index;
    }

    pub fn get(&self, index: u32) -> &Bucket {
        &self.slots[index as usize]
    }

    pub fn get_mut(&mut self, index: u32) -> &mut Bucket {
        &mut self.slots[index as usize]
    }

    /// Appends to the chain headed at `*head`, growing it when the head
    /// bucket is full.
    pub fn push(&mut self, head: &mut u32, prime: SievingPrime) -> Result<(), Error> {
        if *head == NONE || self.get(*head).len as usize == BUCKET_CAPACITY {
            *head = self.alloc(*head)?;
        }
        let bucket = self.get_mut(*head);
        bucket.entries[bucket.len as usize] = prime;
        bucket.len += 1;
        Ok(())
    }
}
