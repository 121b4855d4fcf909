use alloc::vec::Vec;

use crate::segment::Segment;

/// Consumes finalized segments, one call per segment in ascending order of
/// [`Segment::low`].
pub trait SegmentSink {
    /// Returns `false` to stop the sieve: the current segment is complete and
    /// delivered, and no further segment will be sieved.
    fn segment_processed(&mut self, segment: &Segment<'_>) -> bool;
}

/// Counts the primes of every delivered segment.
#[derive(Clone, Debug, Default)]
pub struct CountSink {
    pub count: u64,
}

impl SegmentSink for CountSink {
    fn segment_processed(&mut self, segment: &Segment<'_>) -> bool {
        self.count += segment.count();
        true
    }
}

/// Collects the decoded primes of every delivered segment.
#[derive(Clone, Debug, Default)]
pub struct CollectSink {
    pub primes: Vec<u64>,
}

impl SegmentSink for CollectSink {
    fn segment_processed(&mut self, segment: &Segment<'_>) -> bool {
        self.primes.extend(segment.primes());
        true
    }
}
