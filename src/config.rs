/// Tunable knobs of the engine, passed at construction.
#[derive(Copy, Clone, Debug)]
pub struct SieveConfig {
    /// Segment size in KiB, within [1, 4096]; coerced down to a power of two.
    pub sieve_size_kib: u32,
    /// Pre-sieve multiples of the wheel primes `<=` this limit, within
    /// [13, 23]. Higher limits trade mask memory for less cross-off work.
    pub pre_sieve: u32,
    /// Upper prime bound of the small tier, as a fraction of the segment
    /// size in bytes.
    pub factor_small: f64,
    /// Upper prime bound of the medium tier, as a multiple of the segment
    /// size in bytes.
    pub factor_medium: f64,
}

impl Default for SieveConfig {
    fn default() -> SieveConfig {
        SieveConfig {
            sieve_size_kib: 32,
            pre_sieve: 19,
            factor_small: 0.75,
            factor_medium: 9.0,
        }
    }
}

impl SieveConfig {
    /// Sizes the segment to the cache hierarchy: the whole L1 data cache
    /// when known, otherwise half of L2, otherwise the default.
    #[must_use]
    pub fn with_cache_sizes(cache: &CacheSizes) -> SieveConfig {
        let kib = cache
            .l1d
            .map(|bytes| bytes / 1024)
            .or(cache.l2.map(|bytes| bytes / 2048))
            .unwrap_or(32);
        SieveConfig {
            sieve_size_kib: kib.clamp(1, 4096) as u32,
            ..SieveConfig::default()
        }
    }
}

/// CPU cache sizes in bytes, as far as the platform layer knows them.
///
/// A construction-time capability: callers that detect the cache hierarchy
/// fill this in, the crate itself performs no detection and holds no global
/// state.
#[derive(Copy, Clone, Debug, Default)]
pub struct CacheSizes {
    pub l1d: Option<u64>,
    pub l2: Option<u64>,
    pub l3: Option<u64>,
}
