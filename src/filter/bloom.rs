use super::FilterPolicy;
use crate::util::{Result, Status};

const MAX_PROBES: usize = 30;

/// Bloom filter policy built by the engine when a table factory asks for
/// `bits_per_key > 0`.
///
/// Filter layout: `ceil(n * bits_per_key / 8)` bytes of bit array (at least
/// 8 bytes) followed by one trailing byte holding the probe count.
#[derive(Debug, Clone)]
pub struct BloomFilterPolicy {
    bits_per_key: usize,
    num_probes: usize,
}

impl BloomFilterPolicy {
    pub fn new(bits_per_key: usize) -> Self {
        // k = bits_per_key * ln(2), rounded down
        let num_probes = ((bits_per_key as f64 * 0.69) as usize).clamp(1, MAX_PROBES);
        BloomFilterPolicy {
            bits_per_key,
            num_probes,
        }
    }

    /// Interprets the `bits_per_key` value carried across the binding:
    /// zero means "no filter", negative values are rejected.
    pub fn from_bits_per_key(bits_per_key: i32) -> Result<Option<Self>> {
        match bits_per_key {
            0 => Ok(None),
            b if b < 0 => Err(Status::invalid_argument(format!(
                "bloom filter bits_per_key must not be negative, got {b}"
            ))),
            b => Ok(Some(BloomFilterPolicy::new(b as usize))),
        }
    }

    pub fn bits_per_key(&self) -> usize {
        self.bits_per_key
    }

    pub fn num_probes(&self) -> usize {
        self.num_probes
    }

    /// Theoretical false positive rate, `(1 - e^(-k/b))^k`
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let k = self.num_probes as f64;
        let b = self.bits_per_key as f64;
        (1.0 - (-k / b).exp()).powf(k)
    }

    fn bloom_hash(data: &[u8]) -> u32 {
        let mut h = 0xbc9f1d34u32;
        for &b in data {
            h = h.wrapping_mul(0x9e3779b9).wrapping_add(b as u32);
        }
        h
    }

    fn probe_positions(key: &[u8], k: usize, bits: usize) -> impl Iterator<Item = usize> {
        let h = Self::bloom_hash(key);
        let delta = h.rotate_right(17);
        (0..k).map(move |i| h.wrapping_add((i as u32).wrapping_mul(delta)) as usize % bits)
    }
}

impl FilterPolicy for BloomFilterPolicy {
    fn name(&self) -> &str {
        "rocksdb.BuiltinBloomFilter"
    }

    fn create_filter(&self, keys: &[&[u8]]) -> Vec<u8> {
        if keys.is_empty() {
            return vec![0];
        }

        let bytes = (keys.len() * self.bits_per_key).max(64).div_ceil(8);
        let bits = bytes * 8;

        let mut filter = vec![0u8; bytes + 1];
        filter[bytes] = self.num_probes as u8;

        for key in keys {
            for pos in Self::probe_positions(key, self.num_probes, bits) {
                filter[pos / 8] |= 1 << (pos % 8);
            }
        }
        filter
    }

    fn may_contain(&self, filter: &[u8], key: &[u8]) -> bool {
        if filter.len() < 2 {
            return false;
        }

        let bytes = filter.len() - 1;
        let k = filter[bytes] as usize;
        if k > MAX_PROBES {
            // Reserved for future encodings
            return true;
        }

        Self::probe_positions(key, k, bytes * 8).all(|pos| filter[pos / 8] & (1 << (pos % 8)) != 0)
    }
}
