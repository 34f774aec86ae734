use splice_core::{CustomHash, SpliceError, Untrusted};
use splice_synth::{SymbolicHash, SynthConfig, Synthesizable, Synthesizer};
use tracing::debug;

use crate::config::ContainerConfig;

/// Separate-chaining hash table with a fixed bucket array.
///
/// Buckets are chosen by [`CustomHash`] so a key and its hash-preserving
/// stand-in always share a bucket. The table never rehashes.
#[derive(Debug, Clone)]
pub struct HashTable<K, V> {
    buckets: Vec<Vec<(Untrusted<K>, V)>>,
    len: usize,
    synth: SynthConfig,
}

impl<K, V> Default for HashTable<K, V>
where
    K: CustomHash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> HashTable<K, V>
where
    K: CustomHash + Eq,
{
    /// Creates a table with the default bucket count.
    pub fn new() -> Self {
        let buckets = ContainerConfig::default().bucket_count;
        Self {
            buckets: (0..buckets).map(|_| Vec::new()).collect(),
            len: 0,
            synth: SynthConfig::default(),
        }
    }

    /// Creates a table from explicit configuration.
    pub fn with_config(config: &ContainerConfig, synth: SynthConfig) -> Result<Self, SpliceError> {
        config.validate()?;
        Ok(Self {
            buckets: (0..config.bucket_count).map(|_| Vec::new()).collect(),
            len: 0,
            synth,
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket a key belongs to.
    pub fn bucket_of(&self, raw: &K) -> usize {
        (raw.custom_hash() % self.buckets.len() as u64) as usize
    }

    fn slot(&self, raw: &K) -> (usize, Option<usize>) {
        let bucket = self.bucket_of(raw);
        let slot = self.buckets[bucket]
            .iter()
            .position(|(key, _)| key.raw() == raw);
        (bucket, slot)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn set(&mut self, key: Untrusted<K>, value: V) -> Option<V> {
        match self.slot(key.raw()) {
            (bucket, Some(slot)) => {
                let entry = &mut self.buckets[bucket][slot];
                entry.0 = key;
                Some(std::mem::replace(&mut entry.1, value))
            }
            (bucket, None) => {
                self.buckets[bucket].push((key, value));
                self.len += 1;
                None
            }
        }
    }

    /// Value stored under `raw`.
    pub fn get(&self, raw: &K) -> Option<&V> {
        let (bucket, slot) = self.slot(raw);
        slot.map(|slot| &self.buckets[bucket][slot].1)
    }

    /// Mutable value stored under `raw`.
    pub fn get_mut(&mut self, raw: &K) -> Option<&mut V> {
        let (bucket, slot) = self.slot(raw);
        slot.map(|slot| &mut self.buckets[bucket][slot].1)
    }

    /// Stored key equal to `raw`, with its flags.
    pub fn key(&self, raw: &K) -> Option<&Untrusted<K>> {
        let (bucket, slot) = self.slot(raw);
        slot.map(|slot| &self.buckets[bucket][slot].0)
    }

    /// Whether `raw` is present.
    pub fn contains_key(&self, raw: &K) -> bool {
        self.slot(raw).1.is_some()
    }

    /// Removes `raw`, returning its value.
    pub fn delete(&mut self, raw: &K) -> Option<V> {
        let (bucket, slot) = self.slot(raw);
        let (_, value) = self.buckets[bucket].remove(slot?);
        self.len -= 1;
        Some(value)
    }

    /// Entries, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&Untrusted<K>, &V)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|(key, value)| (key, value))
    }
}

impl<K, V> HashTable<K, V>
where
    K: CustomHash + Synthesizable + SymbolicHash,
{
    /// Replaces the key `raw` with a synthesized key of the same hash,
    /// leaving its value in place.
    ///
    /// Returns `Ok(false)` without touching the table when `raw` is absent or
    /// no key with that hash exists. A key different from `raw` is preferred;
    /// when none exists `raw` itself is written back flagged as synthesized.
    pub fn synthesize(&mut self, raw: &K) -> Result<bool, SpliceError> {
        let (bucket, Some(slot)) = self.slot(raw) else {
            return Ok(false);
        };
        let hash = raw.custom_hash();
        let mut synth = Synthesizer::for_type::<K>(&self.synth)?;
        synth.equals_under(K::hash_term, i128::from(hash))?;
        for (other, _) in self.buckets[bucket]
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != slot)
            .map(|(_, entry)| entry)
        {
            synth.not_equal(&other.raw().to_value())?;
        }
        let fallback = synth.clone();
        synth.not_equal(&raw.to_value())?;
        let solved = match synth.solve()? {
            Some(value) => Some(value),
            None => fallback.solve()?,
        };
        let Some(key) = solved.and_then(K::from_value) else {
            debug!(bucket, "no key with the same hash");
            return Ok(false);
        };
        debug!(bucket, hash, distinct = key != *raw, "hash-preserving key synthesized");
        self.buckets[bucket][slot].0 = Untrusted::synthesized(key);
        Ok(true)
    }
}
