use serde::{Deserialize, Serialize};
use splice_core::SpliceError;
use splice_synth::{SynthConfig, Synthesizer, UnboundedPolicy, Value};
use tracing::debug;

/// Width every member of an [`IntSet`] is stored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Two bytes.
    I16,
    /// Four bytes.
    I32,
    /// Eight bytes.
    I64,
}

impl Encoding {
    /// Bytes per member.
    pub fn width(self) -> usize {
        match self {
            Encoding::I16 => 2,
            Encoding::I32 => 4,
            Encoding::I64 => 8,
        }
    }

    /// Narrowest encoding that holds `value`.
    pub fn for_value(value: i64) -> Self {
        if i16::try_from(value).is_ok() {
            Encoding::I16
        } else if i32::try_from(value).is_ok() {
            Encoding::I32
        } else {
            Encoding::I64
        }
    }

    /// Smallest representable member.
    pub fn min(self) -> i64 {
        match self {
            Encoding::I16 => i64::from(i16::MIN),
            Encoding::I32 => i64::from(i32::MIN),
            Encoding::I64 => i64::MIN,
        }
    }

    /// Largest representable member.
    pub fn max(self) -> i64 {
        match self {
            Encoding::I16 => i64::from(i16::MAX),
            Encoding::I32 => i64::from(i32::MAX),
            Encoding::I64 => i64::MAX,
        }
    }

    fn read(self, bytes: &[u8], pos: usize) -> i64 {
        let at = pos * self.width();
        match self {
            Encoding::I16 => i64::from(i16::from_be_bytes([bytes[at], bytes[at + 1]])),
            Encoding::I32 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&bytes[at..at + 4]);
                i64::from(i32::from_be_bytes(raw))
            }
            Encoding::I64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[at..at + 8]);
                i64::from_be_bytes(raw)
            }
        }
    }

    /// Callers guarantee `value` fits.
    fn write(self, bytes: &mut [u8], pos: usize, value: i64) {
        let at = pos * self.width();
        match self {
            Encoding::I16 => bytes[at..at + 2].copy_from_slice(&(value as i16).to_be_bytes()),
            Encoding::I32 => bytes[at..at + 4].copy_from_slice(&(value as i32).to_be_bytes()),
            Encoding::I64 => bytes[at..at + 8].copy_from_slice(&value.to_be_bytes()),
        }
    }
}

/// Sorted set of unique integers packed big-endian into one byte buffer.
///
/// All members share the narrowest encoding that ever fit every inserted
/// value. The encoding widens on demand and never narrows.
#[derive(Debug, Clone)]
pub struct IntSet {
    encoding: Encoding,
    contents: Vec<u8>,
    synthesized: Vec<bool>,
    synth: SynthConfig,
}

impl Default for IntSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IntSet {
    /// Creates an empty 16-bit set.
    pub fn new() -> Self {
        Self::with_synth(SynthConfig::default())
    }

    /// Creates an empty 16-bit set that synthesizes under `synth`.
    pub fn with_synth(synth: SynthConfig) -> Self {
        Self {
            encoding: Encoding::I16,
            contents: Vec::new(),
            synthesized: Vec::new(),
            synth,
        }
    }

    /// Current encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.synthesized.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.synthesized.is_empty()
    }

    /// Packed buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.contents
    }

    /// Member at sorted position `pos`.
    pub fn get(&self, pos: usize) -> Option<i64> {
        (pos < self.len()).then(|| self.encoding.read(&self.contents, pos))
    }

    /// Whether the member at `pos` was produced by synthesis.
    pub fn is_synthesized(&self, pos: usize) -> bool {
        self.synthesized.get(pos).copied().unwrap_or(false)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len()).map(|pos| self.encoding.read(&self.contents, pos))
    }

    fn search(&self, value: i64) -> Result<usize, usize> {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let here = self.encoding.read(&self.contents, mid);
            if here == value {
                return Ok(mid);
            }
            if here < value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Err(lo)
    }

    /// Whether `value` is a member.
    pub fn find(&self, value: i64) -> bool {
        Encoding::for_value(value) <= self.encoding && self.search(value).is_ok()
    }

    /// Adds `value`; `false` when already present.
    pub fn add(&mut self, value: i64) -> bool {
        if Encoding::for_value(value) > self.encoding {
            self.upgrade_and_add(value);
            return true;
        }
        let pos = match self.search(value) {
            Ok(_) => return false,
            Err(pos) => pos,
        };
        let width = self.encoding.width();
        let len = self.len();
        self.contents.resize((len + 1) * width, 0);
        self.contents
            .copy_within(pos * width..len * width, (pos + 1) * width);
        self.encoding.write(&mut self.contents, pos, value);
        self.synthesized.insert(pos, false);
        true
    }

    /// A value that needs a wider encoding is smaller or larger than every
    /// member, so it lands at the front or the back.
    fn upgrade_and_add(&mut self, value: i64) {
        let old = self.encoding;
        let new = Encoding::for_value(value);
        let len = self.len();
        let prepend = value < 0;
        self.contents.resize((len + 1) * new.width(), 0);
        for pos in (0..len).rev() {
            let member = old.read(&self.contents, pos);
            let dst = if prepend { pos + 1 } else { pos };
            new.write(&mut self.contents, dst, member);
        }
        if prepend {
            new.write(&mut self.contents, 0, value);
            self.synthesized.insert(0, false);
        } else {
            new.write(&mut self.contents, len, value);
            self.synthesized.push(false);
        }
        debug!(from = ?old, to = ?new, members = len + 1, "int set encoding upgraded");
        self.encoding = new;
    }

    /// Removes `value`; the encoding is kept.
    pub fn delete(&mut self, value: i64) -> bool {
        if Encoding::for_value(value) > self.encoding {
            return false;
        }
        let Ok(pos) = self.search(value) else {
            return false;
        };
        let width = self.encoding.width();
        let len = self.len();
        self.contents
            .copy_within((pos + 1) * width..len * width, pos * width);
        self.contents.truncate((len - 1) * width);
        self.synthesized.remove(pos);
        true
    }

    /// Replaces the member at `pos` with a synthesized value that stays
    /// strictly between its neighbours and inside the current encoding.
    ///
    /// The member is only written back unchanged when it is the single
    /// in-width value between its neighbours.
    pub fn synthesize(&mut self, pos: usize) -> Result<bool, SpliceError> {
        if pos >= self.len() {
            return Err(SpliceError::index_out_of_range("int-set", pos, self.len()));
        }
        let mut synth = Synthesizer::for_type::<i64>(&self.synth)?;
        synth
            .greater_or_equal(&Value::Int(self.encoding.min()))?
            .less_or_equal(&Value::Int(self.encoding.max()))?;
        if let Some(prev) = pos.checked_sub(1).and_then(|p| self.get(p)) {
            synth.greater_than(&Value::Int(prev))?;
        }
        if let Some(next) = self.get(pos + 1) {
            synth.less_than(&Value::Int(next))?;
        }
        let fallback = synth.clone();
        let original = self.encoding.read(&self.contents, pos);
        synth.not_equal(&Value::Int(original))?;
        let solved = match synth.solve()? {
            Some(value) => Some(value),
            None => fallback.solve()?,
        };
        match solved {
            Some(Value::Int(value)) => {
                debug!(pos, value, encoding = ?self.encoding, "int set member synthesized");
                self.encoding.write(&mut self.contents, pos, value);
                self.synthesized[pos] = true;
                Ok(true)
            }
            _ => match self.synth.unbounded {
                UnboundedPolicy::Reflag => {
                    self.synthesized[pos] = true;
                    Ok(true)
                }
                UnboundedPolicy::Reject => Ok(false),
            },
        }
    }
}
