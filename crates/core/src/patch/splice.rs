//! Built-in splice codec
//!
//! Stores the bytes between the longest common prefix and the longest common
//! suffix of base and target. Documents saved after a local edit keep most of
//! their head and tail intact, so this is small for typical revisions and
//! needs no external tool.
//!
//! Delta layout (little endian):
//! ```text
//! magic     4 bytes  "QSP1"
//! base_len  u64      length of the base the delta was made against
//! prefix    u64      bytes kept from the start of base
//! suffix    u64      bytes kept from the end of base
//! insert    u64      length of the replacement bytes that follow
//! bytes     insert
//! ```

use super::{PatchError, PatchService};

const MAGIC: &[u8; 4] = b"QSP1";
const HEADER_LEN: usize = 4 + 8 * 4;

/// Dependency-free delta codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Splice;

impl PatchService for Splice {
    fn name(&self) -> &str {
        "builtin"
    }

    fn encode(&self, base: &[u8], target: &[u8]) -> Result<Vec<u8>, PatchError> {
        let prefix = base
            .iter()
            .zip(target)
            .take_while(|(a, b)| a == b)
            .count();

        let max_suffix = base.len().min(target.len()) - prefix;
        let suffix = base
            .iter()
            .rev()
            .zip(target.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let insert = &target[prefix..target.len() - suffix];

        let mut delta = Vec::with_capacity(HEADER_LEN + insert.len());
        delta.extend_from_slice(MAGIC);
        delta.extend_from_slice(&(base.len() as u64).to_le_bytes());
        delta.extend_from_slice(&(prefix as u64).to_le_bytes());
        delta.extend_from_slice(&(suffix as u64).to_le_bytes());
        delta.extend_from_slice(&(insert.len() as u64).to_le_bytes());
        delta.extend_from_slice(insert);
        Ok(delta)
    }

    fn decode(&self, base: &[u8], delta: &[u8]) -> Result<Vec<u8>, PatchError> {
        if delta.len() < HEADER_LEN {
            return Err(PatchError::DecodeFailed(format!(
                "delta too short: {} bytes",
                delta.len()
            )));
        }
        if &delta[..4] != MAGIC {
            return Err(PatchError::DecodeFailed("not a splice delta".to_string()));
        }

        let field = |i: usize| {
            let start = 4 + i * 8;
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&delta[start..start + 8]);
            u64::from_le_bytes(bytes) as usize
        };
        let (base_len, prefix, suffix, insert_len) = (field(0), field(1), field(2), field(3));

        if base_len != base.len() {
            return Err(PatchError::DecodeFailed(format!(
                "delta expects a {} byte base, got {} bytes",
                base_len,
                base.len()
            )));
        }
        if prefix.checked_add(suffix).map_or(true, |kept| kept > base_len) {
            return Err(PatchError::DecodeFailed(
                "delta keeps more bytes than the base has".to_string(),
            ));
        }
        if delta.len() - HEADER_LEN != insert_len {
            return Err(PatchError::DecodeFailed(format!(
                "delta payload is {} bytes, header says {}",
                delta.len() - HEADER_LEN,
                insert_len
            )));
        }

        let mut out = Vec::with_capacity(prefix + insert_len + suffix);
        out.extend_from_slice(&base[..prefix]);
        out.extend_from_slice(&delta[HEADER_LEN..]);
        out.extend_from_slice(&base[base_len - suffix..]);
        Ok(out)
    }
}
