//! Binary delta encoding behind a narrow capability interface
//!
//! The engine never assumes a particular diff tool is installed. Every
//! implementation reports an explicit "unavailable" outcome when it cannot
//! run at all, separately from a run that produced an error.

mod splice;
mod xdelta;

pub use splice::Splice;
pub use xdelta::Xdelta3;

/// Errors reported by a patch service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("delta encoder unavailable: {0}")]
    EncodeUnavailable(String),

    #[error("delta encoding failed: {0}")]
    EncodeFailed(String),

    #[error("delta decoder unavailable: {0}")]
    DecodeUnavailable(String),

    #[error("delta decoding failed: {0}")]
    DecodeFailed(String),
}

/// Encode and decode binary deltas
///
/// Both operations are pure functions of their inputs. `decode(base,
/// encode(base, target)?)` must return `target` exactly.
pub trait PatchService {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Produce a delta that turns `base` into `target`
    fn encode(&self, base: &[u8], target: &[u8]) -> Result<Vec<u8>, PatchError>;

    /// Apply `delta` to `base`
    fn decode(&self, base: &[u8], delta: &[u8]) -> Result<Vec<u8>, PatchError>;
}

impl<T: PatchService + ?Sized> PatchService for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn encode(&self, base: &[u8], target: &[u8]) -> Result<Vec<u8>, PatchError> {
        (**self).encode(base, target)
    }

    fn decode(&self, base: &[u8], delta: &[u8]) -> Result<Vec<u8>, PatchError> {
        (**self).decode(base, delta)
    }
}

impl<T: PatchService + ?Sized> PatchService for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn encode(&self, base: &[u8], target: &[u8]) -> Result<Vec<u8>, PatchError> {
        (**self).encode(base, target)
    }

    fn decode(&self, base: &[u8], delta: &[u8]) -> Result<Vec<u8>, PatchError> {
        (**self).decode(base, delta)
    }
}

/// A patch service with no backend
///
/// Commits made through it always fall back to snapshots, and any delta in
/// the history becomes unreadable.
#[derive(Debug, Clone, Default)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl PatchService for Unavailable {
    fn name(&self) -> &str {
        "none"
    }

    fn encode(&self, _base: &[u8], _target: &[u8]) -> Result<Vec<u8>, PatchError> {
        Err(PatchError::EncodeUnavailable(self.reason.clone()))
    }

    fn decode(&self, _base: &[u8], _delta: &[u8]) -> Result<Vec<u8>, PatchError> {
        Err(PatchError::DecodeUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_reports_both_directions() {
        let service = Unavailable::new("no backend configured");

        let encode = service.encode(b"a", b"b").unwrap_err();
        assert_eq!(encode, PatchError::EncodeUnavailable("no backend configured".into()));

        let decode = service.decode(b"a", b"delta").unwrap_err();
        assert_eq!(decode, PatchError::DecodeUnavailable("no backend configured".into()));
    }

    #[test]
    fn test_boxed_service_delegates() {
        let boxed: Box<dyn PatchService> = Box::new(Splice);
        assert_eq!(boxed.name(), "builtin");

        let delta = boxed.encode(b"AAA", b"AAB").unwrap();
        assert_eq!(boxed.decode(b"AAA", &delta).unwrap(), b"AAB");
    }
}
