use rand::Rng;
use thiserror::Error;

use crate::compose::ComposerKind;

#[derive(Debug, Error)]
#[error("At least one reply composer must be enabled")]
pub struct NoComposersEnabled;

/// Uniform random choice over the enabled reply composers.
#[derive(Debug, Clone)]
pub struct ReplySelector {
    enabled: Vec<ComposerKind>,
}

impl ReplySelector {
    pub fn new(mut enabled: Vec<ComposerKind>) -> Result<Self, NoComposersEnabled> {
        // a kind listed twice would otherwise be picked twice as often
        let mut seen = Vec::with_capacity(enabled.len());
        enabled.retain(|kind| {
            let fresh = !seen.contains(kind);
            seen.push(*kind);
            fresh
        });
        if enabled.is_empty() {
            return Err(NoComposersEnabled);
        }
        Ok(Self { enabled })
    }

    pub fn enabled(&self) -> &[ComposerKind] {
        &self.enabled
    }

    /// `new` rejects an empty list, so there is always a kind to return.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> ComposerKind {
        self.enabled[rng.gen_range(0..self.enabled.len())]
    }
}
