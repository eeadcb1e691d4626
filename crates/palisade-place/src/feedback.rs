//! Allowed/blocked tint for the preview instance.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Appearance {
    Allowed,
    Blocked,
}

impl Appearance {
    #[inline]
    pub fn for_validity(valid: bool) -> Self {
        if valid {
            Appearance::Allowed
        } else {
            Appearance::Blocked
        }
    }
}

/// Opaque renderer handle exposed by an instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

pub trait FeedbackRenderer {
    /// Swap every material on `target` for the given appearance.
    /// Returns false when the target cannot be styled.
    fn set_appearance(&mut self, target: RenderHandle, appearance: Appearance) -> bool;
}

/// Push the appearance matching `valid` to all targets. Unstylable targets are skipped.
pub fn apply<R: FeedbackRenderer + ?Sized>(
    valid: bool,
    targets: &[RenderHandle],
    renderer: &mut R,
) {
    let appearance = Appearance::for_validity(valid);
    for &target in targets {
        if !renderer.set_appearance(target, appearance) {
            log::trace!(target: "placement", "skipped unstylable render target {:?}", target);
        }
    }
}
