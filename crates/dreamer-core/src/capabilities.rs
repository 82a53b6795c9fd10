//! Optional animation capabilities of the host.
//!
//! Hosts that can animate implement `MotionCapabilities` and hand it in;
//! hosts that can't pass `None`. `AnimationPlan::negotiate` turns that into
//! the settings the presentation layer should use.

/// What the host environment can do for scroll and entrance animations.
pub trait MotionCapabilities: Send + Sync {
    /// A scroll-reveal engine is present.
    fn has_scroll_reveal(&self) -> bool;

    /// A timeline animation engine is present.
    fn has_timeline_engine(&self) -> bool;

    /// The user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

/// Scroll-reveal tuning used when the engine is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRevealSettings {
    pub duration_ms: u32,
    pub offset_px: u32,
    pub mirror_offset_px: u32,
    pub debounce_ms: u32,
    pub throttle_ms: u32,
    pub once: bool,
}

impl Default for ScrollRevealSettings {
    fn default() -> Self {
        Self {
            duration_ms: 600,
            offset_px: 80,
            mirror_offset_px: 260,
            debounce_ms: 50,
            throttle_ms: 99,
            once: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationPlan {
    pub scroll_reveal: Option<ScrollRevealSettings>,
    pub timeline: bool,
}

impl AnimationPlan {
    pub fn negotiate(caps: Option<&dyn MotionCapabilities>) -> Self {
        let Some(caps) = caps else {
            return Self::default();
        };
        if caps.prefers_reduced_motion() {
            return Self::default();
        }
        Self {
            scroll_reveal: caps
                .has_scroll_reveal()
                .then(ScrollRevealSettings::default),
            timeline: caps.has_timeline_engine(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.scroll_reveal.is_none() && !self.timeline
    }
}
