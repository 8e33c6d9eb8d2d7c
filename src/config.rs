//! Engine configuration.
//!
//! A `Config` belongs to one [`LayoutTree`](crate::LayoutTree). Trees with
//! different configs coexist freely; there is no process-wide state.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::engine::NodeId;

bitflags! {
    /// Opt-in behaviours that are not yet the default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExperimentalFeatures: u8 {
        /// Recompute an explicit flex-basis once per layout generation
        /// instead of once per node lifetime.
        const WEB_FLEX_BASIS = 1 << 0;
    }
}

/// Called once per duplicated node: `(original, clone, new_parent, child_index)`.
pub type NodeClonedObserver = Arc<dyn Fn(NodeId, NodeId, Option<NodeId>, usize) + Send + Sync>;

#[derive(Clone)]
pub struct Config {
    /// Pixels per point for rounding; see [`Config::set_point_scale_factor`].
    pub(crate) point_scale_factor: f32,
    /// Keep the available main size of a non-exact container instead of
    /// shrinking it to its content.
    pub use_legacy_stretch_behaviour: bool,
    /// Give new nodes CSS initial values (row, stretched lines, shrink 1).
    pub use_web_defaults: bool,
    pub experimental_features: ExperimentalFeatures,
    pub(crate) cloned_observer: Option<NodeClonedObserver>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            use_legacy_stretch_behaviour: false,
            use_web_defaults: false,
            experimental_features: ExperimentalFeatures::empty(),
            cloned_observer: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("point_scale_factor", &self.point_scale_factor)
            .field("use_legacy_stretch_behaviour", &self.use_legacy_stretch_behaviour)
            .field("use_web_defaults", &self.use_web_defaults)
            .field("experimental_features", &self.experimental_features)
            .field("cloned_observer", &self.cloned_observer.is_some())
            .finish()
    }
}

impl Config {
    pub fn web() -> Self {
        Self { use_web_defaults: true, ..Self::default() }
    }

    /// Pixels per point for rounding. `0.0` means rounding is off.
    pub fn point_scale_factor(&self) -> f32 {
        self.point_scale_factor
    }

    /// Negative and non-finite factors are treated as zero.
    pub fn set_point_scale_factor(&mut self, factor: f32) {
        self.point_scale_factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeatures) -> bool {
        self.experimental_features.contains(feature)
    }

    pub fn set_experimental_feature_enabled(
        &mut self,
        feature: ExperimentalFeatures,
        enabled: bool,
    ) {
        self.experimental_features.set(feature, enabled);
    }

    pub fn set_node_cloned_observer<F>(&mut self, observer: F)
    where
        F: Fn(NodeId, NodeId, Option<NodeId>, usize) + Send + Sync + 'static,
    {
        self.cloned_observer = Some(Arc::new(observer));
    }

    pub fn clear_node_cloned_observer(&mut self) {
        self.cloned_observer = None;
    }

    pub(crate) fn notify_cloned(
        &self,
        original: NodeId,
        clone: NodeId,
        parent: Option<NodeId>,
        index: usize,
    ) {
        if let Some(observer) = &self.cloned_observer {
            observer(original, clone, parent, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.point_scale_factor(), 1.0);
        assert!(!config.use_web_defaults);
        assert!(!config.is_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS));
        assert!(Config::web().use_web_defaults);
    }

    #[test]
    fn test_experimental_toggle() {
        let mut config = Config::default();
        config.set_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS, true);
        assert!(config.is_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS));
        config.set_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS, false);
        assert!(!config.is_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS));
    }

    #[test]
    fn test_scale_factor_clamped() {
        let mut config = Config::default();
        config.set_point_scale_factor(-2.0);
        assert_eq!(config.point_scale_factor(), 0.0);
        config.set_point_scale_factor(f32::NAN);
        assert_eq!(config.point_scale_factor(), 0.0);
        config.set_point_scale_factor(2.0);
        assert_eq!(config.point_scale_factor(), 2.0);
    }
}
