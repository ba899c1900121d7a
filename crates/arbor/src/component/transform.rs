use crate::error::InjectionError;
use crate::kernel::{Injectable, InjectionContext};
use crate::math::Transform;

use super::{Component, Enabled, HasTransform};

/// A node whose local transform applies to everything below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    pub transform: Transform,
    pub enabled: bool,
}

impl TransformComponent {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            enabled: true,
        }
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

impl Enabled for TransformComponent {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl HasTransform for TransformComponent {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl Component for TransformComponent {
    fn as_enabled(&self) -> Option<&dyn Enabled> {
        Some(self)
    }

    fn as_enabled_mut(&mut self) -> Option<&mut dyn Enabled> {
        Some(self)
    }

    fn as_transform(&self) -> Option<&dyn HasTransform> {
        Some(self)
    }

    fn as_transform_mut(&mut self) -> Option<&mut dyn HasTransform> {
        Some(self)
    }
}

/// Instantiated components start at the identity transform; owners position
/// them afterwards through the returned handle.
impl Injectable for TransformComponent {
    fn inject(_ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
        Ok(Self::default())
    }
}
