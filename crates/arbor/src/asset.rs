//! # Assets
//!
//! The runtime does not load anything from disk. A platform layer or a game
//! configuration fills an [`AssetManager`] and publishes it through an
//! [`AssetManagerProvider`] bound in the kernel. Components then look assets
//! up by name while they are being constructed:
//!
//! ```text
//! GameConfiguration::initialize_asset_manager_provider(initializer)
//!     └─► initializer.use_provider(PreloadedAssetProvider::new(assets))
//!              └─► kernel: Rc<dyn AssetManagerProvider>
//!
//! PlaneComponent::inject(ctx)
//!     └─► ctx.asset::<EffectAsset>("effect.Color")
//!              └─► provider.asset_manager().get::<EffectAsset>(..)
//! ```
//!
//! ## Handles
//!
//! Assets are shared as `Rc<A>`. Lookups are synchronous and fail right away
//! when the name is unknown or the stored asset has another type; there is
//! no placeholder or deferred load.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::rc::Rc;

use crate::component::short_type_name;
use crate::config::LaunchArguments;
use crate::error::AssetError;
use crate::kernel::Kernel;
use crate::render::TextureHandle;

/// Named store of loaded assets.
#[derive(Default)]
pub struct AssetManager {
    assets: HashMap<String, Rc<dyn Any>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `asset` under `name`, replacing whatever was there.
    pub fn insert<A: 'static>(&mut self, name: impl Into<String>, asset: A) -> Rc<A> {
        let asset = Rc::new(asset);
        let name = name.into();
        if self.assets.insert(name.clone(), asset.clone()).is_some() {
            log::debug!("replaced asset `{name}`");
        }
        asset
    }

    /// Look up `name` as an `A`.
    pub fn get<A: 'static>(&self, name: &str) -> Result<Rc<A>, AssetError> {
        let asset = self.assets.get(name).ok_or_else(|| AssetError::NotFound {
            name: name.to_string(),
        })?;
        Rc::clone(asset)
            .downcast::<A>()
            .map_err(|_| AssetError::WrongType {
                name: name.to_string(),
                expected: short_type_name(type_name::<A>()),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Asset names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}

/// Hands out the asset manager components read from.
pub trait AssetManagerProvider {
    fn asset_manager(&self) -> &AssetManager;

    /// `false` while the provider is still getting ready.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Provider over an asset manager that was filled up front.
#[derive(Default)]
pub struct PreloadedAssetProvider {
    manager: AssetManager,
}

impl PreloadedAssetProvider {
    pub fn new(manager: AssetManager) -> Self {
        Self { manager }
    }
}

impl AssetManagerProvider for PreloadedAssetProvider {
    fn asset_manager(&self) -> &AssetManager {
        &self.manager
    }
}

/// Passed to each configuration so it can install an asset provider.
pub struct AssetManagerProviderInitializer<'k> {
    kernel: &'k mut Kernel,
    args: &'k LaunchArguments,
}

impl<'k> AssetManagerProviderInitializer<'k> {
    pub(crate) fn new(kernel: &'k mut Kernel, args: &'k LaunchArguments) -> Self {
        Self { kernel, args }
    }

    pub fn args(&self) -> &LaunchArguments {
        self.args
    }

    pub fn kernel(&mut self) -> &mut Kernel {
        self.kernel
    }

    /// Bind `provider` as the kernel's `Rc<dyn AssetManagerProvider>`,
    /// replacing an earlier one.
    pub fn use_provider<P: AssetManagerProvider + 'static>(&mut self, provider: P) {
        let provider: Rc<dyn AssetManagerProvider> = Rc::new(provider);
        self.kernel
            .bind::<Rc<dyn AssetManagerProvider>>()
            .to_constant(provider);
    }

    /// Bind an empty provider unless one is already bound.
    pub fn use_empty_if_unbound(&mut self) {
        if !self.kernel.is_bound::<Rc<dyn AssetManagerProvider>>() {
            self.use_provider(PreloadedAssetProvider::default());
        }
    }
}

// ── Asset types ──────────────────────────────────────────────────────────

/// A texture already uploaded to the graphics backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureAsset {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub handle: TextureHandle,
}

/// A shading effect known to the backend by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectAsset {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AssetManager {
        let mut assets = AssetManager::new();
        assets.insert(
            "texture.Ship",
            TextureAsset {
                name: "texture.Ship".into(),
                width: 32,
                height: 32,
                handle: TextureHandle(3),
            },
        );
        assets.insert(
            "effect.Color",
            EffectAsset {
                name: "effect.Color".into(),
            },
        );
        assets
    }

    #[test]
    fn get_returns_shared_asset() {
        let assets = manager();
        let first = assets.get::<TextureAsset>("texture.Ship").unwrap();
        let second = assets.get::<TextureAsset>("texture.Ship").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.handle, TextureHandle(3));
    }

    #[test]
    fn missing_asset_is_not_found() {
        assert_eq!(
            manager().get::<EffectAsset>("effect.Missing").unwrap_err(),
            AssetError::NotFound {
                name: "effect.Missing".into(),
            }
        );
    }

    #[test]
    fn asset_of_another_type_is_rejected() {
        assert_eq!(
            manager().get::<EffectAsset>("texture.Ship").unwrap_err(),
            AssetError::WrongType {
                name: "texture.Ship".into(),
                expected: "EffectAsset",
            }
        );
    }

    #[test]
    fn initializer_binds_provider_into_kernel() {
        let mut kernel = Kernel::new();
        let args = LaunchArguments::default();
        AssetManagerProviderInitializer::new(&mut kernel, &args)
            .use_provider(PreloadedAssetProvider::new(manager()));

        let provider = kernel.get::<Rc<dyn AssetManagerProvider>>().unwrap();
        assert!(provider.is_ready());
        assert_eq!(provider.asset_manager().len(), 2);
    }

    #[test]
    fn empty_provider_does_not_replace_a_bound_one() {
        let mut kernel = Kernel::new();
        let args = LaunchArguments::default();
        let mut initializer = AssetManagerProviderInitializer::new(&mut kernel, &args);
        initializer.use_provider(PreloadedAssetProvider::new(manager()));
        initializer.use_empty_if_unbound();

        let provider = kernel.get::<Rc<dyn AssetManagerProvider>>().unwrap();
        assert!(provider.asset_manager().contains("effect.Color"));
    }
}
