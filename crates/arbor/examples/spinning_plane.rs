//! Spinning Plane — a full startup in one file.
//!
//! A game configuration binds its settings, preloads the colour effect and
//! a texture, then builds a game with the default passes and two entities:
//!
//! ```text
//!   SpinningPlane (transform) ─┬─ PlaneComponent     3D pass
//!                              └─ SpinComponent      turns the entity
//!   Badge ── SpriteComponent                         2D pass
//! ```
//!
//! Nothing is drawn on screen; the game runs headless on the null backend
//! for a fixed number of frames and logs what it rendered.
//!
//! Run with: `cargo run -p arbor --example spinning_plane -- --debug-startup`

use std::time::Duration;

use arbor::prelude::*;

// ── Settings ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct SpinSpeed(f32);

const FRAMES: u64 = 120;

// ── Entities ─────────────────────────────────────────────────────────────

/// A plane that turns around its own up axis.
struct SpinningPlane {
    transform: Transform,
}

impl HasTransform for SpinningPlane {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl Component for SpinningPlane {
    fn as_transform(&self) -> Option<&dyn HasTransform> {
        Some(self)
    }

    fn as_transform_mut(&mut self) -> Option<&mut dyn HasTransform> {
        Some(self)
    }
}

impl Injectable for SpinningPlane {
    fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
        let SpinSpeed(speed) = ctx.get::<SpinSpeed>()?;
        let plane = ctx.instantiate_component::<PlaneComponent>()?;
        let spin = ctx.instantiate_component::<SpinComponent>()?;
        if let Some(scene) = ctx.scene_mut() {
            if let Some(plane) = scene.get_mut(plane) {
                plane.color = Color::rgb(0.9, 0.5, 0.2);
                plane.size = Vec2::new(2.0, 2.0);
            }
            if let Some(spin) = scene.get_mut(spin) {
                spin.speed = speed;
            }
        }
        Ok(SpinningPlane {
            transform: Transform::from_xyz(0.0, 0.0, -1.0),
        })
    }
}

/// A logo sprite in the 2D overlay.
struct Badge;

impl Component for Badge {}

impl Injectable for Badge {
    fn inject(ctx: &mut InjectionContext<'_>) -> Result<Self, InjectionError> {
        let logo = ctx.asset::<TextureAsset>("texture.Logo")?;
        let sprite = ctx.instantiate_component::<SpriteComponent>()?;
        if let Some(sprite) = ctx.scene_mut().and_then(|scene| scene.get_mut(sprite)) {
            *sprite = SpriteComponent::from_texture(&logo);
        }
        Ok(Badge)
    }
}

// ── Configuration ────────────────────────────────────────────────────────

struct SpinningPlaneGame;

impl GameConfiguration for SpinningPlaneGame {
    fn configure_kernel(&mut self, kernel: &mut Kernel) {
        kernel.bind::<SpinSpeed>().to_constant(SpinSpeed(std::f32::consts::FRAC_PI_2));
    }

    fn initialize_asset_manager_provider(
        &mut self,
        initializer: &mut AssetManagerProviderInitializer<'_>,
    ) {
        let mut assets = AssetManager::new();
        assets.insert(
            COLOR_EFFECT,
            EffectAsset {
                name: COLOR_EFFECT.to_string(),
            },
        );
        assets.insert(
            "texture.Logo",
            TextureAsset {
                name: "texture.Logo".to_string(),
                width: 128,
                height: 32,
                handle: TextureHandle(1),
            },
        );
        initializer.use_provider(PreloadedAssetProvider::new(assets));
    }

    fn construct_game(&mut self, kernel: &Kernel) -> Result<Option<Game>, EngineError> {
        let config = kernel.get::<EngineConfig>()?;
        let mut builder = Game::builder(&config)
            .title("spinning plane")
            .with_default_passes();
        if config.frame_limit.is_none() {
            builder = builder.frame_limit(FRAMES);
        }
        if config.fixed_timestep.is_none() {
            builder = builder.fixed_timestep(Duration::from_secs(1) / 60);
        }

        let mut game = builder.build();
        let plane = game.spawn::<SpinningPlane>(kernel, None)?;
        game.spawn::<Badge>(kernel, None)?;
        log::info!(
            "spawned plane on {} ({} nodes in the scene)",
            plane.node(),
            game.scene().len()
        );
        Ok(Some(game))
    }
}

fn main() -> std::process::ExitCode {
    let startup = Startup::new(LaunchArguments::from_env()).game(SpinningPlaneGame);
    launch(startup)
}
