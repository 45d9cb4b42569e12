use realm_assets::{AssetError, TextureLoader};
use realm_config::GameConfig;
use realm_render::{RenderError, SceneBackend};
use realm_terrain::{Terrain, TerrainError};

use crate::driver::FrameDriver;
use crate::scene::{SceneHandles, apply_textures, build_scene};

/// Errors from starting the game. Nothing after startup can fail.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("terrain error: {0}")]
    Terrain(#[from] TerrainError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// A running session: the frame driver plus the scene it renders into and
/// any textures still loading.
pub struct Game {
    config: GameConfig,
    driver: FrameDriver,
    handles: SceneHandles,
    loader: Option<TextureLoader>,
}

impl Game {
    /// Generate the terrain, build the scene and start loading textures.
    pub fn start<B: SceneBackend + ?Sized>(
        backend: &mut B,
        config: GameConfig,
    ) -> Result<Self, RuntimeError> {
        let terrain = Terrain::generate(config.terrain)?;
        let handles = build_scene(backend, &terrain, &config)?;
        let loader = TextureLoader::spawn(config.textures.files.requests())?;
        let driver = FrameDriver::new(&config, terrain, handles.rig);
        tracing::info!(spawn = ?config.player.spawn, "game started");
        Ok(Self {
            config,
            driver,
            handles,
            loader: Some(loader),
        })
    }

    /// Bind textures that finished loading since the last call.
    pub fn poll_textures<B: SceneBackend + ?Sized>(&mut self, backend: &mut B) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let loaded = loader.poll();
        if !loaded.is_empty() {
            apply_textures(
                backend,
                self.handles.terrain_material,
                loaded,
                &self.config.textures,
            );
        }
        if loader.is_finished() {
            tracing::debug!("texture loading finished");
            self.loader = None;
        }
    }

    /// Block until every texture has loaded or failed. Headless use only.
    pub fn finish_textures<B: SceneBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(loader) = self.loader.take() {
            let loaded = loader.wait_all();
            apply_textures(
                backend,
                self.handles.terrain_material,
                loaded,
                &self.config.textures,
            );
        }
    }

    /// Everything except drawing: textures, input, simulation, rig.
    pub fn update<B: SceneBackend + ?Sized>(&mut self, backend: &mut B) {
        self.poll_textures(backend);
        self.driver.update(backend);
    }

    pub fn run_frame<B: SceneBackend + ?Sized>(&mut self, backend: &mut B) {
        self.update(backend);
        backend.draw_frame(self.handles.rig.camera);
    }

    pub fn textures_pending(&self) -> bool {
        self.loader.is_some()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut FrameDriver {
        &mut self.driver
    }

    pub fn handles(&self) -> &SceneHandles {
        &self.handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_assets::GroundTextures;
    use realm_render::{DebugTextRenderer, TextureSlot};
    use realm_terrain::TerrainConfig;

    fn config_with_textures(root: &std::path::Path) -> GameConfig {
        let mut config = GameConfig {
            terrain: TerrainConfig {
                size: 30.0,
                resolution: 15,
            },
            ..GameConfig::default()
        };
        config.textures.files = GroundTextures::with_root(root);
        config
    }

    #[test]
    fn frames_run_while_textures_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = DebugTextRenderer::new();
        let mut game = Game::start(&mut backend, config_with_textures(dir.path())).unwrap();
        for _ in 0..3 {
            game.run_frame(&mut backend);
        }
        game.finish_textures(&mut backend);
        assert!(!game.textures_pending());
        let material = backend.material(game.handles().terrain_material).unwrap();
        assert!(material.textures.is_empty());
        assert_eq!(backend.frames_drawn(), 3);
    }

    #[test]
    fn loaded_textures_reach_the_material() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["color.png", "normal.png", "roughness.png"] {
            image::RgbaImage::from_pixel(4, 4, image::Rgba([128, 128, 255, 255]))
                .save(dir.path().join(name))
                .unwrap();
        }
        let mut backend = DebugTextRenderer::new();
        let mut game = Game::start(&mut backend, config_with_textures(dir.path())).unwrap();
        game.finish_textures(&mut backend);
        let material = backend.material(game.handles().terrain_material).unwrap();
        for slot in TextureSlot::ALL {
            assert_eq!(material.textures[&slot].width, 4);
            assert_eq!(material.textures[&slot].settings.repeat, [10.0, 10.0]);
        }
        game.run_frame(&mut backend);
        assert!(
            backend
                .last_frame()
                .unwrap()
                .contains("textures [color, normal, roughness]")
        );
    }

    #[test]
    fn polling_eventually_binds() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]))
            .save(dir.path().join("color.png"))
            .unwrap();
        let mut backend = DebugTextRenderer::new();
        let mut game = Game::start(&mut backend, config_with_textures(dir.path())).unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while game.textures_pending() && std::time::Instant::now() < deadline {
            game.run_frame(&mut backend);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert!(!game.textures_pending());
        let material = backend.material(game.handles().terrain_material).unwrap();
        assert!(material.textures.contains_key(&TextureSlot::Color));
        assert!(!material.textures.contains_key(&TextureSlot::Normal));
    }

    #[test]
    fn invalid_terrain_fails_start() {
        let mut backend = DebugTextRenderer::new();
        let config = GameConfig {
            terrain: TerrainConfig {
                size: -1.0,
                resolution: 4,
            },
            ..GameConfig::default()
        };
        assert!(matches!(
            Game::start(&mut backend, config),
            Err(RuntimeError::Terrain(_))
        ));
    }
}
