use realm_common::TextureImage;
use realm_render::TextureSlot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::AssetError;

/// One file to decode into a material slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub slot: TextureSlot,
    pub path: PathBuf,
}

/// Outcome of one request, delivered by [`TextureLoader::poll`].
#[derive(Debug)]
pub struct LoadedTexture {
    pub slot: TextureSlot,
    pub path: PathBuf,
    pub result: Result<TextureImage, AssetError>,
}

/// Decode an image file into tightly packed RGBA8.
pub fn load_texture(path: &Path) -> Result<TextureImage, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let decoded = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    Ok(TextureImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// File locations of the ground material's three maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTextures {
    pub root: PathBuf,
    pub color: String,
    pub normal: String,
    pub roughness: String,
}

impl Default for GroundTextures {
    fn default() -> Self {
        Self {
            root: PathBuf::from("textures/ground"),
            color: "color.png".into(),
            normal: "normal.png".into(),
            roughness: "roughness.png".into(),
        }
    }
}

impl GroundTextures {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn path(&self, slot: TextureSlot) -> PathBuf {
        let file = match slot {
            TextureSlot::Color => &self.color,
            TextureSlot::Normal => &self.normal,
            TextureSlot::Roughness => &self.roughness,
        };
        self.root.join(file)
    }

    pub fn requests(&self) -> Vec<TextureRequest> {
        TextureSlot::ALL
            .iter()
            .map(|&slot| TextureRequest {
                slot,
                path: self.path(slot),
            })
            .collect()
    }
}

/// Background decoder for a fixed batch of texture requests.
pub struct TextureLoader {
    rx: Receiver<LoadedTexture>,
    thread: Option<JoinHandle<()>>,
    pending: usize,
}

impl TextureLoader {
    /// Start decoding `requests` in order on a worker thread.
    pub fn spawn(requests: Vec<TextureRequest>) -> Result<Self, AssetError> {
        let (tx, rx) = mpsc::channel();
        let pending = requests.len();
        let thread = thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || {
                for request in requests {
                    let result = load_texture(&request.path);
                    let loaded = LoadedTexture {
                        slot: request.slot,
                        path: request.path,
                        result,
                    };
                    if tx.send(loaded).is_err() {
                        // Receiver gone; nobody wants the rest.
                        break;
                    }
                }
            })?;
        tracing::debug!(pending, "texture loader started");
        Ok(Self {
            rx,
            thread: Some(thread),
            pending,
        })
    }

    /// Everything decoded since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<LoadedTexture> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(loaded) => out.push(loaded),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.pending = 0;
                    break;
                }
            }
        }
        self.pending = self.pending.saturating_sub(out.len());
        out
    }

    /// Requests not yet delivered by [`poll`](Self::poll).
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_finished(&self) -> bool {
        self.pending == 0
    }

    /// Block until every request is decoded. For headless callers only.
    pub fn wait_all(mut self) -> Vec<LoadedTexture> {
        let out: Vec<LoadedTexture> = self.rx.iter().collect();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([x as u8, y as u8, 7, 255]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn load_texture_decodes_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "color.png", 4, 3);
        let tex = load_texture(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 3));
        assert_eq!(tex.rgba.len(), 4 * 3 * 4);
        // row 1, column 2
        let i = (4 + 2) * 4;
        assert_eq!(&tex.rgba[i..i + 4], &[2, 1, 7, 255]);
    }

    #[test]
    fn missing_and_corrupt_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        assert!(matches!(load_texture(&missing), Err(AssetError::NotFound(_))));

        let corrupt = dir.path().join("bad.png");
        std::fs::write(&corrupt, b"definitely not a png").unwrap();
        assert!(matches!(load_texture(&corrupt), Err(AssetError::Decode { .. })));
    }

    #[test]
    fn ground_requests_cover_every_slot() {
        let textures = GroundTextures::with_root("assets/ground");
        let requests = textures.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].slot, TextureSlot::Color);
        assert_eq!(requests[0].path, PathBuf::from("assets/ground/color.png"));
        assert_eq!(requests[2].path, PathBuf::from("assets/ground/roughness.png"));
    }

    #[test]
    fn wait_all_delivers_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "color.png", 2, 2);
        write_png(dir.path(), "roughness.png", 8, 8);
        let loader = TextureLoader::spawn(GroundTextures::with_root(dir.path()).requests()).unwrap();
        let loaded = loader.wait_all();
        let slots: Vec<_> = loaded.iter().map(|l| l.slot).collect();
        assert_eq!(slots, TextureSlot::ALL.to_vec());
        assert!(loaded[0].result.is_ok());
        assert!(matches!(loaded[1].result, Err(AssetError::NotFound(_))));
        assert_eq!(loaded[2].result.as_ref().unwrap().width, 8);
    }

    #[test]
    fn poll_drains_without_blocking() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "color.png", 16, 16);
        let mut loader = TextureLoader::spawn(vec![TextureRequest {
            slot: TextureSlot::Color,
            path: dir.path().join("color.png"),
        }])
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = 0;
        while !loader.is_finished() && Instant::now() < deadline {
            seen += loader.poll().len();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(loader.is_finished());
        assert_eq!(seen, 1);
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn empty_batch_finishes_immediately() {
        let loader = TextureLoader::spawn(Vec::new()).unwrap();
        assert!(loader.is_finished());
        assert!(loader.wait_all().is_empty());
    }
}
