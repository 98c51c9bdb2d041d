use cgmath::{Vector2, Vector3};
use iced::widget::{button, canvas, column, container, row, text};
use iced::{Alignment, Element, Length, Task, Theme};
use ndarray::Array2;
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::{info, warn};

use super::canvas::SkyCanvas;
use crate::artifact::enhance::{coarse_grid, enhance};
use crate::scene::{assemble, CameraSpec};
use crate::state::config::AppConfig;
use crate::state::store::MetadataStore;

/// Texture resolution used for sprites (cells per edge)
const SPRITE_CELLS: usize = 24;

/// Orbit speed in radians per dragged pixel
const ORBIT_SPEED: f64 = 0.01;

/// A scene object reduced to what the canvas draws
#[derive(Debug, Clone)]
pub struct Sprite {
    pub label: String,
    pub position: Vector3<f64>,
    /// Normalized brightness, row 0 at the top
    pub texture: Array2<f32>,
}

/// Result of a background scene load
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub store: PathBuf,
    pub sprites: Vec<Sprite>,
    pub camera: CameraSpec,
    pub total: usize,
    pub skipped: usize,
}

/// 3D viewer state
pub struct SpaceViewer {
    config: AppConfig,
    store: Option<PathBuf>,
    sprites: Vec<Sprite>,
    camera: CameraSpec,
    status: String,
}

/// Viewer messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Open Store"
    OpenStore,
    /// Background scene load finished
    SceneLoaded(Result<LoadedScene, String>),
    /// Drag delta in pixels
    Orbit(Vector2<f32>),
    /// Wheel delta, positive = closer
    Zoom(f32),
    /// Back to the configured camera
    ResetCamera,
}

impl SpaceViewer {
    pub fn new(store: Option<PathBuf>, config: AppConfig) -> (Self, Task<Message>) {
        let camera = config.camera;
        let mut viewer = SpaceViewer {
            config,
            store: None,
            sprites: Vec::new(),
            camera,
            status: "Open a metadata store to begin.".to_string(),
        };
        let task = match store {
            Some(path) => viewer.start_load(path),
            None => Task::none(),
        };
        (viewer, task)
    }

    fn start_load(&mut self, path: PathBuf) -> Task<Message> {
        self.status = format!("Loading {}...", path.display());
        Task::perform(
            load_scene(path, self.config.clone()),
            Message::SceneLoaded,
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenStore => {
                let file = FileDialog::new()
                    .set_title("Select Metadata Store")
                    .add_filter("JSON", &["json"])
                    .pick_file();

                if let Some(path) = file {
                    return self.start_load(path);
                }
                Task::none()
            }
            Message::SceneLoaded(Ok(scene)) => {
                self.status = if scene.skipped > 0 {
                    format!(
                        "{}: {} of {} images shown, {} skipped (see log).",
                        scene.store.display(),
                        scene.sprites.len(),
                        scene.total,
                        scene.skipped
                    )
                } else {
                    format!("{}: {} images.", scene.store.display(), scene.sprites.len())
                };
                self.store = Some(scene.store);
                self.sprites = scene.sprites;
                self.camera = scene.camera;
                Task::none()
            }
            Message::SceneLoaded(Err(e)) => {
                warn!("Scene load failed: {}", e);
                self.status = format!("Failed to load scene: {}", e);
                Task::none()
            }
            Message::Orbit(delta) => {
                self.camera.orbit(
                    -f64::from(delta.x) * ORBIT_SPEED,
                    f64::from(delta.y) * ORBIT_SPEED,
                );
                Task::none()
            }
            Message::Zoom(delta) => {
                let factor = (1.0 - f64::from(delta)).clamp(0.5, 1.5);
                self.camera.zoom(factor);
                Task::none()
            }
            Message::ResetCamera => {
                self.camera = self.config.camera;
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<Message> {
        let toolbar = row![
            button("Open Store").on_press(Message::OpenStore).padding(8),
            button("Reset View").on_press(Message::ResetCamera).padding(8),
            text(&self.status).size(14),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let sky = canvas(SkyCanvas {
            sprites: &self.sprites,
            camera: self.camera,
            sprite_size: self.config.scene.sprite_size,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        container(column![toolbar, sky].spacing(8).padding(8))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Assemble the scene and build sprite textures
/// Runs on a blocking thread so the UI stays responsive
async fn load_scene(path: PathBuf, config: AppConfig) -> Result<LoadedScene, String> {
    tokio::task::spawn_blocking(move || load_scene_blocking(path, &config))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn load_scene_blocking(path: PathBuf, config: &AppConfig) -> Result<LoadedScene, String> {
    let store = MetadataStore::new(&path);
    let scene = assemble(&store, &config.scene, config.camera).map_err(|e| e.to_string())?;

    let sigma = config.scene.enhance_sigma;
    let sprites: Vec<Sprite> = scene
        .objects
        .iter()
        .map(|object| Sprite {
            label: format!("{:.3}, {:.3}", object.record.ra(), object.record.dec()),
            position: object.position,
            texture: coarse_grid(&enhance(&object.pixels, sigma), SPRITE_CELLS),
        })
        .collect();

    info!("🖼️  Prepared {} sprites", sprites.len());
    Ok(LoadedScene {
        store: path,
        total: sprites.len() + scene.skipped.len(),
        skipped: scene.skipped.len(),
        sprites,
        camera: scene.camera,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::test_utils::write_png;
    use crate::state::data::ImageRecord;

    #[tokio::test]
    async fn test_load_scene_reports_skips() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        write_png(&good, 40, 30);

        let store_path = dir.path().join("meta.json");
        let store = MetadataStore::new(&store_path);
        store
            .append(ImageRecord::new(0.0, 0.0, good.to_string_lossy()).unwrap())
            .unwrap();
        store
            .append(ImageRecord::new(90.0, 0.0, "nowhere.png").unwrap())
            .unwrap();

        let scene = load_scene(store_path.clone(), AppConfig::default()).await.unwrap();

        assert_eq!(scene.store, store_path);
        assert_eq!(scene.total, 2);
        assert_eq!(scene.skipped, 1);
        assert_eq!(scene.sprites.len(), 1);
        assert_eq!(scene.sprites[0].texture.dim(), (SPRITE_CELLS, SPRITE_CELLS));
        assert_eq!(scene.sprites[0].label, "0.000, 0.000");
    }

    #[tokio::test]
    async fn test_load_scene_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_scene(dir.path().join("absent.json"), AppConfig::default()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_camera_messages() {
        let (mut viewer, _) = SpaceViewer::new(None, AppConfig::default());
        let start = viewer.camera;

        let _ = viewer.update(Message::Orbit(Vector2::new(30.0, 0.0)));
        assert_ne!(viewer.camera.position, start.position);
        assert!((viewer.camera.distance() - start.distance()).abs() < 1e-9);

        let _ = viewer.update(Message::Zoom(0.2));
        assert!(viewer.camera.distance() < start.distance());

        let _ = viewer.update(Message::ResetCamera);
        assert_eq!(viewer.camera, start);
    }
}
