use cgmath::Vector3;
use std::path::PathBuf;
use tracing::{info, warn};

use super::camera::CameraSpec;
use super::projector::project;
use crate::artifact::{decode_artifact, ArtifactError, PixelArray};
use crate::state::config::SceneOptions;
use crate::state::data::ImageRecord;
use crate::state::store::{MetadataStore, StoreError};

/// One resolved record: where it sits on the sphere and what it shows
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub record: ImageRecord,
    pub position: Vector3<f64>,
    pub pixels: PixelArray,
}

/// A record left out of the scene
#[derive(Debug)]
pub struct SkippedRecord {
    /// Position of the record in the store
    pub index: usize,
    pub record: ImageRecord,
    pub path: PathBuf,
    pub error: ArtifactError,
}

/// Everything a viewer needs to draw
#[derive(Debug)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub camera: CameraSpec,
    pub skipped: Vec<SkippedRecord>,
}

/// Build a scene from every record in `store`
///
/// Records whose artifact is missing or unreadable are skipped and reported in
/// `Scene::skipped`; only store errors abort the pass.
pub fn assemble(
    store: &MetadataStore,
    options: &SceneOptions,
    camera: CameraSpec,
) -> Result<Scene, StoreError> {
    let records = store.load()?;
    let total = records.len();

    let mut objects = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let position = project(record.ra(), record.dec());
        let path = options.resolve(record.file_path());

        match decode_artifact(&path) {
            Ok(pixels) => objects.push(SceneObject {
                record,
                position,
                pixels,
            }),
            Err(error) => {
                warn!(
                    "⚠️  Skipping record {} (ra={}, dec={}) from {}: {}",
                    index,
                    record.ra(),
                    record.dec(),
                    store.path().display(),
                    error
                );
                skipped.push(SkippedRecord {
                    index,
                    record,
                    path,
                    error,
                });
            }
        }
    }

    info!(
        "🌌 Assembled {} of {} records from {}",
        objects.len(),
        total,
        store.path().display()
    );

    Ok(Scene {
        objects,
        camera,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::fits::test_utils::{fits_f32, oversized_fits};
    use crate::artifact::test_utils::write_png;
    use std::fs;

    fn assert_position(v: Vector3<f64>, expected: [f64; 3]) {
        assert!((v.x - expected[0]).abs() < 1e-9);
        assert!((v.y - expected[1]).abs() < 1e-9);
        assert!((v.z - expected[2]).abs() < 1e-9);
    }

    #[test]
    fn test_missing_artifact_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.img"), 4, 4);
        fs::write(dir.path().join("c.img"), fits_f32(2, 2, &[0.0, 1.0, 2.0, 3.0])).unwrap();

        let store_path = dir.path().join("meta.json");
        fs::write(
            &store_path,
            r#"[{"ra": 0, "dec": 0, "file": "a.img"},
                {"ra": 90, "dec": 0, "file": "missing.img"},
                {"ra": 0, "dec": 90, "file": "c.img"}]"#,
        )
        .unwrap();

        let options = SceneOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let scene = assemble(
            &MetadataStore::new(&store_path),
            &options,
            CameraSpec::default(),
        )
        .unwrap();

        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.objects[0].record.file(), "a.img");
        assert_position(scene.objects[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(scene.objects[1].record.file(), "c.img");
        assert_position(scene.objects[1].position, [0.0, 0.0, 1.0]);
        assert_eq!(scene.objects[1].pixels.dim(), (2, 2));

        assert_eq!(scene.skipped.len(), 1);
        assert_eq!(scene.skipped[0].index, 1);
        assert!(matches!(
            scene.skipped[0].error,
            ArtifactError::Missing { .. }
        ));
    }

    #[test]
    fn test_corrupt_artifact_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("ok.png"), 2, 2);
        fs::write(dir.path().join("bad.fits"), b"SIMPLE  =                    T").unwrap();

        let store = MetadataStore::new(dir.path().join("meta.json"));
        for (ra, file) in [(10.0, "bad.fits"), (20.0, "ok.png")] {
            let path = dir.path().join(file);
            store
                .append(ImageRecord::new(ra, 5.0, path.to_string_lossy()).unwrap())
                .unwrap();
        }

        let scene = assemble(&store, &SceneOptions::default(), CameraSpec::default()).unwrap();
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].record.ra(), 20.0);
        assert!(matches!(
            scene.skipped[0].error,
            ArtifactError::Decode { .. }
        ));
    }

    #[test]
    fn test_oversized_fits_header_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.fits"), oversized_fits()).unwrap();
        write_png(&dir.path().join("a.png"), 3, 3);

        let store_path = dir.path().join("meta.json");
        fs::write(
            &store_path,
            r#"[{"ra": 1, "dec": 1, "file": "bad.fits"},
                {"ra": 2, "dec": 2, "file": "a.png"}]"#,
        )
        .unwrap();

        let options = SceneOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let scene = assemble(
            &MetadataStore::new(&store_path),
            &options,
            CameraSpec::default(),
        )
        .unwrap();

        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].record.file(), "a.png");
        assert_eq!(scene.skipped.len(), 1);
        assert_eq!(scene.skipped[0].index, 0);
        assert!(matches!(
            scene.skipped[0].error,
            ArtifactError::Decode { .. }
        ));
    }

    #[test]
    fn test_camera_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("meta.json"));
        fs::write(store.path(), "[]").unwrap();

        let camera = CameraSpec {
            position: [0.0, 3.0, 0.0],
            up: [0.0, 0.0, 1.0],
            ..Default::default()
        };
        let scene = assemble(&store, &SceneOptions::default(), camera).unwrap();

        assert!(scene.objects.is_empty());
        assert_eq!(scene.camera, camera);
        assert_eq!(CameraSpec::default().position, [0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_store_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("missing.json"));
        let result = assemble(&store, &SceneOptions::default(), CameraSpec::default());
        assert!(matches!(result, Err(StoreError::NotFound { .. })));

        fs::write(store.path(), r#"{"ra": 0}"#).unwrap();
        let result = assemble(&store, &SceneOptions::default(), CameraSpec::default());
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 3, 3);
        let store = MetadataStore::new(dir.path().join("meta.json"));
        let file = dir.path().join("a.png");
        store
            .append(ImageRecord::new(45.0, 45.0, file.to_string_lossy()).unwrap())
            .unwrap();
        store
            .append(ImageRecord::new(45.0, 45.0, file.to_string_lossy()).unwrap())
            .unwrap();

        let first = assemble(&store, &SceneOptions::default(), CameraSpec::default()).unwrap();
        let second = assemble(&store, &SceneOptions::default(), CameraSpec::default()).unwrap();

        assert_eq!(first.objects.len(), 2);
        for (a, b) in first.objects.iter().zip(&second.objects) {
            assert_eq!(a.record, b.record);
            assert_eq!(a.position, b.position);
            assert_eq!(a.pixels, b.pixels);
        }
    }
}
