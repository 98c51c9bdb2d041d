//! Survey cutouts on the celestial sphere.
//!
//! Fetches image cutouts for a list of sky positions, keeps an append-only
//! JSON catalog of what was fetched, and turns that catalog into a scene of
//! image sprites placed on the unit sphere.
//!
//! ```no_run
//! use sky_atlas::scene::{assemble, CameraSpec};
//! use sky_atlas::state::config::SceneOptions;
//! use sky_atlas::state::store::MetadataStore;
//!
//! let store = MetadataStore::new("metadatas/test_1_metadata.json");
//! let scene = assemble(&store, &SceneOptions::default(), CameraSpec::default()).unwrap();
//! for object in &scene.objects {
//!     println!("{} at {:?}", object.record.file(), object.position);
//! }
//! ```

pub mod artifact;
pub mod scene;
pub mod source;
pub mod state;
pub mod ui;
