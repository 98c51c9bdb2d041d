/// Windows for looking at fetched images
///
/// - `plot.rs` + `colorbar.rs`: one artifact as a grayscale plot with a colour bar
/// - `viewer.rs` + `canvas.rs`: every record of a store as sprites on the sky sphere

pub mod canvas;
pub mod colorbar;
pub mod plot;
pub mod viewer;

use std::path::{Path, PathBuf};

use crate::artifact::PixelArray;
use crate::state::config::AppConfig;

/// Open the 3D space viewer, optionally loading `store` right away
pub fn run_viewer(store: Option<PathBuf>, config: AppConfig) -> iced::Result {
    iced::application(
        "3D Space Viewer",
        viewer::SpaceViewer::update,
        viewer::SpaceViewer::view,
    )
    .theme(viewer::SpaceViewer::theme)
    .window_size((800.0, 600.0))
    .centered()
    .run_with(move || viewer::SpaceViewer::new(store, config))
}

/// Show a single decoded artifact
pub fn run_plot(path: &Path, pixels: &PixelArray, sigma: f32) -> iced::Result {
    let view = plot::PlotView::new(path, pixels, sigma);
    iced::application("Sky Atlas Plot", plot::PlotView::update, plot::PlotView::view)
        .theme(plot::PlotView::theme)
        .window_size((800.0, 800.0))
        .centered()
        .run_with(move || (view, iced::Task::none()))
}
