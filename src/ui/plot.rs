use iced::widget::{canvas, column, container, image, row, text};
use iced::{Element, Length, Task, Theme};
use std::path::Path;

use super::colorbar::ColorBar;
use crate::artifact::enhance::{enhance_with_scale, to_luma8};
use crate::artifact::PixelArray;

/// Single-image plot view state
pub struct PlotView {
    caption: String,
    handle: image::Handle,
    colorbar: ColorBar,
}

/// The plot view is static; it has no events of its own
#[derive(Debug, Clone)]
pub enum Message {}

impl PlotView {
    pub fn new(path: &Path, pixels: &PixelArray, sigma: f32) -> Self {
        let (normalized, scale) = enhance_with_scale(pixels, sigma);
        let gray = to_luma8(&normalized);
        let (width, height) = gray.dimensions();

        let rgba: Vec<u8> = gray.into_raw().into_iter().flat_map(|v| [v, v, v, 255]).collect();

        PlotView {
            caption: format!("{} ({}x{})", path.display(), width, height),
            handle: image::Handle::from_rgba(width, height, rgba),
            colorbar: ColorBar { scale },
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {}
    }

    pub fn view(&self) -> Element<Message> {
        let plot = row![
            image(self.handle.clone())
                .width(Length::Fill)
                .height(Length::Fill),
            canvas(self.colorbar)
                .width(Length::Fixed(90.0))
                .height(Length::Fill),
        ]
        .spacing(8);

        container(column![plot, text(&self.caption).size(14)].spacing(8).padding(16))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_plot_view_range() {
        let pixels = Array2::from_shape_fn((3, 5), |(r, c)| (r * 5 + c) as f32 - 2.0);
        let view = PlotView::new(Path::new("outputs/x.fits"), &pixels, 0.0);

        let scale = view.colorbar.scale;
        assert!((scale.value_at(0.0) + 2.0).abs() < 1e-4);
        assert!((scale.value_at(1.0) - 12.0).abs() < 1e-3);
        // Ticks follow the log stretch, not a linear ramp
        assert!(scale.value_at(0.5) < 5.0);
        assert_eq!(view.caption, "outputs/x.fits (5x3)");
    }
}
