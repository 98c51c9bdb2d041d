/// Grayscale colour bar for the plot view
/// Ticks follow the same log stretch as the image next to it
use iced::widget::canvas::{self, Stroke};
use iced::{alignment, Color, Pixels, Point, Rectangle, Size};

use super::plot::Message;
use crate::artifact::enhance::DisplayScale;

/// Number of gray bands drawn
const BANDS: usize = 64;

/// Width reserved for the bar itself; the rest holds labels
const BAR_WIDTH: f32 = 18.0;

/// Gray levels that get a labelled tick
const TICKS: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

#[derive(Debug, Clone, Copy)]
pub struct ColorBar {
    pub scale: DisplayScale,
}

impl canvas::Program<Message> for ColorBar {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let margin = 10.0;
        let height = (bounds.height - 2.0 * margin).max(1.0);
        let band_height = height / BANDS as f32;

        // Black at the bottom, white at the top
        for i in 0..BANDS {
            let level = i as f32 / (BANDS - 1) as f32;
            let y = margin + height - (i + 1) as f32 * band_height;
            frame.fill_rectangle(
                Point::new(0.0, y),
                Size::new(BAR_WIDTH, band_height + 0.5),
                Color::from_rgb(level, level, level),
            );
        }

        let outline =
            canvas::Path::rectangle(Point::new(0.0, margin), Size::new(BAR_WIDTH, height));
        frame.stroke(
            &outline,
            Stroke::default()
                .with_color(Color::from_rgb(0.5, 0.5, 0.5))
                .with_width(1.0),
        );

        for level in TICKS {
            let y = margin + height * (1.0 - level);
            let tick =
                canvas::Path::line(Point::new(BAR_WIDTH, y), Point::new(BAR_WIDTH + 4.0, y));
            frame.stroke(
                &tick,
                Stroke::default().with_color(Color::WHITE).with_width(1.0),
            );

            let align = if level >= 1.0 {
                alignment::Vertical::Top
            } else if level <= 0.0 {
                alignment::Vertical::Bottom
            } else {
                alignment::Vertical::Center
            };
            frame.fill_text(canvas::Text {
                content: format_value(self.scale.value_at(level)),
                position: Point::new(BAR_WIDTH + 6.0, y),
                color: Color::WHITE,
                size: Pixels(12.0),
                vertical_alignment: align,
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}

/// Compact label text for a data value
pub fn format_value(value: f32) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e5).contains(&magnitude) {
        format!("{:.2e}", value)
    } else {
        format!("{:.2}", value)
    }
}
