use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program};
use iced::{Color, Pixels, Point, Rectangle, Renderer, Size, Theme};

use super::viewer::{Message, Sprite};
use crate::scene::CameraSpec;

/// Sprites drawn at their projected positions
pub struct SkyCanvas<'a> {
    pub sprites: &'a [Sprite],
    pub camera: CameraSpec,
    /// Sprite edge length in scene units
    pub sprite_size: f64,
}

impl Program<Message> for SkyCanvas<'_> {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::BLACK);

        // Painter's algorithm: far sprites first
        let mut visible: Vec<_> = self
            .sprites
            .iter()
            .filter_map(|sprite| {
                self.camera
                    .project(sprite.position, bounds.width, bounds.height)
                    .map(|p| (p, sprite))
            })
            .collect();
        visible.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

        for (point, sprite) in visible {
            let edge = (self.sprite_size as f32 * point.scale).max(2.0);
            let (rows, cols) = sprite.texture.dim();
            let cell = Size::new(edge / cols as f32, edge / rows as f32);
            let left = point.x - edge / 2.0;
            let top = point.y - edge / 2.0;

            for ((r, c), &v) in sprite.texture.indexed_iter() {
                frame.fill_rectangle(
                    Point::new(left + c as f32 * cell.width, top + r as f32 * cell.height),
                    cell,
                    Color::from_rgb(v, v, v),
                );
            }

            frame.fill_text(canvas::Text {
                content: sprite.label.clone(),
                position: Point::new(left, top + edge + 2.0),
                color: Color::from_rgb(0.6, 0.8, 1.0),
                size: Pixels(12.0),
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Mouse wheel for zooming
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let zoom_delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y * 0.1,
                    mouse::ScrollDelta::Pixels { y, .. } => y * 0.01,
                };
                return (canvas::event::Status::Captured, Some(Message::Zoom(zoom_delta)));
            }

            // Mouse button press - start orbiting
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_over(bounds) {
                    state.is_dragging = true;
                    state.last_position = Some(pos);
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.is_dragging = false;
                state.last_position = None;
                return (canvas::event::Status::Captured, None);
            }

            // Mouse move - orbit if dragging
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    if let (Some(current), Some(last)) = (cursor.position(), state.last_position) {
                        let delta = cgmath::Vector2::new(current.x - last.x, current.y - last.y);
                        state.last_position = Some(current);
                        return (canvas::event::Status::Captured, Some(Message::Orbit(delta)));
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub last_position: Option<Point>,
}
