use iced::keyboard;
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program};
use iced::{Point, Rectangle, Renderer, Size, Theme};

use crate::render::viewer::Interaction;
use crate::Message;

/// Transparent input layer stacked on top of the viewer frame.
///
/// Translates pointer input into trackball gestures:
/// - left drag rotates
/// - middle drag, or shift + left drag, pans
/// - right drag and the wheel dolly
pub struct ViewportInput;

/// What the held button is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
    Dolly,
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub mode: Option<DragMode>,
    pub last_position: Option<Point>,
    pub modifiers: keyboard::Modifiers,
    /// Canvas size last reported to the viewer
    pub size: Option<Size>,
}

impl Program<Message> for ViewportInput {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        _renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        // The rendered frame is an image underneath this layer
        vec![]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let (status, interaction) = gesture(state, event, bounds, cursor);
        if interaction.is_some() {
            return (status, interaction.map(Message::Viewer));
        }

        // Only one message per event: a pending resize waits for an event without a gesture
        if state.size != Some(bounds.size()) {
            state.size = Some(bounds.size());
            let resize = Interaction::Resize {
                width: bounds.width.round() as u32,
                height: bounds.height.round() as u32,
            };
            return (status, Some(Message::Viewer(resize)));
        }

        (status, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        match state.mode {
            Some(_) => mouse::Interaction::Grabbing,
            None if cursor.is_over(bounds) => mouse::Interaction::Grab,
            None => mouse::Interaction::default(),
        }
    }
}

/// Update the drag state for `event` and report the camera gesture it completes, if any
fn gesture(
    state: &mut DragState,
    event: canvas::Event,
    bounds: Rectangle,
    cursor: Cursor,
) -> (canvas::event::Status, Option<Interaction>) {
    match event {
        canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
            state.modifiers = modifiers;
        }

        canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
            if cursor.is_over(bounds) {
                let steps = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y,
                    mouse::ScrollDelta::Pixels { y, .. } => y / 40.0,
                };
                return (canvas::event::Status::Captured, Some(Interaction::Zoom { steps }));
            }
        }

        canvas::Event::Mouse(mouse::Event::ButtonPressed(button)) => {
            if let Some(pos) = cursor.position_in(bounds) {
                let mode = match button {
                    mouse::Button::Left if state.modifiers.shift() => DragMode::Pan,
                    mouse::Button::Left => DragMode::Rotate,
                    mouse::Button::Middle => DragMode::Pan,
                    mouse::Button::Right => DragMode::Dolly,
                    _ => return (canvas::event::Status::Ignored, None),
                };
                state.mode = Some(mode);
                state.last_position = Some(pos);
                return (canvas::event::Status::Captured, None);
            }
        }

        canvas::Event::Mouse(mouse::Event::ButtonReleased(_)) => {
            if state.mode.take().is_some() {
                state.last_position = None;
                return (canvas::event::Status::Captured, None);
            }
        }

        canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
            if let (Some(mode), Some(last)) = (state.mode, state.last_position) {
                let current = Point::new(position.x - bounds.x, position.y - bounds.y);
                let dx = current.x - last.x;
                let dy = current.y - last.y;
                state.last_position = Some(current);

                let interaction = match mode {
                    DragMode::Rotate => Interaction::Rotate { dx, dy },
                    DragMode::Pan => Interaction::Pan { dx, dy },
                    DragMode::Dolly => Interaction::Dolly { dy },
                };
                return (canvas::event::Status::Captured, Some(interaction));
            }
        }

        _ => {}
    }

    (canvas::event::Status::Ignored, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(width: f32, height: f32) -> Rectangle {
        Rectangle::new(Point::ORIGIN, Size::new(width, height))
    }

    fn wheel() -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::WheelScrolled {
            delta: mouse::ScrollDelta::Lines { x: 0.0, y: 1.0 },
        })
    }

    fn moved_to(x: f32, y: f32) -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(x, y),
        })
    }

    #[test]
    fn test_gesture_is_not_dropped_when_size_changes() {
        let mut state = DragState::default();
        let cursor = Cursor::Available(Point::new(50.0, 40.0));
        let area = bounds(100.0, 80.0);

        let (_, message) = ViewportInput.update(&mut state, wheel(), area, cursor);
        assert!(matches!(
            message,
            Some(Message::Viewer(Interaction::Zoom { steps })) if steps == 1.0
        ));

        // The resize goes out with the next event that carries no gesture
        let (_, message) = ViewportInput.update(&mut state, moved_to(60.0, 40.0), area, cursor);
        assert!(matches!(
            message,
            Some(Message::Viewer(Interaction::Resize { width: 100, height: 80 }))
        ));

        let (_, message) = ViewportInput.update(&mut state, moved_to(61.0, 40.0), area, cursor);
        assert!(message.is_none());
    }

    #[test]
    fn test_press_during_resize_still_starts_drag() {
        let mut state = DragState::default();
        let cursor = Cursor::Available(Point::new(10.0, 10.0));
        let press = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));
        let area = bounds(200.0, 100.0);

        let (status, message) = ViewportInput.update(&mut state, press, area, cursor);
        assert_eq!(status, canvas::event::Status::Captured);
        assert!(matches!(message, Some(Message::Viewer(Interaction::Resize { .. }))));
        assert_eq!(state.mode, Some(DragMode::Rotate));

        let (_, message) = ViewportInput.update(&mut state, moved_to(14.0, 7.0), area, cursor);
        assert!(matches!(
            message,
            Some(Message::Viewer(Interaction::Rotate { dx, dy })) if dx == 4.0 && dy == -3.0
        ));
    }
}
