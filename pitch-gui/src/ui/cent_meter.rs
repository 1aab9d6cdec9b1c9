//! # Cent Meter Widget
//!
//! Horizontal scale from -50 to +50 cents under the note readout. A shaded
//! band marks the in-tune zone and a pointer shows the current deviation,
//! colored by how close the voice is to the tempered note.

use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};

/// Half-width of the scale in cents; one side spans half a semitone.
const METER_RANGE: i32 = 50;

/// Deviations within this many cents count as in tune.
const IN_TUNE_CENTS: i32 = 5;

/// Deviations within this many cents are close but audibly off.
const CLOSE_CENTS: i32 = 20;

const LABEL_HEIGHT: f32 = 12.0;

/// How far a reading is from the tempered note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accuracy {
    InTune,
    Close,
    Off,
}

impl Accuracy {
    fn of(cents: i32) -> Self {
        match cents.abs() {
            c if c <= IN_TUNE_CENTS => Accuracy::InTune,
            c if c <= CLOSE_CENTS => Accuracy::Close,
            _ => Accuracy::Off,
        }
    }

    fn color(self) -> Color {
        match self {
            Accuracy::InTune => Color::from_rgb8(0x34, 0xDB, 0x98),
            Accuracy::Close => Color::from_rgb8(0xFF, 0xC3, 0x00),
            Accuracy::Off => Color::from_rgb8(0xFF, 0x33, 0x33),
        }
    }
}

/// Horizontal position of a deviation on a scale `width` pixels wide.
///
/// # Arguments
/// * `cents` - Deviation from the tempered note; clamped to the scale
/// * `width` - Width of the drawing area in pixels
fn cents_to_x(cents: i32, width: f32) -> f32 {
    let clamped = cents.clamp(-METER_RANGE, METER_RANGE);
    (clamped + METER_RANGE) as f32 / (2 * METER_RANGE) as f32 * width
}

pub struct CentMeter {
    /// `None` while nothing has been detected this session.
    cents: Option<i32>,
}

impl CentMeter {
    pub fn new(cents: Option<i32>) -> Self {
        Self { cents }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(48.0)),
        )
        .into()
    }

    fn draw_scale(&self, frame: &mut Frame, width: f32, height: f32, text_color: Color) {
        let zone_left = cents_to_x(-IN_TUNE_CENTS, width);
        let zone_right = cents_to_x(IN_TUNE_CENTS, width);
        frame.fill(
            &Path::rectangle(Point::new(zone_left, 0.0), Size::new(zone_right - zone_left, height)),
            Color::from_rgba8(0x34, 0xDB, 0x98, 0.2),
        );

        for mark in (-METER_RANGE..=METER_RANGE).step_by(10) {
            let x = cents_to_x(mark, width);
            let major = mark % 25 == 0;
            let top = if major { height * 0.45 } else { height * 0.7 };
            frame.stroke(
                &Path::line(Point::new(x, top), Point::new(x, height)),
                Stroke::default()
                    .with_width(if mark == 0 { 2.0 } else { 1.0 })
                    .with_color(Color::from_rgb8(0x90, 0x90, 0x90)),
            );
        }

        for mark in [-METER_RANGE, 0, METER_RANGE] {
            let align = match mark {
                m if m < 0 => Horizontal::Left,
                0 => Horizontal::Center,
                _ => Horizontal::Right,
            };
            frame.fill_text(Text {
                content: format!("{mark:+}"),
                position: Point::new(cents_to_x(mark, width), 0.0),
                color: text_color,
                size: 10.0.into(),
                horizontal_alignment: align,
                vertical_alignment: Vertical::Top,
                ..Text::default()
            });
        }
    }

    fn draw_pointer(&self, frame: &mut Frame, cents: i32, width: f32, height: f32) {
        let x = cents_to_x(cents, width);
        let color = Accuracy::of(cents).color();

        let pointer = Path::new(|p| {
            p.move_to(Point::new(x - 6.0, LABEL_HEIGHT));
            p.line_to(Point::new(x + 6.0, LABEL_HEIGHT));
            p.line_to(Point::new(x, LABEL_HEIGHT + 8.0));
            p.close();
        });
        frame.fill(&pointer, color);
        frame.stroke(
            &Path::line(Point::new(x, LABEL_HEIGHT + 8.0), Point::new(x, height)),
            Stroke::default().with_width(3.0).with_color(color),
        );
    }
}

impl<Message> canvas::Program<Message> for CentMeter {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill(
            &Path::rectangle(Point::ORIGIN, bounds.size()),
            Color::from_rgb8(0x2A, 0x2A, 0x2E),
        );

        self.draw_scale(&mut frame, bounds.width, bounds.height, theme.palette().text);
        if let Some(cents) = self.cents {
            self.draw_pointer(&mut frame, cents, bounds.width, bounds.height);
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_maps_range_onto_width() {
        assert_eq!(cents_to_x(-50, 200.0), 0.0);
        assert_eq!(cents_to_x(0, 200.0), 100.0);
        assert_eq!(cents_to_x(25, 200.0), 150.0);
        assert_eq!(cents_to_x(50, 200.0), 200.0);
    }

    #[test]
    fn pointer_is_pinned_at_the_ends() {
        assert_eq!(cents_to_x(-80, 200.0), 0.0);
        assert_eq!(cents_to_x(120, 200.0), 200.0);
    }

    #[test]
    fn accuracy_zones_are_symmetric() {
        assert_eq!(Accuracy::of(0), Accuracy::InTune);
        assert_eq!(Accuracy::of(-5), Accuracy::InTune);
        assert_eq!(Accuracy::of(6), Accuracy::Close);
        assert_eq!(Accuracy::of(-20), Accuracy::Close);
        assert_eq!(Accuracy::of(21), Accuracy::Off);
        assert_eq!(Accuracy::of(-49), Accuracy::Off);
    }
}
