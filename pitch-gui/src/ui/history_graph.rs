//! # Pitch History Graph
//!
//! Scrolling plot of recent pitches. Time runs left to right with "now" at
//! the right edge; the vertical axis is one octave, wrapped, with a grid line
//! and label for each pitch class.

use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Theme};

use pitch_core::graph::{self, AxisLabel, GRAPH_HEIGHT};
use pitch_core::PitchPoint;

/// Space reserved on the left for note labels.
const LABEL_GUTTER: f32 = 36.0;
const POINT_RADIUS: f32 = 3.0;

pub struct HistoryGraph {
    points: Vec<PitchPoint>,
    labels: Vec<AxisLabel>,
    session_time: f64,
    window_secs: f64,
}

impl HistoryGraph {
    pub fn new(
        points: Vec<PitchPoint>,
        labels: Vec<AxisLabel>,
        session_time: f64,
        window_secs: f64,
    ) -> Self {
        Self {
            points,
            labels,
            session_time,
            window_secs,
        }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }
}

/// Graph units (0 at the bottom) to canvas pixels (0 at the top).
fn to_pixel_y(y: f32, height: f32) -> f32 {
    height - y / GRAPH_HEIGHT * height
}

impl<Message> canvas::Program<Message> for HistoryGraph {
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
        let text_color = theme.palette().text;

        let background = Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, Color::from_rgb8(0x20, 0x20, 0x24));

        if !bounds.width.is_finite() || !bounds.height.is_finite() || bounds.width <= LABEL_GUTTER {
            return vec![frame.into_geometry()];
        }

        // --- Pitch-class grid ---
        for label in &self.labels {
            let y = to_pixel_y(label.y, bounds.height);
            let line = Path::line(Point::new(LABEL_GUTTER, y), Point::new(bounds.width, y));
            frame.stroke(
                &line,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgba8(0xFF, 0xFF, 0xFF, 0.12)),
            );
            frame.fill_text(Text {
                content: label.name.to_string(),
                position: Point::new(LABEL_GUTTER - 6.0, y),
                color: text_color,
                size: 12.0.into(),
                horizontal_alignment: Horizontal::Right,
                vertical_alignment: Vertical::Center,
                ..Text::default()
            });
        }

        // --- Points, newest at the right edge ---
        let plot_width = bounds.width - LABEL_GUTTER;
        for point in &self.points {
            let age = self.session_time - point.timestamp;
            if age < 0.0 || age >= self.window_secs {
                continue;
            }
            let x = LABEL_GUTTER + plot_width * (1.0 - (age / self.window_secs) as f32);
            let y = to_pixel_y(graph::graph_y(point.frequency), bounds.height);
            let [r, g, b] = graph::frequency_color(point.frequency).to_rgb();
            frame.fill(&Path::circle(Point::new(x, y), POINT_RADIUS), Color::from_rgb(r, g, b));
        }

        if self.points.is_empty() {
            frame.fill_text(Text {
                content: "Sing or play a note".to_string(),
                position: frame.center(),
                color: text_color,
                size: 14.0.into(),
                horizontal_alignment: Horizontal::Center,
                vertical_alignment: Vertical::Center,
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
