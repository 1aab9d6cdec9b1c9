//! # Main Display Module
//!
//! Layout of the pitch tracker window: the live note readout, the history
//! graph, the optional transpose panel, and the control sidebar.

use iced::widget::{button, column, container, horizontal_space, row, slider, text, Space};
use iced::{Alignment, Color, Element, Length};

use pitch_core::graph;
use pitch_core::transpose::MAX_SEMITONES;

use super::{cent_meter, history_graph};
use crate::{AppDisplayData, Message};

/// A button in the control sidebar.
#[derive(Debug, Clone)]
struct ButtonConfig {
    label: &'static str,
    message: Message,
    button_type: ButtonType,
}

#[derive(Debug, Clone)]
enum ButtonType {
    Standard,
    /// Start/stop button; red and labelled with `active_label` while listening.
    Listening { active_label: &'static str },
}

const CONTROLS_CONFIG: &[(&str, &[ButtonConfig])] = &[
    ("Session", &[
        ButtonConfig { label: "Start", message: Message::ToggleListening, button_type: ButtonType::Listening { active_label: "Stop" } },
        ButtonConfig { label: "Clear history", message: Message::ClearHistory, button_type: ButtonType::Standard },
    ]),
    ("Tools", &[
        ButtonConfig { label: "Transpose", message: Message::ToggleTransposeControls, button_type: ButtonType::Standard },
    ]),
];

/// Creates the complete main application view.
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    if let Some(error) = &data.error {
        return create_error_notice(error);
    }

    let title = text("Pitch Tracker").size(28);

    let mut content = column![
        title,
        Space::with_height(20),
        create_reading_panel(data),
        Space::with_height(10),
        create_history_panel(data),
    ]
    .width(Length::Fill)
    .spacing(10);

    if data.transpose_controls_visible {
        content = content.push(create_transpose_panel(data));
    }

    let main_content = row![content, Space::with_width(10), create_sidebar(data.listening)]
        .align_y(Alignment::Start)
        .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Blocking notice shown when the microphone could not be opened.
fn create_error_notice(error: &str) -> Element<'static, Message> {
    let notice = column![
        text("Could not start listening").size(28),
        Space::with_height(10),
        text(error.to_string()).size(16),
        Space::with_height(20),
        button(text("OK").size(16)).padding([6, 20]).on_press(Message::DismissError),
    ]
    .align_x(Alignment::Center);

    container(notice)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Current note, frequency, cents and the cent meter.
fn create_reading_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let (note_text, freq_text, cents_text) = match &data.reading {
        Some(reading) => (
            format!("{}{}", reading.note.name, reading.note.octave),
            format!("{:.2} Hz", reading.frequency),
            format!("{:+} cents", reading.note.cents),
        ),
        None => ("--".to_string(), "-- Hz".to_string(), String::new()),
    };

    let status = if data.listening {
        "Listening"
    } else if data.starting {
        "Opening microphone"
    } else {
        "Stopped"
    };

    let content = column![
        row![text("Note").size(14), horizontal_space(), text(status).size(14)],
        Space::with_height(5),
        row![
            text(note_text).size(32),
            Space::with_width(16),
            text(freq_text).size(24),
            horizontal_space(),
            text(cents_text).size(18),
        ]
        .align_y(Alignment::Center),
        Space::with_height(10),
        cent_meter::CentMeter::new(data.reading.map(|r| r.note.cents)).view(),
    ]
    .spacing(5);

    container(content.padding(15))
        .width(Length::Fill)
        .height(Length::Fixed(150.0))
        .into()
}

/// The scrolling history graph.
fn create_history_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let history = history_graph::HistoryGraph::new(
        data.history.clone(),
        graph::axis_labels(data.transpose),
        data.session_time,
        data.window_secs,
    );

    let title = format!("Last {:.0} seconds", data.window_secs);
    container(
        column![text(title).size(18), Space::with_height(10), history.view()]
            .spacing(5)
            .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

/// Slider, step buttons and reset for the transposition.
fn create_transpose_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let semitones = data.transpose.semitones();

    let step = |label: &'static str, target: i32| {
        let b = button(text(label).size(16)).padding([4, 12]);
        if (-MAX_SEMITONES..=MAX_SEMITONES).contains(&target) {
            b.on_press(Message::TransposeChanged(target))
        } else {
            b
        }
    };

    let controls = row![
        step("-", semitones - 1),
        slider(-MAX_SEMITONES..=MAX_SEMITONES, semitones, Message::TransposeChanged).width(Length::Fill),
        step("+", semitones + 1),
        text(format!("{semitones:+} st")).size(16).width(Length::Fixed(60.0)),
        button(text("Reset").size(14))
            .padding([4, 12])
            .on_press_maybe((!data.transpose.is_zero()).then_some(Message::ResetTranspose)),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    container(
        column![text("Transpose").size(18), Space::with_height(10), controls]
            .spacing(5)
            .padding(15),
    )
    .width(Length::Fill)
    .into()
}

/// Creates the control sidebar.
fn create_sidebar(listening: bool) -> Element<'static, Message> {
    let sections = CONTROLS_CONFIG.iter().fold(column![].spacing(10), |col, &(title, buttons)| {
        col.push(make_controls_section(title, buttons, listening))
    });

    container(sections.padding(15))
        .width(Length::Fixed(200.0))
        .height(Length::Fill)
        .into()
}

fn button_label(config: &ButtonConfig, listening: bool) -> &'static str {
    match config.button_type {
        ButtonType::Listening { active_label } if listening => active_label,
        _ => config.label,
    }
}

fn make_button(config: &ButtonConfig, listening: bool) -> Element<'static, Message> {
    let label = button_label(config, listening);

    let mut button = button(text(label).size(14).width(Length::Fill)).padding([6, 10]);

    if let ButtonType::Listening { .. } = config.button_type {
        let background = if listening {
            Color::from_rgb(0.8, 0.2, 0.2) // Red
        } else {
            Color::from_rgb(0.2, 0.6, 0.3) // Green
        };
        button = button.style(move |_theme, _status| iced::widget::button::Style {
            background: Some(iced::Background::Color(background)),
            text_color: Color::WHITE,
            ..iced::widget::button::Style::default()
        });
    }

    button.on_press(config.message.clone()).into()
}

fn make_controls_section(
    title: &'static str,
    buttons: &[ButtonConfig],
    listening: bool,
) -> Element<'static, Message> {
    let items = buttons
        .iter()
        .fold(column![].spacing(8), |col, config| col.push(make_button(config, listening)));

    column![text(title).size(18), Space::with_height(10), items]
        .spacing(5)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(label: &str) -> &'static ButtonConfig {
        CONTROLS_CONFIG
            .iter()
            .flat_map(|(_, buttons)| buttons.iter())
            .find(|config| config.label == label)
            .unwrap()
    }

    #[test]
    fn listening_button_switches_label() {
        let config = find("Start");
        assert_eq!(button_label(config, false), "Start");
        assert_eq!(button_label(config, true), "Stop");
    }

    #[test]
    fn standard_buttons_keep_their_label() {
        let config = find("Clear history");
        assert_eq!(button_label(config, false), "Clear history");
        assert_eq!(button_label(config, true), "Clear history");
    }
}
