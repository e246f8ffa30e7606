//! Styles for the dialog backdrop and the icon buttons

use iced::{Border, Color, Theme};
use iced::widget::container;

pub mod colors {
    use iced::Color;

    /// Backdrop behind the buttons when a compositor blends it
    pub const BACKDROP_TRANSLUCENT: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.35);
    /// Backdrop without a compositor
    pub const BACKDROP_OPAQUE: Color = Color::from_rgb(0.08, 0.08, 0.08);
    pub const BUTTON_HOVER: Color = Color::from_rgba(1.0, 1.0, 1.0, 0.08);
}

pub fn backdrop(composited: bool) -> Color {
    if composited {
        colors::BACKDROP_TRANSLUCENT
    } else {
        colors::BACKDROP_OPAQUE
    }
}

pub fn dialog(composited: bool) -> impl Fn(&Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(backdrop(composited).into()),
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    }
}

pub fn power_button(hovered: bool) -> impl Fn(&Theme) -> container::Style {
    move |_theme| {
        let base = container::Style {
            border: Border {
                radius: 12.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        };

        if hovered {
            container::Style {
                background: Some(colors::BUTTON_HOVER.into()),
                ..base
            }
        } else {
            base
        }
    }
}
