//! Shell UI Module
//!
//! The exit dialog itself: one borderless window with a row of icon
//! buttons. Clicking a button (or pressing its shortcut) runs the
//! matching session command and closes the dialog.

pub mod icons;
pub mod scale;
pub mod signals;
pub mod theme;

use iced::alignment::{Horizontal, Vertical};
use iced::widget::{Row, Space, container, image, mouse_area, svg};
use iced::{
    Alignment, Color, Element, Length, Padding, Size, Subscription, Task, Theme, application,
    keyboard, mouse, window,
};
use tracing::{debug, info};

use crate::config::{Config, LayoutConfig};
use crate::display::DisplayInfo;
use crate::session::{self, SessionAction, SessionContext};
use icons::{Icon, IconSet};

/// Window title, also used for the duplicate-window check
pub const WINDOW_TITLE: &str = "Exit Options";

#[derive(Debug, Clone)]
pub enum Message {
    WindowOpened(window::Id),
    Resized(window::Id),
    /// Toolkit scale factor reported for the window
    ScaleFactor(f32),
    Hovered(SessionAction),
    Unhovered(SessionAction),
    Activated(SessionAction),
    /// The action's command returned
    Finished(SessionAction),
    Quit,
    Signal(&'static str),
}

/// Dialog state
pub struct ExitDialog {
    layout: LayoutConfig,
    display: DisplayInfo,
    context: SessionContext,
    icons: IconSet,

    /// Render scale the icons were last loaded at
    current_scale: f32,

    hovered: Option<SessionAction>,

    /// Action whose command is running
    pending: Option<SessionAction>,

    /// Exit has been requested; nothing else may start
    closing: bool,

    window: Option<window::Id>,
}

impl ExitDialog {
    pub fn new(config: Config, display: DisplayInfo) -> (Self, Task<Message>) {
        let context = SessionContext::current(&config.lock_wallpaper);
        (Self::with_context(config, display, context), Task::none())
    }

    fn with_context(config: Config, display: DisplayInfo, context: SessionContext) -> Self {
        let current_scale = scale::render_scale(1.0, display.dpi);
        let icons = IconSet::load(&config.icons_dir, config.layout.button_size, current_scale);

        Self {
            layout: config.layout,
            display,
            context,
            icons,
            current_scale,
            hovered: None,
            pending: None,
            closing: false,
            window: None,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::WindowOpened(id) => {
                self.window = Some(id);
                window::get_scale_factor(id).map(Message::ScaleFactor)
            }
            Message::Resized(id) => window::get_scale_factor(id).map(Message::ScaleFactor),
            Message::ScaleFactor(toolkit_scale) => {
                self.apply_scale(toolkit_scale);
                Task::none()
            }
            Message::Hovered(action) => {
                self.hovered = Some(action);
                Task::none()
            }
            Message::Unhovered(action) => {
                if self.hovered == Some(action) {
                    self.hovered = None;
                }
                Task::none()
            }
            Message::Activated(action) => self.activate(action),
            Message::Finished(action) => {
                debug!("{:?} finished, closing", action);
                self.close()
            }
            Message::Quit => {
                info!("Escape pressed -> closing UI");
                self.close()
            }
            Message::Signal(name) => {
                info!("Received signal {} -> quitting", name);
                self.close()
            }
        }
    }

    fn close(&mut self) -> Task<Message> {
        self.closing = true;
        iced::exit()
    }

    /// Reload icons if the render scale changed. Returns whether it did.
    fn apply_scale(&mut self, toolkit_scale: f32) -> bool {
        let scale = scale::render_scale(toolkit_scale, self.display.dpi);
        if scale == self.current_scale {
            return false;
        }

        info!("Scaling icons -> scale factor: {}", scale);
        self.current_scale = scale;
        self.icons.rescale(scale);
        true
    }

    fn activate(&mut self, action: SessionAction) -> Task<Message> {
        if let Some(running) = self.pending {
            debug!("Ignoring {:?}, {:?} still running", action, running);
            return Task::none();
        }
        if self.closing {
            debug!("Ignoring {:?}, already closing", action);
            return Task::none();
        }

        action.announce();
        let Some(invocation) = action.invocation(&self.context) else {
            return self.close();
        };

        self.pending = Some(action);
        let run = Task::perform(session::run_logged(invocation), move |()| {
            Message::Finished(action)
        });

        match self.window {
            Some(id) if hides_before_run(action, self.window) => {
                window::change_mode(id, window::Mode::Hidden).chain(run)
            }
            _ => run,
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let buttons = Row::with_children(
            SessionAction::ALL
                .iter()
                .map(|&action| self.power_button(action)),
        )
        .spacing(self.layout.spacing)
        .align_y(Alignment::Center);

        container(buttons)
            .padding(Padding {
                top: self.layout.margin_vertical,
                right: self.layout.margin_horizontal,
                bottom: self.layout.margin_vertical,
                left: self.layout.margin_horizontal,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Center)
            .align_y(Vertical::Center)
            .style(theme::dialog(self.display.composited))
            .into()
    }

    fn power_button(&self, action: SessionAction) -> Element<'_, Message> {
        let hovered = self.hovered == Some(action);
        let size = Length::Fixed(self.layout.button_size as f32);

        let content: Element<'_, Message> = match self.icons.pair(action).map(|p| p.get(hovered)) {
            Some(Icon::Vector(handle)) => svg(handle.clone()).width(size).height(size).into(),
            Some(Icon::Raster(handle)) => image(handle.clone()).width(size).height(size).into(),
            None => Space::new(size, size).into(),
        };

        mouse_area(
            container(content)
                .padding(2)
                .style(theme::power_button(hovered)),
        )
        .on_enter(Message::Hovered(action))
        .on_exit(Message::Unhovered(action))
        .on_release(Message::Activated(action))
        .interaction(mouse::Interaction::Pointer)
        .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            keyboard::on_key_press(|key, _modifiers| shortcut(&key)),
            window::open_events().map(Message::WindowOpened),
            window::resize_events().map(|(id, _size)| Message::Resized(id)),
            signals::subscription(),
        ])
    }
}

/// The locker grabs the screen, so the dialog must be gone before it starts
fn hides_before_run(action: SessionAction, window: Option<window::Id>) -> bool {
    action == SessionAction::Lock && window.is_some()
}

/// Keyboard shortcuts: Escape closes, `l` locks
pub fn shortcut(key: &keyboard::Key) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::Quit),
        keyboard::Key::Character("l") | keyboard::Key::Character("L") => {
            Some(Message::Activated(SessionAction::Lock))
        }
        _ => None,
    }
}

/// Open the dialog and block until it closes
pub fn run(config: Config, display: DisplayInfo) -> iced::Result {
    let settings = window::Settings {
        size: Size::new(config.layout.window_width, config.layout.window_height),
        position: window::Position::Centered,
        resizable: false,
        decorations: false,
        transparent: display.composited,
        ..window::Settings::default()
    };
    let composited = display.composited;

    iced::application(WINDOW_TITLE, ExitDialog::update, ExitDialog::view)
        .subscription(ExitDialog::subscription)
        .theme(|_| Theme::Dark)
        .style(move |_, _| application::Appearance {
            background_color: if composited {
                Color::TRANSPARENT
            } else {
                theme::colors::BACKDROP_OPAQUE
            },
            text_color: Color::WHITE,
        })
        .window(settings)
        .run_with(move || ExitDialog::new(config, display))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dialog(dpi: Option<f32>) -> ExitDialog {
        let config = Config {
            icons_dir: PathBuf::from("/nonexistent/icons"),
            lock_wallpaper: PathBuf::from("/nonexistent/wall.png"),
            layout: LayoutConfig::default(),
        };
        let display = DisplayInfo {
            dpi,
            composited: false,
        };
        let context = SessionContext {
            uid: 1000,
            lock_wallpaper: None,
        };
        ExitDialog::with_context(config, display, context)
    }

    #[test]
    fn test_shortcuts() {
        let escape = keyboard::Key::Named(keyboard::key::Named::Escape);
        assert!(matches!(shortcut(&escape), Some(Message::Quit)));

        for l in ["l", "L"] {
            let key = keyboard::Key::Character(l.into());
            assert!(matches!(
                shortcut(&key),
                Some(Message::Activated(SessionAction::Lock))
            ));
        }

        let other = keyboard::Key::Character("r".into());
        assert!(shortcut(&other).is_none());
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let mut dialog = dialog(None);

        let _ = dialog.update(Message::Hovered(SessionAction::Reboot));
        assert_eq!(dialog.hovered, Some(SessionAction::Reboot));

        // A late leave from the previous button must not clear the new hover
        let _ = dialog.update(Message::Hovered(SessionAction::Shutdown));
        let _ = dialog.update(Message::Unhovered(SessionAction::Reboot));
        assert_eq!(dialog.hovered, Some(SessionAction::Shutdown));

        let _ = dialog.update(Message::Unhovered(SessionAction::Shutdown));
        assert_eq!(dialog.hovered, None);
    }

    #[test]
    fn test_initial_scale_follows_dpi() {
        assert_eq!(dialog(Some(96.0)).current_scale, 1.0);
        assert_eq!(dialog(Some(192.0)).current_scale, 2.0);
    }

    #[test]
    fn test_rescale_only_on_change() {
        let mut dialog = dialog(Some(144.0));
        assert_eq!(dialog.current_scale, 1.5);

        // Toolkit scale below the DPI bucket changes nothing
        assert!(!dialog.apply_scale(1.0));
        assert!(dialog.apply_scale(2.0));
        assert_eq!(dialog.current_scale, 2.0);
        assert!(!dialog.apply_scale(2.0));
    }

    #[test]
    fn test_activation_ignored_while_pending() {
        let mut dialog = dialog(None);

        let _ = dialog.update(Message::Activated(SessionAction::Reboot));
        assert_eq!(dialog.pending, Some(SessionAction::Reboot));

        let _ = dialog.update(Message::Activated(SessionAction::Shutdown));
        assert_eq!(dialog.pending, Some(SessionAction::Reboot));
    }

    #[test]
    fn test_cancel_runs_no_command() {
        let mut dialog = dialog(None);
        let _ = dialog.update(Message::Activated(SessionAction::Cancel));
        assert_eq!(dialog.pending, None);
        assert!(dialog.closing);
    }

    #[test]
    fn test_only_lock_hides_window_first() {
        let id = window::Id::unique();
        for action in SessionAction::ALL {
            let expected = action == SessionAction::Lock;
            assert_eq!(hides_before_run(action, Some(id)), expected, "{:?}", action);
            assert!(!hides_before_run(action, None), "{:?}", action);
        }
    }

    #[test]
    fn test_signal_closes_and_blocks_actions() {
        let mut dialog = dialog(None);

        let _ = dialog.update(Message::Signal("SIGTERM"));
        assert!(dialog.closing);

        let _ = dialog.update(Message::Activated(SessionAction::Shutdown));
        assert_eq!(dialog.pending, None);
    }

    #[test]
    fn test_escape_closes() {
        let mut dialog = dialog(None);
        let _ = dialog.update(Message::Quit);
        assert!(dialog.closing);
    }
}
