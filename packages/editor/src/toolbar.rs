//! # Floating Toolbar
//!
//! State machine for the formatting toolbar of one editable region.
//!
//! ```text
//!            visible                link button
//! Hidden ───────────▶ Visible ─────────────────▶ LinkInputOpen
//!   ▲                  │  ▲ ◀── submit / Escape ──┘
//!   └── blur / hidden ─┘  └──── pick / Escape ──── ColorPickerOpen
//! ```
//!
//! The toolbar never touches the document. Button presses turn into a
//! [`Command`] for the session to execute, and every press asks the host to
//! suppress its default focus change so the selection survives the click.

use crate::commands::Command;
use sitebuilder_markup::{Align, BlockKind, Mark};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkInput {
    pub draft: String,
    /// Set when an empty URL was submitted
    pub invalid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolbarState {
    #[default]
    Hidden,
    Visible,
    LinkInputOpen(LinkInput),
    ColorPickerOpen,
}

impl ToolbarState {
    fn name(&self) -> &'static str {
        match self {
            ToolbarState::Hidden => "hidden",
            ToolbarState::Visible => "visible",
            ToolbarState::LinkInputOpen(_) => "link-input",
            ToolbarState::ColorPickerOpen => "color-picker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    Bold,
    Italic,
    Underline,
    Code,
    Heading1,
    Heading2,
    Quote,
    AlignLeft,
    AlignCenter,
    AlignRight,
    Link,
    Unlink,
    Color,
}

impl ToolbarButton {
    /// Command fired directly by this button, if any
    pub fn command(self) -> Option<Command> {
        let command = match self {
            ToolbarButton::Bold => Command::ToggleMark { mark: Mark::Bold },
            ToolbarButton::Italic => Command::ToggleMark { mark: Mark::Italic },
            ToolbarButton::Underline => Command::ToggleMark {
                mark: Mark::Underline,
            },
            ToolbarButton::Code => Command::ToggleMark { mark: Mark::Code },
            ToolbarButton::Heading1 => Command::ToggleBlockType {
                kind: BlockKind::Heading1,
            },
            ToolbarButton::Heading2 => Command::ToggleBlockType {
                kind: BlockKind::Heading2,
            },
            ToolbarButton::Quote => Command::ToggleBlockType {
                kind: BlockKind::Quote,
            },
            ToolbarButton::AlignLeft => Command::SetAlignment { align: Align::Left },
            ToolbarButton::AlignCenter => Command::SetAlignment {
                align: Align::Center,
            },
            ToolbarButton::AlignRight => Command::SetAlignment {
                align: Align::Right,
            },
            ToolbarButton::Unlink => Command::RemoveLink,
            ToolbarButton::Link | ToolbarButton::Color => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarEvent {
    /// Tracker verdict for the current selection
    VisibilityChanged(bool),
    Pressed(ToolbarButton),
    LinkDraftChanged(String),
    SubmitLink,
    Escape,
    ColorPicked(String),
    /// Selection went away while a sub-panel was open
    SelectionLost,
    Blur,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolbarResponse {
    pub command: Option<Command>,
    /// The host must cancel its default handling (focus change) of the event
    pub prevent_default: bool,
}

impl ToolbarResponse {
    fn consumed() -> Self {
        Self {
            command: None,
            prevent_default: true,
        }
    }

    fn run(command: Command) -> Self {
        Self {
            command: Some(command),
            prevent_default: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatingToolbar {
    state: ToolbarState,
}

impl FloatingToolbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ToolbarState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != ToolbarState::Hidden
    }

    pub fn link_input(&self) -> Option<&LinkInput> {
        match &self.state {
            ToolbarState::LinkInputOpen(input) => Some(input),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: ToolbarEvent) -> ToolbarResponse {
        let from = self.state.name();
        let response = self.transition(event);
        if from != self.state.name() {
            debug!(from, to = self.state.name(), "toolbar transition");
        }
        response
    }

    fn transition(&mut self, event: ToolbarEvent) -> ToolbarResponse {
        use ToolbarState::*;

        match event {
            ToolbarEvent::VisibilityChanged(true) => {
                if self.state == Hidden {
                    self.state = Visible;
                }
                ToolbarResponse::default()
            }
            ToolbarEvent::VisibilityChanged(false) | ToolbarEvent::Blur => {
                self.state = Hidden;
                ToolbarResponse::default()
            }
            ToolbarEvent::Pressed(_) if self.state == Hidden => ToolbarResponse::consumed(),
            ToolbarEvent::Pressed(ToolbarButton::Link) => {
                self.state = match self.state {
                    LinkInputOpen(_) => Visible,
                    _ => LinkInputOpen(LinkInput::default()),
                };
                ToolbarResponse::consumed()
            }
            ToolbarEvent::Pressed(ToolbarButton::Color) => {
                self.state = match self.state {
                    ColorPickerOpen => Visible,
                    _ => ColorPickerOpen,
                };
                ToolbarResponse::consumed()
            }
            ToolbarEvent::Pressed(button) => {
                self.state = Visible;
                match button.command() {
                    Some(command) => ToolbarResponse::run(command),
                    None => ToolbarResponse::consumed(),
                }
            }
            ToolbarEvent::LinkDraftChanged(draft) => {
                if let LinkInputOpen(input) = &mut self.state {
                    input.draft = draft;
                    input.invalid = false;
                }
                ToolbarResponse::default()
            }
            ToolbarEvent::SubmitLink => {
                let LinkInputOpen(input) = &mut self.state else {
                    return ToolbarResponse::default();
                };
                let url = input.draft.trim().to_string();
                if url.is_empty() {
                    input.invalid = true;
                    return ToolbarResponse::consumed();
                }
                self.state = Visible;
                ToolbarResponse::run(Command::InsertLink { url })
            }
            ToolbarEvent::ColorPicked(color) => {
                if self.state != ColorPickerOpen {
                    return ToolbarResponse::default();
                }
                self.state = Visible;
                ToolbarResponse::run(Command::ToggleMark {
                    mark: Mark::Color(color),
                })
            }
            ToolbarEvent::Escape | ToolbarEvent::SelectionLost => {
                if matches!(self.state, LinkInputOpen(_) | ColorPickerOpen) {
                    self.state = Visible;
                }
                ToolbarResponse::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown() -> FloatingToolbar {
        let mut toolbar = FloatingToolbar::new();
        toolbar.handle(ToolbarEvent::VisibilityChanged(true));
        toolbar
    }

    #[test]
    fn test_visibility_drives_hidden_and_visible() {
        let mut toolbar = shown();
        assert_eq!(toolbar.state(), &ToolbarState::Visible);

        toolbar.handle(ToolbarEvent::VisibilityChanged(false));
        assert_eq!(toolbar.state(), &ToolbarState::Hidden);
    }

    #[test]
    fn test_button_press_prevents_default_and_emits_command() {
        let mut toolbar = shown();
        let response = toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Bold));
        assert!(response.prevent_default);
        assert_eq!(response.command, Some(Command::ToggleMark { mark: Mark::Bold }));
    }

    #[test]
    fn test_hidden_toolbar_ignores_buttons_but_keeps_focus() {
        let mut toolbar = FloatingToolbar::new();
        let response = toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Bold));
        assert!(response.command.is_none());
        assert!(response.prevent_default);
        assert_eq!(toolbar.state(), &ToolbarState::Hidden);
    }

    #[test]
    fn test_empty_link_submit_marks_invalid() {
        let mut toolbar = shown();
        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Link));
        toolbar.handle(ToolbarEvent::LinkDraftChanged("   ".into()));

        let response = toolbar.handle(ToolbarEvent::SubmitLink);
        assert!(response.command.is_none());
        assert!(toolbar.link_input().unwrap().invalid);
    }

    #[test]
    fn test_link_submit_closes_input() {
        let mut toolbar = shown();
        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Link));
        toolbar.handle(ToolbarEvent::LinkDraftChanged(" https://a.test ".into()));

        let response = toolbar.handle(ToolbarEvent::SubmitLink);
        assert_eq!(
            response.command,
            Some(Command::InsertLink {
                url: "https://a.test".into()
            })
        );
        assert_eq!(toolbar.state(), &ToolbarState::Visible);
    }

    #[test]
    fn test_escape_discards_draft() {
        let mut toolbar = shown();
        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Link));
        toolbar.handle(ToolbarEvent::LinkDraftChanged("draft".into()));
        toolbar.handle(ToolbarEvent::Escape);
        assert_eq!(toolbar.state(), &ToolbarState::Visible);

        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Link));
        assert_eq!(toolbar.link_input().unwrap().draft, "");
    }

    #[test]
    fn test_sub_panels_are_exclusive() {
        let mut toolbar = shown();
        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Link));
        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Color));
        assert_eq!(toolbar.state(), &ToolbarState::ColorPickerOpen);

        let response = toolbar.handle(ToolbarEvent::ColorPicked("#ff0000".into()));
        assert_eq!(
            response.command,
            Some(Command::ToggleMark {
                mark: Mark::Color("#ff0000".into())
            })
        );
        assert_eq!(toolbar.state(), &ToolbarState::Visible);
    }

    #[test]
    fn test_blur_cancels_link_input() {
        let mut toolbar = shown();
        toolbar.handle(ToolbarEvent::Pressed(ToolbarButton::Link));
        toolbar.handle(ToolbarEvent::Blur);
        assert_eq!(toolbar.state(), &ToolbarState::Hidden);
    }
}
