//! Dialog adapter contract
//!
//! Prompts and notices are presented by the host: modal popups in a browser,
//! plain lines in a terminal. The session only builds [`TextPrompt`] and
//! [`Notice`] values and hands them to a [`Dialog`].

use serde::Serialize;

/// A text-input prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    pub title: String,
    pub label: String,
    pub placeholder: String,
    /// Shown when the user confirms an empty input
    pub empty_message: String,
}

impl TextPrompt {
    /// The prompt asking for a new location's name.
    pub fn location_name() -> Self {
        Self {
            title: "Enter a location name".to_string(),
            label: "Location".to_string(),
            placeholder: "Location name".to_string(),
            empty_message: "Nothing was entered!".to_string(),
        }
    }

    /// Whether `input` is acceptable as an answer.
    pub fn accepts(&self, input: &str) -> bool {
        !input.trim().is_empty()
    }
}

/// Visual tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

/// A one-shot informational display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    /// Body lines; `(label, value)` pairs render as `label: value`
    pub lines: Vec<NoticeLine>,
}

/// One line of a notice body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NoticeLine {
    Text(String),
    Field { label: String, value: String },
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title)
    }

    /// Append a free text line.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.lines.push(NoticeLine::Text(text.into()));
        self
    }

    /// Append a labelled value.
    pub fn field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.lines.push(NoticeLine::Field {
            label: label.into(),
            value: value.into(),
        });
        self
    }
}

/// Presents prompts and notices to the user.
pub trait Dialog {
    /// Ask for text.
    ///
    /// Implementations re-ask with the prompt's `empty_message` until the
    /// input is accepted. Returns `None` when the user cancels.
    fn prompt_text(&mut self, prompt: &TextPrompt) -> Option<String>;

    /// Show a notice without waiting for an answer.
    fn notify(&mut self, notice: &Notice);
}

/// Dialog that replays scripted answers and records notices.
///
/// Empty scripted answers are rejected the way an interactive prompt would
/// reject them, so they are counted and skipped.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    answers: std::collections::VecDeque<Option<String>>,
    pub rejected_inputs: usize,
    pub notices: Vec<Notice>,
}

impl ScriptedDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer the user "types".
    pub fn answer(mut self, text: impl Into<String>) -> Self {
        self.answers.push_back(Some(text.into()));
        self
    }

    /// Queue a cancellation.
    pub fn cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Dialog for ScriptedDialog {
    fn prompt_text(&mut self, prompt: &TextPrompt) -> Option<String> {
        while let Some(answer) = self.answers.pop_front() {
            match answer {
                Some(text) if prompt.accepts(&text) => return Some(text),
                Some(_) => self.rejected_inputs += 1,
                None => return None,
            }
        }
        None
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_rejects_empty() {
        let prompt = TextPrompt::location_name();
        assert!(!prompt.accepts(""));
        assert!(!prompt.accepts("  "));
        assert!(prompt.accepts("Gedung Sate"));
    }

    #[test]
    fn test_notice_builder() {
        let notice = Notice::info("Location details")
            .field("Name", "Gedung Sate")
            .text("Saved earlier");

        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.lines.len(), 2);

        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["lines"][0]["label"], "Name");
        assert_eq!(json["lines"][1], "Saved earlier");
    }

    #[test]
    fn test_scripted_dialog_skips_empty_answers() {
        let mut dialog = ScriptedDialog::new().answer("").answer("Home");
        let answer = dialog.prompt_text(&TextPrompt::location_name());

        assert_eq!(answer.as_deref(), Some("Home"));
        assert_eq!(dialog.rejected_inputs, 1);
    }

    #[test]
    fn test_scripted_dialog_cancel() {
        let mut dialog = ScriptedDialog::new().cancel();
        assert!(dialog.prompt_text(&TextPrompt::location_name()).is_none());
    }
}
