//! Form engine: focus navigation, in-place editing and the submit pass.

use crossterm::event::KeyEvent;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, warn};

use super::field::{Field, FieldCollection, FieldError};
use super::input::InputBuffer;

/// Form lifecycle. The submit pass is synchronous and never observable as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Done,
    Cancelled,
}

/// Input the form reacts to, already decoded from key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Next,
    Prev,
    /// Enter: submits when the button is focused, otherwise advances
    Confirm,
    Cancel,
    CycleCursor,
    Edit(KeyEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Blink,
    Static,
    Hidden,
}

impl CursorMode {
    pub fn next(self) -> Self {
        match self {
            CursorMode::Blink => CursorMode::Static,
            CursorMode::Static => CursorMode::Hidden,
            CursorMode::Hidden => CursorMode::Blink,
        }
    }
}

impl std::fmt::Display for CursorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorMode::Blink => write!(f, "blink"),
            CursorMode::Static => write!(f, "static"),
            CursorMode::Hidden => write!(f, "hidden"),
        }
    }
}

/// Values accepted by a successful submit, keyed `field0`, `field1`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionResult {
    values: Vec<String>,
}

impl SubmissionResult {
    pub fn key(index: usize) -> String {
        format!("field{}", index)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let index = key.strip_prefix("field")?.parse::<usize>().ok()?;
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (Self::key(i), v.as_str()))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for SubmissionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(&key, value)?;
        }
        map.end()
    }
}

/// How a form session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted(SubmissionResult),
    Cancelled,
}

pub struct FormEngine {
    title: String,
    fields: Vec<Field>,
    inputs: Vec<InputBuffer>,
    focus_index: usize,
    error: Option<FieldError>,
    state: FormState,
    cursor_mode: CursorMode,
    result: Option<SubmissionResult>,
}

impl FormEngine {
    pub fn new(collection: FieldCollection) -> Self {
        let title = collection.title().to_string();
        let fields: Vec<Field> = collection.iter().cloned().collect();
        for field in fields.iter().filter(|f| !f.is_consistent()) {
            warn!(
                field = field.placeholder(),
                min = field.min(),
                max = field.max(),
                "Field length bounds can never be satisfied"
            );
        }
        let inputs = fields
            .iter()
            .map(|f| InputBuffer::with_content(f.value()))
            .collect();

        Self {
            title,
            fields,
            inputs,
            focus_index: 0,
            error: None,
            state: FormState::Editing,
            cursor_mode: CursorMode::default(),
            result: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn inputs(&self) -> &[InputBuffer] {
        &self.inputs
    }

    pub fn focus_index(&self) -> usize {
        self.focus_index
    }

    /// The virtual submit button sits after the last field.
    pub fn submit_index(&self) -> usize {
        self.fields.len()
    }

    pub fn is_button_focused(&self) -> bool {
        self.focus_index == self.submit_index()
    }

    pub fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    pub fn apply(&mut self, action: FormAction) -> FormState {
        if self.state != FormState::Editing {
            return self.state;
        }

        match action {
            FormAction::Next => self.focus_next(),
            FormAction::Prev => self.focus_prev(),
            FormAction::Confirm if self.is_button_focused() => {
                self.submit();
            }
            FormAction::Confirm => self.focus_next(),
            FormAction::Cancel => self.cancel(),
            FormAction::CycleCursor => self.cursor_mode = self.cursor_mode.next(),
            FormAction::Edit(key) => {
                if let Some(input) = self.inputs.get_mut(self.focus_index) {
                    input.handle_key(key);
                }
            }
        }
        self.state
    }

    pub fn focus_next(&mut self) {
        self.focus_index = if self.focus_index >= self.submit_index() {
            0
        } else {
            self.focus_index + 1
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus_index = if self.focus_index == 0 {
            self.submit_index()
        } else {
            self.focus_index - 1
        };
    }

    pub fn cancel(&mut self) {
        debug!(title = %self.title, "Form cancelled");
        self.state = FormState::Cancelled;
    }

    /// Validate every field in declaration order. The first failure aborts the pass.
    pub fn submit(&mut self) -> bool {
        for (field, input) in self.fields.iter().zip(&self.inputs) {
            if let Err(err) = field.check(input.content()) {
                debug!(field = field.placeholder(), error = %err.message, "Form validation failed");
                self.error = Some(err);
                return false;
            }
        }

        let values = self.inputs.iter().map(|i| i.content().to_string()).collect();
        self.result = Some(SubmissionResult { values });
        self.error = None;
        self.state = FormState::Done;
        info!(title = %self.title, fields = self.fields.len(), "Form submitted");
        true
    }

    /// Final outcome once the engine has left the editing state.
    pub fn outcome(&mut self) -> Option<FormOutcome> {
        match self.state {
            FormState::Editing => None,
            FormState::Cancelled => Some(FormOutcome::Cancelled),
            FormState::Done => self.result.take().map(FormOutcome::Submitted),
        }
    }
}
