/// Element id of the analyze button; Enter on it is a plain submit.
pub const ANALYZE_BUTTON_ID: &str = "analyzeBtn";

/// Anything the page can hand over as an uploadable file.
pub trait FileHandle {
    fn name(&self) -> String;
}

/// Where keyboard focus was when a key went down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFocus<'a> {
    /// No button or link has focus.
    Page,
    /// A button or link, by element id.
    Control(&'a str),
}

/// The file the user picked, if any. The analyze action follows this state.
#[derive(Clone, Debug)]
pub struct UploadSession<F> {
    selected: Option<F>,
}

impl<F> Default for UploadSession<F> {
    fn default() -> Self {
        Self { selected: None }
    }
}

impl<F: FileHandle> UploadSession<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the first of `files`. An empty list leaves the current selection
    /// alone; returns whether anything changed.
    pub fn select_first<I>(&mut self, files: I) -> bool
    where
        I: IntoIterator<Item = F>,
    {
        match files.into_iter().next() {
            Some(file) => {
                self.selected = Some(file);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&F> {
        self.selected.as_ref()
    }

    pub fn analyze_enabled(&self) -> bool {
        self.selected.is_some()
    }

    pub fn label(&self) -> Option<String> {
        self.selected
            .as_ref()
            .map(|file| format!("Selected File: {}", file.name()))
    }

    /// Enter submits only while the analyze button itself would accept a
    /// click, and never steals Enter from another focused control.
    pub fn accepts_enter(&self, key: &str, busy: bool, focus: KeyFocus<'_>) -> bool {
        let owned_by_other = matches!(focus, KeyFocus::Control(id) if id != ANALYZE_BUTTON_ID);
        key == "Enter" && self.analyze_enabled() && !busy && !owned_by_other
    }
}
