/// Transient notification state.
///
/// Each `show` bumps a generation; a dismissal timer only clears the toast if
/// it still carries the current generation, so an older timer cannot cut a
/// newer message short.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastState {
    generation: u64,
    message: Option<String>,
}

impl ToastState {
    pub fn show(&mut self, message: impl Into<String>) -> u64 {
        self.generation += 1;
        self.message = Some(message.into());
        self.generation
    }

    pub fn expire(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.message.is_some() {
            self.message = None;
            true
        } else {
            false
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_timer_leaves_newer_message() {
        let mut toast = ToastState::default();
        let first = toast.show("Upload failed");
        let second = toast.show("Reset failed.");
        assert!(!toast.expire(first));
        assert_eq!(toast.message(), Some("Reset failed."));
        assert!(toast.expire(second));
        assert_eq!(toast.message(), None);
    }
}
