/// Index over a fixed set of slides; exactly one is shown at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.current)
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.len > 0 {
            self.current = (self.current + self.len - 1) % self.len;
        }
        self.current()
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.current() == Some(index)
    }
}
