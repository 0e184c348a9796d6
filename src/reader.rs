//! Thin forwarding shim over an external e-book renderer.
//!
//! The renderer does the pagination and drawing; this layer only maps
//! directional intents and internal link clicks onto it and tracks the
//! start/end flags used to disable navigation buttons.

/// Location state reported by the renderer after navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderLocation {
    pub at_start: bool,
    pub at_end: bool,
}

/// Consumed interface of the e-book rendering collaborator.
pub trait EpubRenderer {
    fn next(&mut self) -> ReaderLocation;
    fn prev(&mut self) -> ReaderLocation;
    fn go_to(&mut self, locator: &str) -> ReaderLocation;
    fn set_spread(&mut self, enabled: bool);
    fn resize(&mut self);
    fn dispose(&mut self);
}

/// A page-turn request from keys, swipes, or an internal link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageIntent {
    Forward,
    Back,
    Link(String),
}

pub struct ReaderControls<R: EpubRenderer> {
    renderer: R,
    location: ReaderLocation,
}

impl<R: EpubRenderer> ReaderControls<R> {
    pub fn open(renderer: R) -> Self {
        Self {
            renderer,
            // A freshly opened book sits on its first page.
            location: ReaderLocation { at_start: true, at_end: false },
        }
    }

    pub fn handle(&mut self, intent: PageIntent) {
        self.location = match intent {
            PageIntent::Forward if self.location.at_end => return,
            PageIntent::Back if self.location.at_start => return,
            PageIntent::Forward => self.renderer.next(),
            PageIntent::Back => self.renderer.prev(),
            PageIntent::Link(locator) => self.renderer.go_to(&locator),
        };
    }

    pub fn set_spread(&mut self, enabled: bool) {
        self.renderer.set_spread(enabled);
    }

    pub fn resize(&mut self) {
        self.renderer.resize();
    }

    pub fn at_start(&self) -> bool {
        self.location.at_start
    }

    pub fn at_end(&self) -> bool {
        self.location.at_end
    }
}

impl<R: EpubRenderer> Drop for ReaderControls<R> {
    fn drop(&mut self) {
        self.renderer.dispose();
    }
}
