#![forbid(unsafe_code)]

/// A transition between the two steady live states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Started,
    Ended,
}

/// Last known live state as seen by one loop.
///
/// Each loop owns its own copy; an unknown observation (failed fetch or a
/// snapshot without a live flag) never moves it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    was_live: bool,
}

impl EdgeState {
    /// Unknown at startup counts as offline.
    pub fn offline() -> Self {
        Self { was_live: false }
    }

    pub fn live() -> Self {
        Self { was_live: true }
    }

    pub fn was_live(&self) -> bool {
        self.was_live
    }

    /// Fold one observation and report the edge it completes, if any.
    pub fn observe(&mut self, live: Option<bool>) -> Option<Edge> {
        match (self.was_live, live?) {
            (false, true) => {
                self.was_live = true;
                Some(Edge::Started)
            }
            (true, false) => {
                self.was_live = false;
                Some(Edge::Ended)
            }
            _ => None,
        }
    }
}
