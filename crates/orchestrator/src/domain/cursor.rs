#![forbid(unsafe_code)]

/// Last observed video identifier.
///
/// The first identifier seen after construction is a baseline and never
/// reported as new. The cursor is not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCursor {
    last_seen: Option<String>,
}

impl VideoCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Returns the previous identifier when `observed` differs from it.
    pub fn observe(&mut self, observed: Option<&str>) -> Option<String> {
        let observed = observed.map(str::trim).filter(|id| !id.is_empty())?;
        match self.last_seen.as_deref() {
            None => {
                self.last_seen = Some(observed.to_owned());
                None
            }
            Some(previous) if previous == observed => None,
            Some(_) => self.last_seen.replace(observed.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_baseline() {
        let mut cursor = VideoCursor::new();
        assert_eq!(cursor.observe(Some("100")), None);
        assert_eq!(cursor.last_seen(), Some("100"));
        assert_eq!(cursor.observe(Some("100")), None);
        assert_eq!(cursor.observe(Some("101")), Some("100".to_owned()));
        assert_eq!(cursor.last_seen(), Some("101"));
    }

    #[test]
    fn absent_identifier_leaves_cursor_untouched() {
        let mut cursor = VideoCursor::new();
        assert_eq!(cursor.observe(None), None);
        assert_eq!(cursor.observe(Some("  ")), None);
        assert_eq!(cursor.last_seen(), None);

        cursor.observe(Some("7"));
        assert_eq!(cursor.observe(None), None);
        assert_eq!(cursor.last_seen(), Some("7"));
    }
}
