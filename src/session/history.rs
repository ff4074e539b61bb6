use crate::clock::Clock;

/// One prompt/response exchange with the AI service.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    /// RFC 3339
    pub timestamp: String,
    pub profile_name: String,
    pub prompt: String,
    /// The reply text, or `Error: <message>` when the request failed.
    pub response: String,
}

impl Interaction {
    fn is_for(&self, profile: Option<&str>) -> bool {
        profile.map_or(true, |p| self.profile_name.eq_ignore_ascii_case(p))
    }
}

/// Interaction log, newest first.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Interaction>,
}

impl History {
    pub fn record(&mut self, profile_name: &str, prompt: &str, response: &str, clock: &dyn Clock) {
        let now = clock.now();
        let entry = Interaction {
            id: now.timestamp_millis().to_string(),
            timestamp: now.to_rfc3339(),
            profile_name: profile_name.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
        };
        self.entries.insert(0, entry);
    }

    pub fn entries(&self) -> &[Interaction] {
        &self.entries
    }

    /// Entries for one profile, or all when `profile` is `None`.
    pub fn filtered<'a>(&'a self, profile: Option<&'a str>) -> impl Iterator<Item = &'a Interaction> {
        self.entries.iter().filter(move |i| i.is_for(profile))
    }

    /// The `n`th entry of [`History::filtered`], counting from 1 = newest.
    pub fn nth(&self, profile: Option<&str>, n: u32) -> Option<&Interaction> {
        let idx = usize::try_from(n.checked_sub(1)?).ok()?;
        self.entries.iter().filter(|i| i.is_for(profile)).nth(idx)
    }

    /// Distinct profile names, in order of first appearance.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.profile_name.as_str()) {
                names.push(&entry.profile_name);
            }
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_newest_first_and_filter() {
        let clock = ManualClock::at(1_700_000_000_000);
        let mut history = History::default();
        history.record("Coder", "p1", "r1", &clock);
        clock.advance(10);
        history.record("Full Scripter", "p2", "r2", &clock);
        clock.advance(10);
        history.record("Coder", "p3", "Error: boom", &clock);

        let prompts: Vec<_> = history.entries().iter().map(|i| i.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["p3", "p2", "p1"]);

        let coder: Vec<_> = history.filtered(Some("coder")).map(|i| i.prompt.as_str()).collect();
        assert_eq!(coder, vec!["p3", "p1"]);
        assert_eq!(history.filtered(None).count(), 3);
        assert_eq!(history.profile_names(), vec!["Coder", "Full Scripter"]);
        assert_eq!(history.entries()[0].id, "1700000000020");
        assert!(history.entries()[0].timestamp.starts_with("2023-11-14T"));
    }

    #[test]
    fn test_nth_counts_from_one() {
        let clock = ManualClock::at(0);
        let mut history = History::default();
        history.record("Coder", "p1", "r1", &clock);
        history.record("Full Scripter", "p2", "r2", &clock);

        assert!(history.nth(None, 0).is_none());
        assert_eq!(history.nth(None, 1).unwrap().prompt, "p2");
        assert_eq!(history.nth(None, 2).unwrap().prompt, "p1");
        assert!(history.nth(None, 3).is_none());
        assert_eq!(history.nth(Some("coder"), 1).unwrap().prompt, "p1");
    }
}
