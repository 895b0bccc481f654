use std::collections::BTreeMap;

/// Latest commit seen on one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentActivity {
    pub name: String,
    /// Committer date as reported by the API.
    pub last_commit: String,
}

/// Aggregate figures across all of a user's repositories.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    pub repos: u64,
    pub stars: u64,
    /// Bytes per language, summed across repositories.
    pub languages: BTreeMap<String, u64>,
    pub recent_activity: Vec<RecentActivity>,
}

impl RepoSummary {
    pub fn add_repository(&mut self, stars: u64) {
        self.repos += 1;
        self.stars = self.stars.saturating_add(stars);
    }

    pub fn add_languages<I>(&mut self, languages: I)
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        for (lang, bytes) in languages {
            let entry = self.languages.entry(lang).or_insert(0);
            *entry = entry.saturating_add(bytes);
        }
    }

    pub fn record_latest_commit(&mut self, name: &str, last_commit: String) {
        self.recent_activity.push(RecentActivity {
            name: name.to_string(),
            last_commit,
        });
    }

    /// Distinct language names in alphabetical order.
    pub fn language_names(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_stars_and_language_bytes() {
        let mut summary = RepoSummary::default();

        summary.add_repository(3);
        summary.add_languages([("Rust".to_string(), 1000), ("Python".to_string(), 20)]);
        summary.add_repository(0);
        summary.add_languages([("Rust".to_string(), 500), ("C".to_string(), 7)]);
        summary.add_repository(4);

        assert_eq!(summary.repos, 3);
        assert_eq!(summary.stars, 7);
        assert_eq!(summary.languages["Rust"], 1500);
        assert_eq!(summary.languages["Python"], 20);
        assert_eq!(
            summary.language_names().collect::<Vec<_>>(),
            ["C", "Python", "Rust"]
        );
    }

    #[test]
    fn keeps_latest_commit_per_repository() {
        let mut summary = RepoSummary::default();
        summary.record_latest_commit("alpha", "2024-05-01T10:00:00Z".to_string());
        summary.record_latest_commit("beta", "2024-06-02T11:00:00Z".to_string());

        assert_eq!(summary.recent_activity.len(), 2);
        assert_eq!(summary.recent_activity[1].name, "beta");
    }
}
