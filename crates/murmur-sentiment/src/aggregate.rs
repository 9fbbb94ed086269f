use murmur_types::models::Sentiment;

/// Label counts across a user's annotated messages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SentimentTally {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentTally {
    pub fn add(&mut self, label: Sentiment, count: u64) {
        match label {
            Sentiment::Positive => self.positive += count,
            Sentiment::Neutral => self.neutral += count,
            Sentiment::Negative => self.negative += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    /// The most frequent label and its share of the total. Ties go to
    /// positive, then negative, then neutral. `None` when nothing is labeled.
    pub fn dominant(&self) -> Option<(Sentiment, f64)> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let ranked = [
            (Sentiment::Positive, self.positive),
            (Sentiment::Negative, self.negative),
            (Sentiment::Neutral, self.neutral),
        ];

        let mut best = ranked[0];
        for candidate in &ranked[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }

        Some((best.0, best.1 as f64 / total as f64))
    }
}

impl FromIterator<Sentiment> for SentimentTally {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Self {
        let mut tally = Self::default();
        for label in iter {
            tally.add(label, 1);
        }
        tally
    }
}
