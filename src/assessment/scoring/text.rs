/// Deterministic classifier mapping free text to a 0-100 value. Kept as a
/// swappable seam so the keyword lists can be replaced without touching the
/// scoring pipeline.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> f64;
}

/// Default substring classifier. Not NLP: a flat base plus tiered keyword
/// bonuses, clamped to 0-100.
pub struct KeywordClassifier {
    base: f64,
    strong: Vec<&'static str>,
    strong_bonus: f64,
    moderate: Vec<&'static str>,
    moderate_bonus: f64,
}

impl KeywordClassifier {
    /// Vocabulary tuned for the "where do you see yourself" story prompts.
    pub fn growth_vocabulary() -> Self {
        Self {
            base: 40.0,
            strong: vec!["goal", "plan", "learn", "grow", "improve", "build"],
            strong_bonus: 15.0,
            moderate: vec!["try", "hope", "team", "help", "change", "future"],
            moderate_bonus: 8.0,
        }
    }
}

impl TextClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> f64 {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return 0.0;
        }

        let lowered = trimmed.to_lowercase();
        let mut score = self.base;
        for keyword in &self.strong {
            if lowered.contains(keyword) {
                score += self.strong_bonus;
            }
        }
        for keyword in &self.moderate {
            if lowered.contains(keyword) {
                score += self.moderate_bonus;
            }
        }

        score.clamp(0.0, 100.0)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::growth_vocabulary()
    }
}
