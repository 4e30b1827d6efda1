use crate::recognize::PredictionSet;

/// Confidence a prediction must exceed to count as a match. Sketches are
/// abstract; anything stricter rejects most honest drawings.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.3;

/// Pass/fail outcome of one evaluation, plus the data the presentation
/// layer renders. Derived, never persisted by this crate.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Verdict {
    pub matched: bool,
    /// Highest-ranked label, regardless of which prediction matched.
    pub top_label: String,
    pub top_score: f64,
    /// Presentational only; never used for scoring.
    pub message: String,
    pub all: PredictionSet,
}

/// Pure verdict computation. No I/O, no side effects.
pub struct MatchScorer;

impl MatchScorer {
    /// A prediction matches when its label (underscores folded to spaces,
    /// case-insensitive) contains the target word as a substring AND its
    /// score strictly exceeds `threshold`. Any prediction in the set may
    /// supply the match; the reported top label/score is always the first.
    pub fn score(predictions: &PredictionSet, target: &str, threshold: f64) -> Verdict {
        let needle = target.to_lowercase();
        let matched = predictions
            .iter()
            .any(|p| p.score > threshold && label_matches(&p.label, &needle));

        let top = predictions.top();
        let pct = (top.score * 100.0).round() as i64;
        let message = if matched {
            format!("Nice! That looks like {} ({pct}% sure).", top.label)
        } else {
            format!(
                "I saw {} ({pct}% sure), not {target}. Try again!",
                top.label
            )
        };

        Verdict {
            matched,
            top_label: top.label.clone(),
            top_score: top.score,
            message,
            all: predictions.clone(),
        }
    }
}

fn label_matches(label: &str, needle_lower: &str) -> bool {
    label.replace('_', " ").to_lowercase().contains(needle_lower)
}
