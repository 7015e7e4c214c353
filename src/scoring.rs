//! Scoring & recommendation engine: per-category aggregation of a completed
//! session and derivation of remedial messages.

use serde::Serialize;

use crate::config::RecommendationRule;
use crate::domain::QuizRecord;
use crate::util::fill_template;

/// Categories scoring strictly below this percentage get a remedial message.
const REMEDIAL_THRESHOLD: f32 = 50.0;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategoryScore {
    pub category: String,
    pub correct: u32,
    pub total: u32,
    pub percentage: f32,
}

/// Group answered questions by category, in first-observed order, and
/// accumulate correct/total counts. Correctness is the same index equality
/// the session used for scoring.
pub fn category_breakdown(pool: &[QuizRecord], answers: &[usize]) -> Vec<CategoryScore> {
    let mut scores: Vec<CategoryScore> = Vec::new();
    for (record, selected) in pool.iter().zip(answers) {
        let idx = match scores.iter().position(|s| s.category == record.category) {
            Some(idx) => idx,
            None => {
                scores.push(CategoryScore {
                    category: record.category.clone(),
                    correct: 0,
                    total: 0,
                    percentage: 0.0,
                });
                scores.len() - 1
            }
        };
        let entry = &mut scores[idx];
        entry.total += 1;
        if *selected == record.correct_index {
            entry.correct += 1;
        }
    }
    for entry in &mut scores {
        entry.percentage = (entry.correct as f32 / entry.total as f32) * 100.0;
    }
    scores
}

/// One remedial message per category strictly below 50%, chosen by substring
/// keyword match against the category label (first rule wins, declaration
/// order). An unmatched category gets the generic fallback. When nothing is
/// below the threshold, exactly one congratulatory message is returned.
pub fn recommendations(
    breakdown: &[CategoryScore],
    rules: &[RecommendationRule],
    fallback: &str,
    congratulations: &str,
) -> Vec<String> {
    let mut messages = Vec::new();
    for score in breakdown {
        if score.percentage >= REMEDIAL_THRESHOLD {
            continue;
        }
        let message = rules
            .iter()
            .find(|r| score.category.contains(&r.keyword))
            .map(|r| r.message.clone())
            .unwrap_or_else(|| fill_template(fallback, &[("category", &score.category)]));
        messages.push(message);
    }
    if messages.is_empty() {
        messages.push(congratulations.to_string());
    }
    messages
}
