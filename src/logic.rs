//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Listing field groupings with their available question inventory
//!   - Turning wire-level quiz configuration into a started session
//!   - The reveal/advance transitions and the completed-quiz results payload

use rand::thread_rng;
use tracing::instrument;

use crate::protocol::{
    question_out, FieldInfo, QuestionOut, ResultsOut, RevealedOut, ReviewItem,
};
use crate::scoring::{category_breakdown, recommendations};
use crate::session::{
    Progress, QuizMode, QuizSession, SessionError, MAX_FIELD_QUESTIONS,
};
use crate::state::AppState;

/// Field groupings with how many bank questions each one can draw from.
/// Groupings with zero available questions are filtered out so the UI never
/// offers a config that the session layer would reject as an empty pool.
pub fn list_fields(state: &AppState) -> Vec<FieldInfo> {
    state
        .config
        .fields
        .iter()
        .filter_map(|grouping| {
            let available = state
                .bank
                .iter()
                .filter(|r| grouping.categories.contains(&r.category))
                .count();
            if available == 0 {
                return None;
            }
            Some(FieldInfo {
                name: grouping.name.clone(),
                available,
                max_count: available.min(MAX_FIELD_QUESTIONS),
            })
        })
        .collect()
}

/// Parse the wire-level mode selection into a `QuizMode`.
pub fn build_mode(mode: &str, field: Option<String>, count: usize) -> Result<QuizMode, String> {
    match mode {
        "random" => Ok(QuizMode::Random { count }),
        "by_field" => {
            let field = field.ok_or_else(|| "by_field mode requires a field".to_string())?;
            Ok(QuizMode::ByField { field, count })
        }
        other => Err(format!("unknown quiz mode: {}", other)),
    }
}

/// Materialize a session for the requested configuration and return it with
/// the first question.
#[instrument(level = "info", skip(state), fields(%mode, count))]
pub fn start_session(
    state: &AppState,
    mode: &str,
    field: Option<String>,
    count: usize,
) -> Result<(QuizSession, QuestionOut), String> {
    let mode = build_mode(mode, field, count)?;
    let session = QuizSession::start(
        &state.bank,
        &mode,
        &state.config.fields,
        &mut thread_rng(),
    )
    .map_err(|e| e.to_string())?;
    let question = question_out(&session).ok_or_else(|| SessionError::EmptyPool.to_string())?;
    Ok((session, question))
}

/// Flip the current question into the reveal state for `selected`.
pub fn reveal_answer(session: &mut QuizSession, selected: usize) -> Result<RevealedOut, String> {
    let record = session.reveal(selected).map_err(|e| e.to_string())?;
    Ok(RevealedOut {
        correct: selected == record.correct_index,
        correct_index: record.correct_index,
        correct_option: record.correct_option().to_string(),
        explanation: record.explanation.clone(),
    })
}

/// Advance past the revealed question: either the next question comes back,
/// or the session completes and the results payload is built.
pub fn advance_session(
    session: &mut QuizSession,
    state: &AppState,
) -> Result<(Option<QuestionOut>, Option<ResultsOut>), String> {
    match session.advance().map_err(|e| e.to_string())? {
        Progress::Next(_) => Ok((question_out(session), None)),
        Progress::Completed => Ok((None, Some(results_out(session, state)))),
    }
}

/// Aggregate a completed session: total score, per-category breakdown,
/// remedial recommendations, and the per-question review detail.
pub fn results_out(session: &QuizSession, state: &AppState) -> ResultsOut {
    let pool = session.pool();
    let answers = session.answers();
    let breakdown = category_breakdown(pool, answers);
    let recs = recommendations(
        &breakdown,
        &state.config.recommendations,
        &state.config.fallback_recommendation,
        &state.config.congratulations,
    );
    let review = pool
        .iter()
        .zip(answers)
        .map(|(record, selected)| ReviewItem {
            question: record.question.clone(),
            category: record.category.clone(),
            selected_option: record.options[*selected].clone(),
            correct_option: record.correct_option().to_string(),
            correct: *selected == record.correct_index,
            explanation: record.explanation.clone(),
        })
        .collect();

    let total = pool.len();
    let percentage = if total == 0 {
        0.0
    } else {
        (session.score() as f32 / total as f32) * 100.0
    };
    ResultsOut {
        score: session.score(),
        total,
        percentage,
        breakdown,
        recommendations: recs,
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuizConfig;
    use crate::domain::QuizRecord;

    fn state() -> AppState {
        let bank = (0..8)
            .map(|i| QuizRecord {
                category: if i < 4 { "教育政策" } else { "医療政策" }.into(),
                question: format!("Q{}", i),
                options: ["a".into(), "b".into(), "c".into(), "d".into()],
                correct_index: 0,
                explanation: format!("E{}", i),
            })
            .collect();
        AppState::with_bank(bank, QuizConfig::default())
    }

    #[test]
    fn fields_report_available_inventory_only() {
        let state = state();
        let fields = list_fields(&state);
        // Only the groupings actually represented in the bank show up.
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["教育", "医療"]);
        assert!(fields.iter().all(|f| f.available == 4 && f.max_count == 4));
    }

    #[test]
    fn full_flow_produces_results_with_review() {
        let state = state();
        let (mut session, first) =
            start_session(&state, "random", None, 5).expect("start");
        assert_eq!(first.index, 0);
        assert_eq!(first.total, 5);

        let mut results = None;
        for _ in 0..5 {
            let revealed = reveal_answer(&mut session, 0).expect("reveal");
            assert!(revealed.correct);
            let (question, r) = advance_session(&mut session, &state).expect("advance");
            if let Some(r) = r {
                assert!(question.is_none());
                results = Some(r);
            }
        }
        let results = results.expect("completed");
        assert_eq!(results.score, 5);
        assert_eq!(results.review.len(), 5);
        assert_eq!(results.percentage, 100.0);
        assert_eq!(results.recommendations.len(), 1);
    }

    #[test]
    fn bad_configurations_are_plain_errors() {
        let state = state();
        assert!(start_session(&state, "by_field", None, 5).is_err());
        assert!(start_session(&state, "by_field", Some("経済財政".into()), 5).is_err());
        assert!(start_session(&state, "banana", None, 5).is_err());
        assert!(start_session(&state, "random", None, 7).is_err());
    }

    #[test]
    fn by_field_start_draws_only_from_the_grouping() {
        let state = state();
        let (session, _) =
            start_session(&state, "by_field", Some("医療".into()), 10).expect("start");
        assert_eq!(session.total(), 4);
        assert!(session.pool().iter().all(|r| r.category == "医療政策"));
    }
}
