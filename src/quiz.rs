//! Quiz Engine
//!
//! Multiple-choice quizzes as explicit state machines.
//!
//! ## States
//!
//! ```text
//!              select (pending choice, no transition)
//!                 ┌──────┐
//!                 ▼      │
//!   ┌──────────────────────┐  check   ┌────────────────────────┐
//!   │   Displaying(i)      │ ───────▶ │ Answered(i, correct)   │
//!   └──────────────────────┘          └────────────────────────┘
//!        ▲           ▲                    │ advance        │ advance
//!        │ reset     └────────────────────┘ (i+1 < n)      │ (last)
//!        │                                                  ▼
//!        │                                         ┌──────────────┐
//!        └─────────────────────────────────────────│   Complete   │
//!                                                  └──────────────┘
//! ```
//!
//! Every operation that does not apply in the current state is a no-op:
//! checking without a pending choice, selecting or checking after the answer
//! is revealed, advancing before checking.
//!
//! ## Example
//!
//! ```rust
//! use backprop_lab::quiz::{Question, Quiz};
//!
//! let mut quiz = Quiz::new(vec![
//!     Question::new("σ(0) = ?", ["0", "0.5", "1"], 1, "e⁰ = 1, so 1/(1+1)."),
//! ])?;
//! quiz.select(1);
//! quiz.check();
//! quiz.advance();
//! assert_eq!(quiz.summary().unwrap().to_string(), "1/1");
//! # Ok::<(), backprop_lab::LabError>(())
//! ```

use crate::error::{LabError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One multiple-choice question
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer
    pub correct: usize,
    pub explanation: String,
}

impl Question {
    pub fn new<I, S>(question: &str, options: I, correct: usize, explanation: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question: question.to_string(),
            options: options.into_iter().map(Into::into).collect(),
            correct,
            explanation: explanation.to_string(),
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.options.len() < 2 {
            return Err(LabError::InvalidQuiz(format!(
                "question {} has {} option(s), need at least 2",
                index + 1,
                self.options.len()
            )));
        }
        if self.correct >= self.options.len() {
            return Err(LabError::InvalidQuiz(format!(
                "question {} marks option {} correct but has only {} options",
                index + 1,
                self.correct,
                self.options.len()
            )));
        }
        Ok(())
    }
}

/// Where the quiz currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Displaying { index: usize },
    Answered { index: usize, correct: bool },
    Complete,
}

/// Final score card
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
}

impl QuizSummary {
    /// Score as a whole percentage, rounded half up
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.score as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn verdict(&self) -> &'static str {
        match self.percent() {
            p if p >= 80 => "Excellent work!",
            p if p >= 60 => "Good job!",
            _ => "Keep practicing!",
        }
    }
}

impl fmt::Display for QuizSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.score, self.total)
    }
}

/// Feedback shown once an answer is checked
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback<'a> {
    pub correct: bool,
    pub title: &'static str,
    pub explanation: &'a str,
}

/// A quiz and its progress
#[derive(Clone, Debug)]
pub struct Quiz {
    questions: Vec<Question>,
    phase: QuizPhase,
    score: usize,
    selected: Option<usize>,
}

impl Quiz {
    /// Build a quiz, validating every question
    ///
    /// # Errors
    ///
    /// Returns [`LabError::InvalidQuiz`] if there are no questions, a question
    /// has fewer than two options, or a correct index is out of range.
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(LabError::InvalidQuiz("quiz has no questions".to_string()));
        }
        for (i, q) in questions.iter().enumerate() {
            q.validate(i)?;
        }

        Ok(Self {
            questions,
            phase: QuizPhase::Displaying { index: 0 },
            score: 0,
            selected: None,
        })
    }

    /// Parse a JSON array of questions
    pub fn from_json(json: &str) -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Pending choice, if any
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.phase, QuizPhase::Answered { .. })
    }

    /// The question on screen, or `None` once complete
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::Displaying { index } | QuizPhase::Answered { index, .. } => {
                self.questions.get(index)
            }
            QuizPhase::Complete => None,
        }
    }

    /// "Question 2 of 5"
    pub fn progress_label(&self) -> Option<String> {
        match self.phase {
            QuizPhase::Displaying { index } | QuizPhase::Answered { index, .. } => {
                Some(format!("Question {} of {}", index + 1, self.questions.len()))
            }
            QuizPhase::Complete => None,
        }
    }

    /// Label for the advance button
    pub fn advance_label(&self) -> &'static str {
        match self.phase {
            QuizPhase::Displaying { index } | QuizPhase::Answered { index, .. }
                if index + 1 < self.questions.len() =>
            {
                "Next Question"
            }
            _ => "Finish",
        }
    }

    /// Record a pending choice
    ///
    /// Only applies while a question is displayed and `index` names one of its
    /// options.
    pub fn select(&mut self, index: usize) {
        if let QuizPhase::Displaying { index: q } = self.phase {
            if index < self.questions[q].options.len() {
                self.selected = Some(index);
            }
        }
    }

    /// Reveal the answer for the pending choice
    ///
    /// # Returns
    ///
    /// `Some(correct)` if the check happened, `None` if it was a no-op.
    pub fn check(&mut self) -> Option<bool> {
        let (QuizPhase::Displaying { index }, Some(choice)) = (self.phase, self.selected) else {
            return None;
        };

        let correct = choice == self.questions[index].correct;
        if correct {
            self.score += 1;
        }
        self.phase = QuizPhase::Answered { index, correct };
        tracing::debug!(question = index, choice, correct, "quiz answer checked");
        Some(correct)
    }

    /// Move past an answered question
    pub fn advance(&mut self) {
        let QuizPhase::Answered { index, .. } = self.phase else {
            return;
        };

        self.selected = None;
        self.phase = if index + 1 < self.questions.len() {
            QuizPhase::Displaying { index: index + 1 }
        } else {
            tracing::debug!(score = self.score, total = self.questions.len(), "quiz complete");
            QuizPhase::Complete
        };
    }

    /// Start over from the first question with the score cleared
    pub fn reset(&mut self) {
        self.phase = QuizPhase::Displaying { index: 0 };
        self.score = 0;
        self.selected = None;
    }

    /// Feedback for the revealed answer
    pub fn feedback(&self) -> Option<Feedback<'_>> {
        let QuizPhase::Answered { index, correct } = self.phase else {
            return None;
        };
        Some(Feedback {
            correct,
            title: if correct { "✓ Correct!" } else { "✗ Not quite" },
            explanation: &self.questions[index].explanation,
        })
    }

    /// Score card, available once complete
    pub fn summary(&self) -> Option<QuizSummary> {
        match self.phase {
            QuizPhase::Complete => Some(QuizSummary {
                score: self.score,
                total: self.questions.len(),
            }),
            _ => None,
        }
    }
}

/// All quizzes on a page, keyed by id
#[derive(Debug, Default)]
pub struct QuizRegistry {
    quizzes: HashMap<String, Quiz>,
}

impl QuizRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a quiz under `id`
    pub fn register(&mut self, id: &str, questions: Vec<Question>) -> Result<()> {
        let quiz = Quiz::new(questions)?;
        self.quizzes.insert(id.to_string(), quiz);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Quiz> {
        self.quizzes
            .get(id)
            .ok_or_else(|| LabError::UnknownQuiz(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Quiz> {
        self.quizzes
            .get_mut(id)
            .ok_or_else(|| LabError::UnknownQuiz(id.to_string()))
    }

    pub fn select(&mut self, id: &str, index: usize) -> Result<()> {
        self.get_mut(id)?.select(index);
        Ok(())
    }

    pub fn check(&mut self, id: &str) -> Result<Option<bool>> {
        Ok(self.get_mut(id)?.check())
    }

    pub fn advance(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.advance();
        Ok(())
    }

    pub fn reset(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.reset();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> Vec<Question> {
        vec![
            Question::new(
                "What does the backward pass compute?",
                ["Outputs", "Gradients", "Inputs"],
                1,
                "It propagates the error to get per-parameter gradients.",
            ),
            Question::new(
                "Max of sigmoid'(x)?",
                ["0.25", "0.5", "1"],
                0,
                "s(1-s) peaks at s = 0.5.",
            ),
        ]
    }

    #[test]
    fn test_correct_answer_scores_and_completes() {
        let mut quiz = Quiz::new(two_questions()).unwrap();

        quiz.select(1);
        assert_eq!(quiz.check(), Some(true));
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.phase(), QuizPhase::Answered { index: 0, correct: true });

        quiz.advance();
        assert_eq!(quiz.phase(), QuizPhase::Displaying { index: 1 });
        assert_eq!(quiz.selected(), None);

        quiz.select(2);
        assert_eq!(quiz.check(), Some(false));
        assert_eq!(quiz.advance_label(), "Finish");
        quiz.advance();

        assert_eq!(quiz.phase(), QuizPhase::Complete);
        let summary = quiz.summary().unwrap();
        assert_eq!(summary.to_string(), "1/2");
        assert_eq!(summary.percent(), 50);
        assert_eq!(summary.verdict(), "Keep practicing!");
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        quiz.select(2);
        let phase = quiz.phase();
        quiz.select(2);
        assert_eq!(quiz.phase(), phase);
        assert_eq!(quiz.selected(), Some(2));
        assert!(!quiz.is_answered());
    }

    #[test]
    fn test_check_without_selection_is_noop() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        assert_eq!(quiz.check(), None);
        assert_eq!(quiz.phase(), QuizPhase::Displaying { index: 0 });
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn test_no_changes_while_answered() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        quiz.select(1);
        quiz.check();

        quiz.select(0);
        assert_eq!(quiz.selected(), Some(1));
        assert_eq!(quiz.check(), None);
        assert_eq!(quiz.score(), 1);
    }

    #[test]
    fn test_advance_before_check_is_noop() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        quiz.select(1);
        quiz.advance();
        assert_eq!(quiz.phase(), QuizPhase::Displaying { index: 0 });
    }

    #[test]
    fn test_out_of_range_selection_ignored() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        quiz.select(7);
        assert_eq!(quiz.selected(), None);
    }

    #[test]
    fn test_reset_from_complete() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        for choice in [1, 0] {
            quiz.select(choice);
            quiz.check();
            quiz.advance();
        }
        assert_eq!(quiz.summary().unwrap().verdict(), "Excellent work!");

        quiz.reset();
        assert_eq!(quiz.phase(), QuizPhase::Displaying { index: 0 });
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.progress_label().unwrap(), "Question 1 of 2");
    }

    #[test]
    fn test_feedback_titles() {
        let mut quiz = Quiz::new(two_questions()).unwrap();
        assert!(quiz.feedback().is_none());
        quiz.select(0);
        quiz.check();
        let feedback = quiz.feedback().unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.title, "✗ Not quite");
        assert!(feedback.explanation.contains("gradients"));
    }

    #[test]
    fn test_invalid_quizzes_rejected() {
        assert!(Quiz::new(Vec::new()).is_err());
        assert!(Quiz::new(vec![Question::new("?", ["only"], 0, "")]).is_err());
        assert!(Quiz::new(vec![Question::new("?", ["a", "b"], 2, "")]).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"question": "ReLU'(-1)?", "options": ["0", "1"], "correct": 0, "explanation": "Flat region."}
        ]"#;
        let quiz = Quiz::from_json(json).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.current_question().unwrap().options[1], "1");
    }

    #[test]
    fn test_registry_routes_by_id() {
        let mut registry = QuizRegistry::new();
        registry.register("backprop-quiz", two_questions()).unwrap();

        registry.select("backprop-quiz", 1).unwrap();
        assert_eq!(registry.check("backprop-quiz").unwrap(), Some(true));
        assert_eq!(registry.get("backprop-quiz").unwrap().score(), 1);

        assert!(matches!(
            registry.select("missing", 0),
            Err(LabError::UnknownQuiz(_))
        ));
    }
}
