//! Orchestrator: route → answer → review → at most one rewrite.
//!
//! ```text
//! ROUTE    coordinator reply, trimmed; unknown name / NA / failure → general
//! ANSWER   specialist.answer(question); failure → fixed apology, stop
//! REVIEW   only if the specialist has a reviewer; failure or bad format → keep answer
//! REWRITE  score < threshold → specialist.answer(rewrite instruction) once;
//!          failure → keep answer
//! ```

use std::collections::BTreeMap;

use council_core::template::render;
use council_core::types::ReviewResult;

use crate::coordinator::{Coordinator, NO_MATCH};
use crate::reviewer::Reviewer;
use crate::specialist::Specialist;

/// Returned when the selected specialist cannot answer.
pub const APOLOGY: &str = "Sorry, I could not come up with an answer right now. Please try again later.";

/// Default score below which an answer is rewritten.
pub const DEFAULT_REWRITE_THRESHOLD: i64 = 80;

/// A registered specialist and its optional reviewer.
struct Seat {
    specialist: Specialist,
    reviewer: Option<Reviewer>,
}

/// What happened while answering one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Name of the specialist that answered.
    pub specialist: String,
    pub answer: String,
    /// Present only when a review was performed and parsed.
    pub review: Option<ReviewResult>,
    pub rewritten: bool,
}

pub struct Orchestrator {
    coordinator: Coordinator,
    general: Seat,
    seats: BTreeMap<String, Seat>,
    rewrite_threshold: i64,
}

impl Orchestrator {
    /// `general` answers whenever routing finds no registered specialist.
    pub fn new(coordinator: Coordinator, general: Specialist, rewrite_threshold: i64) -> Self {
        Self {
            coordinator,
            general: Seat {
                specialist: general,
                reviewer: None,
            },
            seats: BTreeMap::new(),
            rewrite_threshold,
        }
    }

    /// Register a specialist with the coordinator and keep it for answering.
    pub fn add_specialist(&mut self, specialist: Specialist, reviewer: Option<Reviewer>) {
        let name = specialist.name().to_string();
        self.coordinator
            .register(name.clone(), specialist.profile().introduction.clone());
        self.seats.insert(name, Seat { specialist, reviewer });
    }

    pub fn specialist_count(&self) -> usize {
        self.seats.len()
    }

    pub fn specialist(&self, name: &str) -> Option<&Specialist> {
        self.seats.get(name).map(|seat| &seat.specialist)
    }

    pub fn general(&self) -> &Specialist {
        &self.general.specialist
    }

    pub fn rewrite_threshold(&self) -> i64 {
        self.rewrite_threshold
    }

    /// Answer a question; never fails.
    pub async fn chat(&self, question: &str) -> String {
        self.respond(question).await.answer
    }

    /// Answer a question and report how the answer was produced.
    pub async fn respond(&self, question: &str) -> Outcome {
        let seat = self.select(question).await;
        let name = seat.specialist.name().to_string();

        let answer = match seat.specialist.answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(specialist = %name, "answer failed: {e}");
                return Outcome {
                    specialist: name,
                    answer: APOLOGY.to_string(),
                    review: None,
                    rewritten: false,
                };
            }
        };

        let mut outcome = Outcome {
            specialist: name,
            answer,
            review: None,
            rewritten: false,
        };

        let Some(reviewer) = &seat.reviewer else {
            return outcome;
        };

        let review = match reviewer.review(question, &outcome.answer).await {
            Ok(review) if review.is_available() => review,
            Ok(_) => return outcome,
            Err(e) => {
                tracing::warn!(specialist = %outcome.specialist, "review failed, keeping answer: {e}");
                return outcome;
            }
        };
        tracing::info!(specialist = %outcome.specialist, score = review.score, "answer reviewed");

        if review.score < self.rewrite_threshold {
            if let Some(rewritten) = self.rewrite(seat, question, &outcome.answer, &review).await {
                outcome.answer = rewritten;
                outcome.rewritten = true;
            }
        }
        outcome.review = Some(review);
        outcome
    }

    async fn select(&self, question: &str) -> &Seat {
        match self.coordinator.route(question).await {
            Ok(reply) => {
                let name = reply.trim();
                match self.seats.get(name) {
                    Some(seat) => {
                        tracing::debug!("routed to {name}");
                        seat
                    }
                    None => {
                        if name != NO_MATCH {
                            tracing::debug!("coordinator picked unknown specialist {name:?}");
                        }
                        &self.general
                    }
                }
            }
            Err(e) => {
                tracing::warn!("routing failed, using general specialist: {e}");
                &self.general
            }
        }
    }

    async fn rewrite(
        &self,
        seat: &Seat,
        question: &str,
        answer: &str,
        review: &ReviewResult,
    ) -> Option<String> {
        let specialist = &seat.specialist;
        let Some(template) = specialist.profile().rewrite_template.as_deref() else {
            tracing::debug!(specialist = specialist.name(), "no rewrite template, keeping answer");
            return None;
        };

        let instruction = render(
            template,
            &[
                ("review", review.critique.as_str()),
                ("question", question),
                ("answer", answer),
            ],
        );
        match specialist.answer(&instruction).await {
            Ok(rewritten) => Some(rewritten),
            Err(e) => {
                tracing::warn!(specialist = specialist.name(), "rewrite failed, keeping answer: {e}");
                None
            }
        }
    }
}
