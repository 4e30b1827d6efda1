//! Round state machine.
//!
//! `Idle → Prompt → Drawing → Evaluating → Result`, then back to `Prompt`
//! via a fresh [`Session`] on play-again. The controller owns the surface,
//! the normalizer, the recognizer and the word source, and is the only
//! writer of session state; the presentation layer drives it through the
//! imperative entry points and renders from the drained event stream.

use std::collections::VecDeque;
use std::time::Instant;

use kurbo::Point;

use crate::{
    config::GameSettings,
    error::{DuudlError, DuudlResult},
    geom::DisplayMetrics,
    normalize::{NormalizedImage, Normalizer},
    raster::Raster,
    recognize::{PredictionSet, Recognizer},
    score::{MatchScorer, Verdict},
    surface::StrokeSurface,
    words::{Difficulty, StaticWordList, WordPrompt, WordSource},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Prompt,
    Drawing,
    Evaluating,
    Result,
}

/// Identity of one round. Tickets carry it so results arriving after a
/// reset can be recognized as stale and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct SessionId(u64);

/// One round of play. Created fresh per round and discarded at the end;
/// never reset in place.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub word: WordPrompt,
    pub phase: Phase,
    pub remaining_secs: u64,
    pub started_at: Option<Instant>,
}

/// What the `Result` phase shows: a verdict, or the error that kept one
/// from being computed.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundOutcome {
    Scored(Verdict),
    Failed { message: String, recoverable: bool },
}

/// Reactive feed for the presentation layer.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    WordAssigned(WordPrompt),
    /// A complete frame was exported (stroke closed, canvas cleared or
    /// resized). Carries the snapshot so renderers never touch the live
    /// buffer.
    ImageUpdated(Raster),
    Tick { remaining_secs: u64 },
}

/// Authorization for exactly one classification, minted by the
/// `Drawing → Evaluating` transition. Feeding its result back through
/// [`SessionController::finish_evaluation`] is a no-op if the owning
/// session has since been discarded.
#[derive(Debug)]
pub struct EvaluationTicket {
    session_id: SessionId,
    image: NormalizedImage,
}

impl EvaluationTicket {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn image(&self) -> &NormalizedImage {
        &self.image
    }
}

pub struct SessionController {
    settings: GameSettings,
    normalizer: Normalizer,
    surface: StrokeSurface,
    recognizer: Box<dyn Recognizer>,
    words: Box<dyn WordSource>,
    fallback_words: StaticWordList,
    session: Option<Session>,
    outcome: Option<RoundOutcome>,
    next_session_id: u64,
    last_emitted_revision: u64,
    events: VecDeque<SessionEvent>,
}

impl SessionController {
    pub fn new(
        settings: GameSettings,
        surface: StrokeSurface,
        recognizer: Box<dyn Recognizer>,
        words: Box<dyn WordSource>,
    ) -> DuudlResult<Self> {
        settings.validate()?;
        let normalizer = Normalizer::new(settings.model_input_size)?;
        Ok(Self {
            settings,
            normalizer,
            surface,
            recognizer,
            words,
            fallback_words: StaticWordList::default(),
            session: None,
            outcome: None,
            next_session_id: 0,
            last_emitted_revision: 0,
            events: VecDeque::new(),
        })
    }

    // ── Observers ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn word(&self) -> Option<&WordPrompt> {
        self.session.as_ref().map(|s| &s.word)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.remaining_secs)
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    /// Drain pending events, oldest first.
    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.events.pop_front()
    }

    // ── Round lifecycle ─────────────────────────────────────────

    /// Fetch a word and open the `Prompt` phase.
    ///
    /// Word-source failure is absorbed by the built-in list; it never
    /// blocks the round. Errors only if a round is already live.
    #[tracing::instrument(skip(self))]
    pub async fn new_round(&mut self, difficulty: Difficulty) -> DuudlResult<()> {
        if !matches!(self.phase(), Phase::Idle | Phase::Result) {
            return Err(DuudlError::validation(
                "a round is already live; finish it or play_again()",
            ));
        }

        let word = match self.words.get_word(difficulty).await {
            Ok(word) => word,
            Err(err) => {
                tracing::warn!(%err, "word fetch failed, using static list");
                self.fallback_words.pick(difficulty)
            }
        };

        self.next_session_id += 1;
        self.session = Some(Session {
            id: SessionId(self.next_session_id),
            word: word.clone(),
            phase: Phase::Prompt,
            remaining_secs: self.settings.round_secs,
            started_at: None,
        });
        self.outcome = None;
        self.surface.set_enabled(false);
        self.surface.clear();

        self.events.push_back(SessionEvent::WordAssigned(word));
        self.events.push_back(SessionEvent::PhaseChanged(Phase::Prompt));
        self.sync_snapshot();
        Ok(())
    }

    /// `Prompt → Drawing`: enable the surface and start the countdown.
    /// Returns false (and does nothing) from any other phase.
    pub fn start_drawing(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.phase != Phase::Prompt {
            return false;
        }
        session.phase = Phase::Drawing;
        session.remaining_secs = self.settings.round_secs;
        session.started_at = Some(Instant::now());
        self.surface.set_enabled(true);
        self.events.push_back(SessionEvent::PhaseChanged(Phase::Drawing));
        true
    }

    /// Advance the countdown by one second. On reaching zero this requests
    /// the evaluation transition exactly like [`check_drawing`] does; the
    /// shared phase guard makes the two triggers race-free.
    ///
    /// [`check_drawing`]: Self::check_drawing
    pub fn tick(&mut self) -> Option<EvaluationTicket> {
        let session = self.session.as_mut()?;
        if session.phase != Phase::Drawing {
            return None;
        }
        session.remaining_secs = session.remaining_secs.saturating_sub(1);
        self.events.push_back(SessionEvent::Tick {
            remaining_secs: session.remaining_secs,
        });
        if session.remaining_secs == 0 {
            self.begin_evaluation()
        } else {
            None
        }
    }

    /// Player-initiated evaluation request.
    pub fn check_drawing(&mut self) -> Option<EvaluationTicket> {
        self.begin_evaluation()
    }

    /// `Drawing → Evaluating`, at most once per session.
    ///
    /// Both the countdown and the explicit check funnel through here; the
    /// phase test is the idempotent transition guard, so near-simultaneous
    /// triggers mint a single ticket.
    fn begin_evaluation(&mut self) -> Option<EvaluationTicket> {
        if self.phase() != Phase::Drawing {
            return None;
        }
        self.surface.set_enabled(false);
        self.surface.end_stroke();
        self.sync_snapshot();

        let session = self.session.as_mut().expect("phase checked above");
        session.phase = Phase::Evaluating;
        let session_id = session.id;
        self.events
            .push_back(SessionEvent::PhaseChanged(Phase::Evaluating));

        let snapshot = self.surface.export_snapshot();
        match self.normalizer.normalize(&snapshot) {
            Ok(image) => Some(EvaluationTicket { session_id, image }),
            Err(err) => {
                // Contract violation, not a backend hiccup; land in Result
                // so the player is never stuck.
                self.fail_round(&err);
                None
            }
        }
    }

    /// Abort the round with an error-flavored outcome and land in
    /// `Result` so the presentation layer always has something to show.
    fn fail_round(&mut self, err: &DuudlError) {
        self.outcome = Some(RoundOutcome::Failed {
            message: err.to_string(),
            recoverable: err.is_recoverable(),
        });
        if let Some(session) = self.session.as_mut() {
            session.phase = Phase::Result;
        }
        self.events.push_back(SessionEvent::PhaseChanged(Phase::Result));
    }

    /// Deliver a classification result for a minted ticket.
    ///
    /// Stale results — the session was discarded, or the round already
    /// resolved — are ignored, never applied to the new session.
    pub fn finish_evaluation(
        &mut self,
        session_id: SessionId,
        result: DuudlResult<PredictionSet>,
    ) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(?session_id, "dropping stale result: no live session");
            return;
        };
        if session.id != session_id || session.phase != Phase::Evaluating {
            tracing::debug!(?session_id, current = ?session.id, "dropping stale result");
            return;
        }

        match result {
            Ok(predictions) => {
                let verdict = MatchScorer::score(
                    &predictions,
                    &session.word.prompt,
                    self.settings.match_threshold,
                );
                self.outcome = Some(RoundOutcome::Scored(verdict));
            }
            Err(err) => {
                tracing::warn!(%err, "classification failed");
                self.outcome = Some(RoundOutcome::Failed {
                    message: err.to_string(),
                    recoverable: err.is_recoverable(),
                });
            }
        }
        session.phase = Phase::Result;
        self.events.push_back(SessionEvent::PhaseChanged(Phase::Result));
    }

    /// Classify a minted ticket with the configured recognizer and feed
    /// the result back. One outbound request, no internal retry.
    pub async fn run_evaluation(&mut self, ticket: EvaluationTicket) {
        let result = self.recognizer.classify(&ticket.image).await;
        self.finish_evaluation(ticket.session_id, result);
    }

    /// Request evaluation and drive it to completion in one call.
    pub async fn evaluate(&mut self) {
        if let Some(ticket) = self.begin_evaluation() {
            self.run_evaluation(ticket).await;
        }
    }

    /// Discard the current session and start a fresh round. Any
    /// in-flight evaluation of the old session becomes stale.
    pub async fn play_again(&mut self, difficulty: Difficulty) -> DuudlResult<()> {
        self.session = None;
        self.outcome = None;
        self.new_round(difficulty).await
    }

    // ── Input forwarding ────────────────────────────────────────

    pub fn pointer_down(&mut self, css: Point) {
        self.surface.begin_stroke(css);
    }

    pub fn pointer_move(&mut self, css: Point) {
        self.surface.extend_stroke(css);
    }

    pub fn pointer_up(&mut self) {
        self.surface.end_stroke();
        self.sync_snapshot();
    }

    /// Wipe the canvas. Only meaningful while drawing.
    pub fn clear_canvas(&mut self) {
        if self.phase() != Phase::Drawing {
            return;
        }
        self.surface.clear();
        self.sync_snapshot();
    }

    /// Display geometry changed; the drawing is re-rendered at the new
    /// scale, never blanked.
    pub fn resize_surface(&mut self, metrics: DisplayMetrics) -> DuudlResult<()> {
        self.surface.resize(metrics)?;
        self.sync_snapshot();
        Ok(())
    }

    fn sync_snapshot(&mut self) {
        let revision = self.surface.revision();
        if revision != self.last_emitted_revision {
            self.last_emitted_revision = revision;
            self.events
                .push_back(SessionEvent::ImageUpdated(self.surface.export_snapshot()));
        }
    }
}
