//! Completion callback state machine
//!
//! Every media source reports exactly once. The report moves the attempt
//! from active to one of the terminal states below; what happens next is up
//! to the transport controller.

use crate::session::Session;
use chaptercast_core::{MediaError, PlaybackOutcome};

/// Terminal state of one playback attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The report belongs to a source that is no longer the active one
    Stale,
    /// The source failed; no auto-advance
    Errored(MediaError),
    /// A deliberate stop; the manual-stop flag has been consumed
    EndedManual,
    /// Ended while paused, usually because the voice link dropped. The
    /// session stays paused so resume can re-play from the frozen position.
    Interrupted,
    /// Reached the end of the chapter
    EndedNatural,
}

/// Applies a completion report for `generation` to `session`
pub fn classify(session: &mut Session, generation: u64, outcome: PlaybackOutcome) -> Completion {
    if !session.finish_generation(generation) {
        return Completion::Stale;
    }

    // A source killed on request may report the stop as a failure.
    if session.manual_stop_requested() {
        session.set_manual_stop(false);
        if let PlaybackOutcome::Failed(error) = &outcome {
            log::debug!("{}: stopped source reported: {}", session.room(), error);
        }
        return Completion::EndedManual;
    }

    match outcome {
        PlaybackOutcome::Failed(error) => {
            session.mark_not_playing();
            Completion::Errored(error)
        }
        PlaybackOutcome::Ended if session.is_paused() => Completion::Interrupted,
        PlaybackOutcome::Ended => {
            session.mark_not_playing();
            Completion::EndedNatural
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaptercast_core::RoomId;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::time::Instant;

    fn active() -> (Session, u64) {
        let now = Instant::now();
        let mut session = Session::new(RoomId::new(7), now);
        let generation = session.begin_attempt(
            PathBuf::from("/lib/a/1.m4b"),
            Duration::ZERO,
            Duration::from_secs(60),
            now,
        );
        (session, generation)
    }

    #[test]
    fn test_natural_end() {
        let (mut session, generation) = active();
        assert_eq!(
            classify(&mut session, generation, PlaybackOutcome::Ended),
            Completion::EndedNatural
        );
        assert!(!session.is_playing());
        assert!(!session.has_active_source());
    }

    #[test]
    fn test_manual_end_consumes_flag() {
        let (mut session, generation) = active();
        session.set_manual_stop(true);

        assert_eq!(
            classify(&mut session, generation, PlaybackOutcome::Ended),
            Completion::EndedManual
        );
        assert!(!session.manual_stop_requested());
        assert!(session.is_playing(), "the stopper decides what happens next");
    }

    #[test]
    fn test_failure_after_manual_stop_is_manual_end() {
        let (mut session, generation) = active();
        session.set_manual_stop(true);
        let outcome = PlaybackOutcome::Failed(MediaError::Stream("killed".into()));

        assert_eq!(
            classify(&mut session, generation, outcome),
            Completion::EndedManual
        );
        assert!(!session.manual_stop_requested());
    }

    #[test]
    fn test_error_end() {
        let (mut session, generation) = active();
        let outcome = PlaybackOutcome::Failed(MediaError::Decode("bad frame".into()));

        assert!(matches!(
            classify(&mut session, generation, outcome),
            Completion::Errored(MediaError::Decode(_))
        ));
        assert!(!session.is_playing());
    }

    #[test]
    fn test_end_while_paused_is_interrupted() {
        let (mut session, generation) = active();
        session.mark_paused(Instant::now());

        assert_eq!(
            classify(&mut session, generation, PlaybackOutcome::Ended),
            Completion::Interrupted
        );
        assert!(session.is_playing());
        assert!(session.is_paused());
    }

    #[test]
    fn test_stale_report_changes_nothing() {
        let (mut session, old) = active();
        let now = Instant::now();
        session.set_manual_stop(true);
        session.begin_attempt(PathBuf::from("/lib/a/2.m4b"), Duration::ZERO, Duration::from_secs(60), now);
        session.set_manual_stop(true);

        assert_eq!(
            classify(&mut session, old, PlaybackOutcome::Ended),
            Completion::Stale
        );
        assert!(session.manual_stop_requested());
        assert!(session.has_active_source());
    }

    #[test]
    fn test_second_report_is_stale() {
        let (mut session, generation) = active();
        classify(&mut session, generation, PlaybackOutcome::Ended);
        assert_eq!(
            classify(&mut session, generation, PlaybackOutcome::Ended),
            Completion::Stale
        );
    }
}
