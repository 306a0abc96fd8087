//! Status surface
//!
//! Turns game events into the single line of text shown above the video,
//! plus the label of the placement button.

use crate::sim::{GameEvent, GamePhase, GameSession, Outcome, PlacementError, PlacementStage};

/// Status line for an event, or `None` when the event should not replace
/// the current message
pub fn status_line(event: &GameEvent) -> Option<String> {
    let line = match event {
        GameEvent::FeedStarted => "Point the camera at the floor and move slowly to find it".into(),
        GameEvent::FeedStopped => "Camera stopped".into(),
        GameEvent::FeedFailed { reason } => format!("Camera failed to start: {}", reason),
        GameEvent::FloorReady => {
            "Floor found. Press \"Prepare placement\", then tap the floor to place the fire".into()
        }
        GameEvent::OrientationUnavailable => {
            "No floor detection on this device; you can still press \"Prepare placement\" and tap the floor".into()
        }
        GameEvent::PlacementArmed { floor_ready: true } => {
            "Tap the floor where the fire should go".into()
        }
        GameEvent::PlacementArmed { floor_ready: false } => {
            "Tap the floor where the fire should go (floor not confirmed yet)".into()
        }
        GameEvent::PlacementRejected(err) => match err {
            PlacementError::TooFarFromIndicator { .. } => {
                "Too far! Tap near the scan marker".into()
            }
            PlacementError::RayMissedGround => "That tap missed the floor, try again".into(),
            PlacementError::NotArmed => return None,
        },
        GameEvent::Placed { .. } => "Drag the wood into the ring and keep it steady".into(),
        GameEvent::Stability { contained: false, .. } => {
            "Drag the wood into the ring and keep it steady".into()
        }
        GameEvent::Stability { contained: true, percent } => format!("Holding steady: {}%", percent),
        GameEvent::Ignited => "The fire is lit!".into(),
        GameEvent::HuntStarted => "Hunt! Shoot the adults, spare the young and the decoys".into(),
        GameEvent::TargetHit { kind, score } => {
            if kind.is_restricted() {
                format!("{} hit, penalty! Score {}", kind.as_str(), score)
            } else {
                format!("Good shot! Score {}", score)
            }
        }
        GameEvent::TargetEscaped { .. } => return None,
        GameEvent::Finished(summary) => match summary.outcome {
            Outcome::Won => format!(
                "You win! Score {} ({} good shots)",
                summary.score, summary.primary_hits
            ),
            Outcome::Lost => format!(
                "You lose. Score {} ({} restricted hits)",
                summary.score, summary.restricted_hits
            ),
        },
        GameEvent::Reset => "Reset. Start the camera to play again".into(),
    };
    Some(line)
}

/// Latest status line from a batch of events
pub fn latest_line<'a>(events: impl IntoIterator<Item = &'a GameEvent>) -> Option<String> {
    events.into_iter().filter_map(status_line).last()
}

/// Text for the placement button in the current session state
pub fn place_button_label(session: &GameSession) -> &'static str {
    match &session.phase {
        GamePhase::Scanning(placement) => match placement.stage {
            PlacementStage::Scanning => "Prepare placement",
            PlacementStage::Ready => "Tap the floor...",
            PlacementStage::Locked => "Placed",
        },
        GamePhase::Idle => "Prepare placement",
        _ => "Placed",
    }
}

/// Whether the placement button should accept clicks
pub fn place_button_enabled(session: &GameSession) -> bool {
    matches!(&session.phase, GamePhase::Scanning(p) if p.stage == PlacementStage::Scanning)
}
