//! Headless presentation layer.

use std::collections::VecDeque;
use tracing::debug;

use super::{GameSpeed, Presentation, SoundChannel};
use crate::mission::Continuation;

/// Something a mission asked the presentation layer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationRequest {
    Video(String),
    Sound(SoundChannel, String),
    Message(String),
    Pause,
    Resume,
    Speed(GameSpeed),
    GameOver,
    Win,
}

/// Records every request and queues the continuations of asynchronous ones
/// until the host declares playback finished.
#[derive(Debug, Default)]
pub struct ScriptedPresentation {
    requests: Vec<PresentationRequest>,
    pending: VecDeque<Continuation>,
    paused: bool,
    speed: GameSpeed,
    game_over: bool,
    won: bool,
}

impl ScriptedPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the oldest outstanding playback.
    pub fn complete_next(&mut self) -> Option<Continuation> {
        self.pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn requests(&self) -> &[PresentationRequest] {
        &self.requests
    }

    pub fn videos(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                PresentationRequest::Video(v) => Some(v.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                PresentationRequest::Message(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    fn enqueue(&mut self, then: Option<Continuation>) {
        if let Some(continuation) = then {
            self.pending.push_back(continuation);
        }
    }
}

impl Presentation for ScriptedPresentation {
    fn play_video(&mut self, video: &str, then: Option<Continuation>) {
        debug!(video, "play_video");
        self.requests.push(PresentationRequest::Video(video.to_string()));
        self.enqueue(then);
    }

    fn play_sound(&mut self, channel: SoundChannel, sound: &str, then: Option<Continuation>) {
        self.requests
            .push(PresentationRequest::Sound(channel, sound.to_string()));
        self.enqueue(then);
    }

    fn force_message(&mut self, message: &str, then: Option<Continuation>) {
        debug!(message, "force_message");
        self.requests
            .push(PresentationRequest::Message(message.to_string()));
        self.enqueue(then);
    }

    fn pause(&mut self) {
        self.paused = true;
        self.requests.push(PresentationRequest::Pause);
    }

    fn resume(&mut self) {
        self.paused = false;
        self.requests.push(PresentationRequest::Resume);
    }

    fn speed(&self) -> GameSpeed {
        self.speed
    }

    fn set_speed(&mut self, speed: GameSpeed) {
        self.speed = speed;
        self.requests.push(PresentationRequest::Speed(speed));
    }

    fn game_over(&mut self) {
        self.game_over = true;
        self.requests.push(PresentationRequest::GameOver);
    }

    fn win(&mut self) {
        self.won = true;
        self.requests.push(PresentationRequest::Win);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::Resume;

    fn continuation(message: &str) -> Continuation {
        Continuation {
            mission: "Test".to_string(),
            resume: Resume::Reveal {
                message: message.to_string(),
            },
            after: None,
        }
    }

    #[test]
    fn test_continuations_complete_in_order() {
        let mut presentation = ScriptedPresentation::new();
        presentation.force_message("A", Some(continuation("A")));
        presentation.play_video("intro", None);
        presentation.force_message("B", Some(continuation("B")));

        assert_eq!(presentation.pending(), 2);
        assert_eq!(presentation.complete_next(), Some(continuation("A")));
        assert_eq!(presentation.complete_next(), Some(continuation("B")));
        assert_eq!(presentation.complete_next(), None);
        assert_eq!(presentation.messages(), vec!["A", "B"]);
        assert_eq!(presentation.videos(), vec!["intro"]);
    }

    #[test]
    fn test_flags() {
        let mut presentation = ScriptedPresentation::new();
        presentation.pause();
        presentation.set_speed(GameSpeed::Fast);
        assert!(presentation.is_paused());
        assert_eq!(presentation.speed(), GameSpeed::Fast);

        presentation.resume();
        presentation.game_over();
        assert!(!presentation.is_paused());
        assert!(presentation.is_game_over());
        assert!(!presentation.has_won());
    }
}
