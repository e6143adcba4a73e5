//! Session driver
//!
//! Runs a controller on a cooperative event loop: host callbacks and user
//! commands arrive over one channel, and a one-second interval feeds
//! [`PlaybackController::tick`]. Everything happens on the awaiting task,
//! so the controller and its sinks never need to be `Send`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::models::{AudioSelection, ResolutionChoice};
use crate::player::controller::PlaybackController;
use crate::player::state::PlayerError;
use crate::stream::sink::SinkEvent;

/// User actions, as issued by the player UI
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    Play,
    Pause,
    Seek(f64),
    Skip(f64),
    SetRate(f32),
    SetVolume(f32),
    ToggleMute,
    SetResolution(ResolutionChoice),
    SelectEmbed(usize),
    NextEmbed,
    SetSubtitle(Option<String>),
    SetAudioTrack(AudioSelection),
    SetEpisode { season: u32, episode: u32 },
}

/// Everything the driver loop consumes
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Event(SinkEvent),
    Command(PlayerCommand),
    /// Watch view unmounted
    Close,
}

impl From<SinkEvent> for SessionInput {
    fn from(event: SinkEvent) -> Self {
        SessionInput::Event(event)
    }
}

impl From<PlayerCommand> for SessionInput {
    fn from(command: PlayerCommand) -> Self {
        SessionInput::Command(command)
    }
}

/// Sender half handed to the host
pub type SessionHandle = mpsc::UnboundedSender<SessionInput>;

/// Create the input channel for [`run_session`]
pub fn session_channel() -> (SessionHandle, mpsc::UnboundedReceiver<SessionInput>) {
    mpsc::unbounded_channel()
}

impl PlaybackController {
    /// Apply one user command
    pub fn apply(&mut self, command: PlayerCommand, now: std::time::Instant) -> Result<(), PlayerError> {
        match command {
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::Play => self.play(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Seek(target) => self.seek(target)?,
            PlayerCommand::Skip(delta) => self.skip(delta)?,
            PlayerCommand::SetRate(rate) => self.set_rate(rate)?,
            PlayerCommand::SetVolume(volume) => self.set_volume(volume),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::SetResolution(choice) => self.set_resolution(choice, now)?,
            PlayerCommand::SelectEmbed(index) => self.select_embed(index, now)?,
            PlayerCommand::NextEmbed => self.next_embed(now)?,
            PlayerCommand::SetSubtitle(lang) => self.set_subtitle(lang.as_deref())?,
            PlayerCommand::SetAudioTrack(selection) => self.set_audio_track(selection)?,
            PlayerCommand::SetEpisode { season, episode } => self.set_episode(season, episode, now),
        }
        Ok(())
    }
}

/// Open the controller and run it until `Close` arrives or every sender drops.
///
/// Command errors are logged and the loop keeps going; the controller is
/// closed on exit.
pub async fn run_session(
    controller: &mut PlaybackController,
    mut inputs: mpsc::UnboundedReceiver<SessionInput>,
) {
    controller.open(Instant::now().into_std());

    let mut ticker = time::interval_at(Instant::now() + Duration::from_secs(1), Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => controller.tick(Instant::now().into_std()),
            input = inputs.recv() => match input {
                Some(SessionInput::Event(event)) => controller.handle_event(event),
                Some(SessionInput::Command(command)) => {
                    if let Err(e) = controller.apply(command, Instant::now().into_std()) {
                        tracing::warn!(session = %controller.session_id(), error = %e, "command rejected");
                    }
                }
                Some(SessionInput::Close) | None => break,
            },
        }
    }

    controller.close();
}
