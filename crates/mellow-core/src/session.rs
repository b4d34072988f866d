use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Genre, Track};

/// Commands accepted by the player core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    SelectTrack { id: String },
    TogglePlayback,
    Next,
    Prev,
    SetShuffle { on: bool },
    SetRepeat { on: bool },
    /// Seek to a fraction of the track duration (0.0..=1.0).
    Seek { fraction: f64 },
    Volume { value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Detailed playback status — reflects actual mpv state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing loaded
    Loading, // loadfile sent, mpv opening the file
    Playing, // core-idle=false, audio flowing
    Paused,  // explicitly paused
    Error,   // failed to play (timeout or mpv error)
}

/// What to do when the current track reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndedAction {
    /// Repeat is on: reload the same track from the start.
    Restart,
    /// Move on to the next track in the playlist.
    Advance,
}

/// Playback session state.  `rev` is a monotonically increasing counter
/// incremented on every change so observers can detect missed updates.
/// Never persisted — a fresh session always starts idle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionState {
    pub rev: u64,
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub current_genre: Option<Genre>,
    pub playback_status: PlaybackStatus,
    /// True only while mpv reports audio flowing.
    pub is_playing: bool,
    pub shuffle: bool,
    pub repeat: bool,
    pub volume: f32,
    pub time_pos_secs: Option<f64>,
    pub duration_secs: Option<f64>,
}

impl SessionState {
    pub fn new(volume: f32) -> Self {
        Self {
            rev: 1,
            volume: volume.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    fn touch(&mut self) {
        self.rev += 1;
    }

    /// Single entry point for changing what plays.  Repositions the session
    /// on `track` and resets the timeline; the caller issues the actual load.
    pub fn select(&mut self, catalog: &Catalog, track: Track) {
        self.current_index = catalog.position(track.genre, &track.id);
        self.current_genre = Some(track.genre);
        self.current_track = Some(track);
        self.playback_status = PlaybackStatus::Loading;
        self.time_pos_secs = None;
        self.duration_secs = None;
        self.touch();
    }

    /// Pick the track `advance` would move to, without mutating anything.
    /// None when there is no current genre or the playlist is empty.
    pub fn advance_target(&self, catalog: &Catalog, direction: Direction) -> Option<Track> {
        self.advance_target_with(catalog, direction, &mut rand::thread_rng())
    }

    pub fn advance_target_with<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        direction: Direction,
        rng: &mut R,
    ) -> Option<Track> {
        let genre = self.current_genre?;
        let tracks = catalog.tracks(genre);
        if tracks.is_empty() {
            return None;
        }

        let target = if self.shuffle {
            // Uniform over the whole playlist; may land on the current track.
            rng.gen_range(0..tracks.len())
        } else {
            let current = self.current_index.unwrap_or(0);
            match direction {
                Direction::Next => (current + 1) % tracks.len(),
                Direction::Previous => {
                    if current == 0 {
                        tracks.len() - 1
                    } else {
                        current - 1
                    }
                }
            }
        };
        Some(tracks[target].clone())
    }

    /// Decide the end-of-track follow-up.
    pub fn ended_action(&self) -> EndedAction {
        if self.repeat && self.current_track.is_some() {
            EndedAction::Restart
        } else {
            EndedAction::Advance
        }
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.shuffle = on;
        self.touch();
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.repeat = on;
        self.touch();
    }

    pub fn set_volume(&mut self, value: f32) {
        self.volume = value.clamp(0.0, 1.0);
        self.touch();
    }

    /// Absolute seek position for a duration fraction.  None while the
    /// duration is still unknown (seek is then a no-op).
    pub fn seek_position(&self, fraction: f64) -> Option<f64> {
        let duration = self.duration_secs?;
        Some(fraction.clamp(0.0, 1.0) * duration)
    }

    /// Apply an observed mpv pause/core-idle combination.  mpv property
    /// notifications are the only thing that moves Playing/Paused.
    pub fn set_observed_playback(&mut self, paused: bool, core_idle: bool) {
        if self.current_track.is_none() {
            return;
        }
        if paused {
            self.playback_status = PlaybackStatus::Paused;
            self.is_playing = false;
        } else if !core_idle {
            self.playback_status = PlaybackStatus::Playing;
            self.is_playing = true;
        } else if self.playback_status == PlaybackStatus::Playing {
            // Not paused but no audio flowing: back to buffering.
            self.playback_status = PlaybackStatus::Loading;
            self.is_playing = false;
        }
        self.touch();
    }

    pub fn set_timeline(&mut self, time_pos_secs: Option<f64>, duration_secs: Option<f64>) {
        self.time_pos_secs = time_pos_secs;
        self.duration_secs = duration_secs;
        self.touch();
    }

    pub fn mark_error(&mut self) {
        self.playback_status = PlaybackStatus::Error;
        self.is_playing = false;
        self.touch();
    }

    pub fn mark_idle(&mut self) {
        self.playback_status = PlaybackStatus::Idle;
        self.is_playing = false;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog(n: usize) -> Catalog {
        let tracks = (0..n)
            .map(|i| Track {
                id: format!("t{}", i),
                name: format!("Track {}", i),
                file: format!("t{}.mp3", i),
                genre: Genre::Sleeping,
            })
            .collect();
        Catalog::from_tracks(tracks)
    }

    fn select_idx(state: &mut SessionState, cat: &Catalog, idx: usize) {
        let track = cat.tracks(Genre::Sleeping)[idx].clone();
        state.select(cat, track);
    }

    #[test]
    fn test_select_sets_genre_and_index() {
        let cat = catalog(5);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 3);
        assert_eq!(state.current_genre, Some(Genre::Sleeping));
        assert_eq!(state.current_index, Some(3));
        assert_eq!(state.playback_status, PlaybackStatus::Loading);
        let id = state.current_track.as_ref().map(|t| t.id.clone());
        assert_eq!(
            cat.tracks(Genre::Sleeping)[3].id,
            id.expect("track selected")
        );
    }

    #[test]
    fn test_next_cycles_whole_playlist() {
        let cat = catalog(5);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 0);

        let mut visited = Vec::new();
        for _ in 0..5 {
            let next = state.advance_target(&cat, Direction::Next).expect("target");
            visited.push(next.id.clone());
            state.select(&cat, next);
        }
        assert_eq!(visited, ["t1", "t2", "t3", "t4", "t0"]);
    }

    #[test]
    fn test_prev_inverts_next() {
        let cat = catalog(7);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 2);

        let next = state.advance_target(&cat, Direction::Next).expect("next");
        state.select(&cat, next);
        let back = state
            .advance_target(&cat, Direction::Previous)
            .expect("prev");
        assert_eq!(back.id, "t2");
    }

    #[test]
    fn test_prev_wraps_from_zero() {
        let cat = catalog(10);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 0);

        let mut visited = Vec::new();
        for _ in 0..9 {
            let prev = state
                .advance_target(&cat, Direction::Previous)
                .expect("target");
            visited.push(prev.id.clone());
            state.select(&cat, prev);
        }
        let expected: Vec<String> = (1..=9).rev().map(|i| format!("t{}", i)).collect();
        assert_eq!(visited, expected);

        // And forward from the last index wraps back to 0.
        select_idx(&mut state, &cat, 9);
        let next = state.advance_target(&cat, Direction::Next).expect("next");
        assert_eq!(next.id, "t0");
    }

    #[test]
    fn test_shuffle_target_stays_in_playlist() {
        let cat = catalog(4);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 1);
        state.set_shuffle(true);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let t = state
                .advance_target_with(&cat, Direction::Next, &mut rng)
                .expect("target");
            assert!(cat.position(Genre::Sleeping, &t.id).is_some());
        }
    }

    #[test]
    fn test_advance_noop_without_genre_or_tracks() {
        let cat = catalog(3);
        let state = SessionState::new(0.7);
        assert!(state.advance_target(&cat, Direction::Next).is_none());

        let empty = Catalog::default();
        let mut state = SessionState::new(0.7);
        state.current_genre = Some(Genre::Focus);
        assert!(state.advance_target(&empty, Direction::Next).is_none());
    }

    #[test]
    fn test_volume_clamps() {
        let mut state = SessionState::new(0.7);
        state.set_volume(1.5);
        assert_eq!(state.volume, 1.0);
        state.set_volume(-0.2);
        assert_eq!(state.volume, 0.0);
    }

    #[test]
    fn test_seek_requires_duration() {
        let mut state = SessionState::new(0.7);
        assert!(state.seek_position(0.5).is_none());
        state.set_timeline(Some(10.0), Some(200.0));
        assert_eq!(state.seek_position(0.5), Some(100.0));
        assert_eq!(state.seek_position(2.0), Some(200.0));
    }

    #[test]
    fn test_repeat_restarts_current() {
        let cat = catalog(3);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 1);
        state.set_repeat(true);
        assert_eq!(state.ended_action(), EndedAction::Restart);
        assert_eq!(state.current_index, Some(1));

        state.set_repeat(false);
        assert_eq!(state.ended_action(), EndedAction::Advance);
    }

    #[test]
    fn test_observed_playback_drives_status() {
        let cat = catalog(2);
        let mut state = SessionState::new(0.7);
        select_idx(&mut state, &cat, 0);

        state.set_observed_playback(false, false);
        assert_eq!(state.playback_status, PlaybackStatus::Playing);
        assert!(state.is_playing);

        state.set_observed_playback(true, true);
        assert_eq!(state.playback_status, PlaybackStatus::Paused);
        assert!(!state.is_playing);
    }

    #[test]
    fn test_observed_playback_ignored_when_idle() {
        let mut state = SessionState::new(0.7);
        state.set_observed_playback(false, false);
        assert_eq!(state.playback_status, PlaybackStatus::Idle);
        assert!(!state.is_playing);
    }
}
