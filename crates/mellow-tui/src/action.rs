//! Action enum — all user-initiated intents and internal events.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    SleepingList,
    FocusList,
    RecentPanel,
    PlayerPanel,
    HelpOverlay,
}

/// Which page is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Sleeping,
    Focus,
    Player,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Sleeping => "Sleep",
            Page::Focus => "Focus",
            Page::Player => "Player",
        }
    }
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play(String), // play track by id
    TogglePause,
    Next,
    Prev,
    ToggleShuffle,
    ToggleRepeat,
    Volume(f32),
    SeekFraction(f64),
    Mute, // toggle mute (save/restore volume)

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Filter/search ────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,

    // ── Pages ────────────────────────────────────────────────────────────────
    SwitchPage(Page),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
}
