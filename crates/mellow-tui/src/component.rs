//! Component trait — the interface every UI panel implements.
//!
//! Panels own their view state (selection, scroll, filter text) and render
//! themselves; playback data arrives read-only through `AppState`. They never
//! mutate shared state directly: input handlers return `Vec<Action>` and the
//! App event loop dispatches those to whichever panel (or the player core)
//! they concern. Time-based UI such as toasts and pending-intent hints is
//! driven centrally by the App tick, not per component.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    /// Which component is this?
    fn id(&self) -> ComponentId;

    /// Handle a key event. Returns actions to be dispatched.
    /// Only called when this component has focus (or for global keys).
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// Handle a mouse event. `area` is the rect the component was last
    /// drawn into, for hit-testing.
    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action>;

    /// Receive an action dispatched by the App.
    /// Components can react to actions even when not focused.
    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action>;

    /// Render the component into `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);
}
