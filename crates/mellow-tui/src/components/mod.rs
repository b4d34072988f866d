pub mod header;
pub mod help_overlay;
pub mod player_panel;
pub mod recent_panel;
pub mod track_list;
