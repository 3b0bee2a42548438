pub mod history_panel;
pub mod progress_bar;
pub mod question_panel;
pub mod stats_sidebar;
