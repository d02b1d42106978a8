pub mod history_list;
pub mod player_panel;
pub mod queue_list;
pub mod results;
pub mod search_bar;
