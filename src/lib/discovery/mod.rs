pub mod filters;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod run_tool;
pub mod search_index;
pub mod session;
pub mod tutor_getter;
