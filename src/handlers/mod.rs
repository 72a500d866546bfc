pub mod completions;
pub mod habits;
pub mod health;
pub mod moods;
