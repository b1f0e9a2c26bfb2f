pub mod pitch;
pub mod split_bar;
