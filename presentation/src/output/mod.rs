pub mod activity;
pub mod console;
