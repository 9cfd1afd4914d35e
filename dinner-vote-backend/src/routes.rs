pub mod api;
pub mod index;
pub mod options;
pub mod reset;
pub mod vote;
