pub mod cli;
pub mod config;
pub mod mturk;
pub mod paginate;
pub mod survey;
pub mod youtube;
