pub mod cli;
pub mod terminal;
