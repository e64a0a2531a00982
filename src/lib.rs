pub mod cli;
pub mod commands;
pub mod inference;
pub mod pedigree;
pub mod utils;
pub mod writers;
