#[macro_use]
extern crate log;

pub mod codec;
pub mod formula;
pub mod generator;
pub mod parser;
pub mod prelude;
pub mod puzzle;
pub mod render;
pub mod report;
pub mod solver;

#[cfg(test)]
mod tests;
