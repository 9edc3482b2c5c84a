pub mod miner;
pub mod progress;
pub mod refine;
pub mod render;
pub mod syntax;
pub mod token;
pub mod tree;
