pub mod audit;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use seeds::{resolve_seed_inputs, split_csv};
pub use tester::*;
