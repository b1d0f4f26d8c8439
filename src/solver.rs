mod cbsta;

pub use cbsta::CbsTa;

use crate::common::Solution;

pub trait Solver {
    fn solve(&mut self) -> Option<Solution>;
}
