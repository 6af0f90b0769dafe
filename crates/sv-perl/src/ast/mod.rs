mod dependency;
mod flow;
mod routine;
mod value;

pub use dependency::*;
pub use flow::*;
pub use routine::*;
pub use value::*;
