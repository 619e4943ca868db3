//! Model catalog and call parameters.

mod call_parameters;
mod model_engine;

pub use call_parameters::CallParameters;
pub use model_engine::ModelEngine;
