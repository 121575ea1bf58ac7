//! Use cases: the access gate, the input/capture pipelines, the resource
//! sampler, and the stream hub.  Everything OS- or network-facing is reached
//! through the traits these modules declare.

pub mod capture_pipeline;
pub mod gate;
pub mod hub;
pub mod input_pipeline;
pub mod sampler;
