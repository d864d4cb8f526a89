pub mod code_host;
pub mod generation;

pub use code_host::CodeHostService;
pub use generation::{GenerationService, ResponseStream};
