pub mod github;
pub mod jamai;
