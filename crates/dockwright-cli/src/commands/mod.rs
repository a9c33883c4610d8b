mod build;
mod pipeline;

pub use build::build;
