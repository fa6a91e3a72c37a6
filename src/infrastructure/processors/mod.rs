pub mod scss_processor;

pub use scss_processor::ScssProcessor;
