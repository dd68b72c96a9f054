pub mod producer;

pub use producer::FeedbackEventProducer;
