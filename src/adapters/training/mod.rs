//! Training Example Adapters
//!
//! - `InMemoryTrainingExamples` - Examples per intent in memory

mod in_memory_training_examples;

pub use in_memory_training_examples::InMemoryTrainingExamples;
