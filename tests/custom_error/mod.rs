use std::error::Error;

/// A producer failure used to exercise the error channel in tests.
#[derive(Debug)]
pub struct BrokenProducer(pub &'static str);

impl std::fmt::Display for BrokenProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "producer failed: {}", self.0)
    }
}

impl Error for BrokenProducer {}
