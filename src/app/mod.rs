pub mod consumer;
pub mod context;
pub mod handler;
pub mod publish;
pub mod summarize;

#[cfg(test)]
mod test_support;
