pub mod application;
pub mod attachments;
pub mod signature;
pub mod token;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;
