mod common;
mod submission;
mod wizard;
