mod common;
mod redirect;
