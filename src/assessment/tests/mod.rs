mod catalog;
mod common;
mod results;
