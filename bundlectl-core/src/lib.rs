//! bundlectl core library exports

pub mod catalog;
