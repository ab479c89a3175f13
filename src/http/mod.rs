//! HTTP exposition of the sampled health signals

pub mod handlers;
