#![allow(dead_code)]

pub mod history;
pub mod salescast_env;
