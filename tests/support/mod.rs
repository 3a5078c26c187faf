#![allow(dead_code)]

pub mod audio;
pub mod surface;
