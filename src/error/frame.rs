use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum FrameError {
    IllegalFin,

    NotEnoughData,

    UnsupportedLength,
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use FrameError::*;
        match self {
            IllegalFin => write!(f, "Illegal fin or reserved bits"),
            NotEnoughData => write!(f, "Not enough data to parse"),
            UnsupportedLength => write!(f, "Payload length not supported"),
        }
    }
}

// use default impl
impl std::error::Error for FrameError {}
