use crate::ieee80211::frame::FrameType;
use crate::ieee80211::mac::attributes::MacAttribute;
use crate::ieee80211::phy::PhyStandard;
use crate::ieee80211::{AccessCategory, Mac48Address};
use crate::parse_serialize::SerializeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("a queue is already registered for {0}")]
    DuplicateQueue(AccessCategory),
    #[error("no queue registered for {0}")]
    MissingQueue(AccessCategory),
    #[error("unsupported phy standard {0:?}")]
    UnsupportedStandard(PhyStandard),
    #[error("unsupported block ack action {0}")]
    UnsupportedBlockAckAction(u8),
    #[error("unsupported action category {0}")]
    UnsupportedActionCategory(u8),
    #[error("action frame received while qos is not supported")]
    ActionWithoutQos,
    #[error("don't know how to handle frame (type={0:?})")]
    UnhandledFrame(FrameType),
    #[error("cannot send frames on behalf of {0}")]
    SendFromUnsupported(Mac48Address),
    #[error("malformed frame: {0}")]
    Malformed(#[from] SerializeError),
    #[error("invalid value for attribute {0:?}")]
    InvalidParameter(MacAttribute),
    #[error("attribute {0:?} is read only")]
    ReadOnly(MacAttribute),
    #[error("attribute {0:?} is write only")]
    WriteOnly(MacAttribute),
    #[error("station halted after a fatal error")]
    Halted,
}

impl Error {
    /**
     * Fatal errors indicate a broken invariant or a protocol violation by the peer. Once one
     * is returned the station stops processing.
     */
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::InvalidParameter(_) | Error::ReadOnly(_) | Error::WriteOnly(_) => false,
            _ => true,
        }
    }
}
