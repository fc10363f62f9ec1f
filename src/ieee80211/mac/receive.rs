use crate::ieee80211::action::{ActionFrame, AddBaRequest, AddBaResponse, BlockAckFrame, DelBa};
use crate::ieee80211::amsdu;
use crate::ieee80211::frame::MacHeader;
use crate::ieee80211::services::error::{Error, Result};
use crate::ieee80211::Mac48Address;
use crate::parse_serialize::Deserialize;
use bytes::Bytes;
use log::trace;

/**
 * What to do with a received frame.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /** Not addressed to us */
    Discard,
    AddBaRequest(Mac48Address, AddBaRequest),
    AddBaResponse(Mac48Address, AddBaResponse),
    DelBa(Mac48Address, DelBa),
}

/**
 * Classifies a frame handed up by the low MAC. Only block ack action frames are handled at
 * this level, anything else that is addressed to us is an error.
 */
pub fn classify(
    packet: &[u8],
    header: &MacHeader,
    own: Mac48Address,
    qos_supported: bool,
) -> Result<Dispatch> {
    if header.addr1 != own {
        trace!("Dropping frame for {} (we are {})", header.addr1, own);
        return Ok(Dispatch::Discard);
    }
    if !header.is_action() {
        return Err(Error::UnhandledFrame(header.frame_type));
    }
    if !qos_supported {
        return Err(Error::ActionWithoutQos);
    }
    let from = header.addr2;
    match ActionFrame::deserialize_complete(packet)? {
        ActionFrame::BlockAck(BlockAckFrame::AddBaRequest(request)) => {
            Ok(Dispatch::AddBaRequest(from, request))
        }
        ActionFrame::BlockAck(BlockAckFrame::AddBaResponse(response)) => {
            Ok(Dispatch::AddBaResponse(from, response))
        }
        ActionFrame::BlockAck(BlockAckFrame::DelBa(delba)) => Ok(Dispatch::DelBa(from, delba)),
        ActionFrame::BlockAck(BlockAckFrame::Unsupported { action, .. }) => {
            Err(Error::UnsupportedBlockAckAction(action))
        }
        ActionFrame::Other { category, .. } => Err(Error::UnsupportedActionCategory(category)),
    }
}

/**
 * Splits an A-MSDU and hands every MSDU, in order, to `forward` as (payload, source,
 * destination). Nothing is forwarded unless the whole aggregate parses.
 */
pub fn deaggregate_and_forward<F>(aggregate: &Bytes, header: &MacHeader, mut forward: F) -> Result<usize>
where
    F: FnMut(Bytes, Mac48Address, Mac48Address),
{
    let subframes = amsdu::deaggregate(aggregate)?;
    trace!(
        "A-MSDU from {} with {} subframes",
        header.addr2,
        subframes.len()
    );
    let count = subframes.len();
    for subframe in subframes {
        forward(
            subframe.payload,
            subframe.header.source,
            subframe.header.destination,
        );
    }
    Ok(count)
}
