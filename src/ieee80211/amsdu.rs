use crate::ieee80211::Mac48Address;
use crate::parse_serialize::{
    into_serialize_error, Deserialize, DeserializeError, DeserializeResult, Serialize,
    SerializeError, SerializeResult,
};
use bytes::{BufMut, Bytes, BytesMut};

/**
 * A-MSDU subframe header, 802.11-2016 9.3.2.2.2. Same layout as an 802.3 header, so the
 * length is big endian unlike the rest of the MAC.
 */
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct AmsduSubframeHeader {
    pub destination: Mac48Address,
    pub source: Mac48Address,
    pub length: u16,
}

pub const SUBFRAME_HEADER_LENGTH: usize = 14;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AmsduSubframe {
    pub header: AmsduSubframeHeader,
    pub payload: Bytes,
}

impl Deserialize for AmsduSubframeHeader {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        let (input, (destination, source)) = <(Mac48Address, Mac48Address)>::deserialize(input)?;
        let (input, length) = nom::number::streaming::be_u16(input)?;
        Ok((
            input,
            AmsduSubframeHeader {
                destination,
                source,
                length,
            },
        ))
    }
}

impl Serialize for AmsduSubframeHeader {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        (self.destination, self.source).serialize_to(target)?;
        target.extend_from_slice(&self.length.to_be_bytes());
        Ok(())
    }
}

fn padding_for(subframe_length: usize) -> usize {
    (4 - subframe_length % 4) % 4
}

/**
 * Parses one subframe, including the padding that follows it. Returns the header and the
 * payload length.
 */
fn subframe(input: &[u8]) -> DeserializeResult<(AmsduSubframeHeader, usize)> {
    let (rest, header) = AmsduSubframeHeader::deserialize(input)?;
    let length = header.length as usize;
    let (rest, _) = nom::bytes::streaming::take(length)(rest)?;
    if rest.is_empty() {
        return Ok((rest, (header, length)));
    }
    // The last subframe carries no padding, but some transmitters add it anyway.
    let padding = padding_for(SUBFRAME_HEADER_LENGTH + length);
    if rest.len() < padding {
        return Err(nom::Err::Error(DeserializeError::unexpected_data(rest)));
    }
    Ok((&rest[padding..], (header, length)))
}

/**
 * Splits an aggregate into its subframes, in order. Either the whole aggregate is
 * well-formed and every subframe is returned, or an error is returned and nothing is.
 * Payloads share the aggregate's buffer.
 */
pub fn deaggregate(aggregate: &Bytes) -> SerializeResult<Vec<AmsduSubframe>> {
    let mut subframes = Vec::new();
    let mut input: &[u8] = &aggregate[..];
    if input.is_empty() {
        return Err(SerializeError::InsufficientData);
    }
    while !input.is_empty() {
        let offset = aggregate.len() - input.len() + SUBFRAME_HEADER_LENGTH;
        let (rest, (header, length)) = subframe(input).map_err(into_serialize_error)?;
        subframes.push(AmsduSubframe {
            header,
            payload: aggregate.slice(offset..offset + length),
        });
        input = rest;
    }
    Ok(subframes)
}

/**
 * Builds an aggregate out of (destination, source, payload) triples, padding all but the
 * last subframe to a multiple of four octets.
 */
pub fn aggregate<'a, I>(msdus: I) -> SerializeResult<Bytes>
where
    I: IntoIterator<Item = (Mac48Address, Mac48Address, &'a [u8])>,
{
    let mut target = BytesMut::new();
    let mut pending_padding = 0;
    for (destination, source, payload) in msdus {
        let length: u16 = std::convert::TryInto::try_into(payload.len())
            .map_err(|_| SerializeError::OutOfRange("A-MSDU subframe length"))?;
        target.put_bytes(0, pending_padding);
        let header = AmsduSubframeHeader {
            destination,
            source,
            length,
        };
        target.put_slice(&header.serialize()?);
        target.put_slice(payload);
        pending_padding = padding_for(SUBFRAME_HEADER_LENGTH + payload.len());
    }
    Ok(target.freeze())
}
