use crate::ieee80211::Tid;
use crate::parse_serialize::{
    Deserialize, DeserializeError, DeserializeResult, DeserializeTagged, Serialize,
    SerializeError, SerializeResult, SerializeTagged,
};
use bitfield::bitfield;
use std::convert::TryFrom;

/*=== Publicly accessible structures & enums ===*/

/**
 * Action frame categories, 802.11-2016 Table 9-47.
 */
#[derive(Debug, PartialEq, TryFromPrimitive, Copy, Clone, Eq, Hash)]
#[TryFromPrimitiveType = "u8"]
pub enum ActionCategory {
    SpectrumManagement = 0,
    Qos = 1,
    Dls = 2,
    BlockAck = 3,
    Public = 4,
    RadioMeasurement = 5,
    FastBssTransition = 6,
    Ht = 7,
    SaQuery = 8,
    ProtectedDualOfPublic = 9,
    Wnm = 10,
    UnprotectedWnm = 11,
    Tdls = 12,
    Mesh = 13,
    Multihop = 14,
    SelfProtected = 15,
    VendorSpecificProtected = 126,
    VendorSpecific = 127,
}
default_serialization_enum!(ActionCategory, u8);

#[derive(Debug, PartialEq, TryFromPrimitive, Copy, Clone, Eq, Hash)]
#[TryFromPrimitiveType = "u8"]
pub enum BlockAckAction {
    AddBaRequest = 0,
    AddBaResponse = 1,
    DelBa = 2,
}
default_serialization_enum!(BlockAckAction, u8);

#[derive(Debug, PartialEq, TryFromPrimitive, Copy, Clone, Eq, Hash)]
#[TryFromPrimitiveType = "u8"]
pub enum BlockAckPolicy {
    Delayed = 0,
    Immediate = 1,
}

#[derive(Debug, PartialEq, Copy, Clone, Eq, Hash)]
pub struct StatusCode(pub u16);
default_serialization_newtype!(StatusCode, u16);

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0);
    pub const REFUSED: StatusCode = StatusCode(37);
}

#[derive(Debug, PartialEq, Copy, Clone, Eq, Hash)]
pub struct ReasonCode(pub u16);
default_serialization_newtype!(ReasonCode, u16);

impl ReasonCode {
    pub const UNSPECIFIED: ReasonCode = ReasonCode(1);
    pub const END_BLOCK_ACK: ReasonCode = ReasonCode(37);
    pub const UNKNOWN_BLOCK_ACK: ReasonCode = ReasonCode(38);
    pub const TIMEOUT: ReasonCode = ReasonCode(39);
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct AddBaRequest {
    pub dialog_token: u8,
    pub amsdu_supported: bool,
    pub policy: BlockAckPolicy,
    pub tid: Tid,
    pub buffer_size: u16,
    /** Block ack inactivity timeout in TUs, 0 disables it */
    pub timeout: u16,
    pub starting_sequence: u16,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct AddBaResponse {
    pub dialog_token: u8,
    pub status: StatusCode,
    pub amsdu_supported: bool,
    pub policy: BlockAckPolicy,
    pub tid: Tid,
    pub buffer_size: u16,
    pub timeout: u16,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct DelBa {
    /** Set when the sender is the originator of the agreement being torn down */
    pub initiator: bool,
    pub tid: Tid,
    pub reason: ReasonCode,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum BlockAckFrame {
    AddBaRequest(AddBaRequest),
    AddBaResponse(AddBaResponse),
    DelBa(DelBa),
    /** Any action code this implementation has no policy for (e.g. ADDBA extensions) */
    Unsupported { action: u8, body: Vec<u8> },
}

/**
 * Body of a management action frame, split on category and action code.
 */
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ActionFrame {
    BlockAck(BlockAckFrame),
    Other {
        category: u8,
        action: u8,
        body: Vec<u8>,
    },
}

impl ActionFrame {
    pub fn category(&self) -> u8 {
        match self {
            ActionFrame::BlockAck(_) => ActionCategory::BlockAck as u8,
            ActionFrame::Other { category, .. } => *category,
        }
    }
}

/*=== Bitfields for serialization & parsing ===*/
bitfield! {
    pub struct BlockAckParameterSet(u16);
    impl Debug;
    pub amsdu_supported, set_amsdu_supported: 0, 0;
    pub u8, policy, set_policy: 1, 1;
    pub u8, tid, set_tid: 5, 2;
    pub buffer_size, set_buffer_size: 15, 6;
}
default_serialization_newtype!(BlockAckParameterSet, u16);

bitfield! {
    pub struct StartingSequenceControl(u16);
    impl Debug;
    pub u8, fragment_number, set_fragment_number: 3, 0;
    pub sequence_number, set_sequence_number: 15, 4;
}
default_serialization_newtype!(StartingSequenceControl, u16);

bitfield! {
    pub struct DelBaParameterSet(u16);
    impl Debug;
    pub reserved, set_reserved: 10, 0;
    pub initiator, set_initiator: 11, 11;
    pub u8, tid, set_tid: 15, 12;
}
default_serialization_newtype!(DelBaParameterSet, u16);

/**
 * Fields shared by ADDBA request and response.
 */
struct BlockAckParameters {
    amsdu_supported: bool,
    policy: BlockAckPolicy,
    tid: Tid,
    buffer_size: u16,
}

impl BlockAckParameters {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        let (rest, field) = BlockAckParameterSet::deserialize(input)?;
        let tid = Tid::new(field.tid())
            .ok_or_else(|| nom::Err::Error(DeserializeError::unexpected_data(input)))?;
        let policy = BlockAckPolicy::try_from(field.policy())
            .map_err(|_| nom::Err::Error(DeserializeError::unexpected_data(input)))?;
        Ok((
            rest,
            BlockAckParameters {
                amsdu_supported: field.amsdu_supported() != 0,
                policy,
                tid,
                buffer_size: field.buffer_size(),
            },
        ))
    }

    fn to_field(&self) -> SerializeResult<BlockAckParameterSet> {
        if self.buffer_size > 0x03FF {
            return Err(SerializeError::OutOfRange("Block ack buffer size"));
        }
        let mut field = BlockAckParameterSet(0);
        field.set_amsdu_supported(self.amsdu_supported.into());
        field.set_policy(self.policy as u8);
        field.set_tid(self.tid.value());
        field.set_buffer_size(self.buffer_size);
        Ok(field)
    }
}

impl Deserialize for AddBaRequest {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        let (input, dialog_token) = u8::deserialize(input)?;
        let (input, parameters) = BlockAckParameters::deserialize(input)?;
        let (input, (timeout, ssc)) = <(u16, StartingSequenceControl)>::deserialize(input)?;
        Ok((
            input,
            AddBaRequest {
                dialog_token,
                amsdu_supported: parameters.amsdu_supported,
                policy: parameters.policy,
                tid: parameters.tid,
                buffer_size: parameters.buffer_size,
                timeout,
                starting_sequence: ssc.sequence_number(),
            },
        ))
    }
}

impl Serialize for AddBaRequest {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        if self.starting_sequence > 0x0FFF {
            return Err(SerializeError::OutOfRange("Starting sequence number"));
        }
        let parameters = BlockAckParameters {
            amsdu_supported: self.amsdu_supported,
            policy: self.policy,
            tid: self.tid,
            buffer_size: self.buffer_size,
        }
        .to_field()?;
        let mut ssc = StartingSequenceControl(0);
        ssc.set_sequence_number(self.starting_sequence);
        (self.dialog_token, parameters, self.timeout, ssc).serialize_to(target)
    }
}

impl Deserialize for AddBaResponse {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        let (input, (dialog_token, status)) = <(u8, StatusCode)>::deserialize(input)?;
        let (input, parameters) = BlockAckParameters::deserialize(input)?;
        let (input, timeout) = u16::deserialize(input)?;
        Ok((
            input,
            AddBaResponse {
                dialog_token,
                status,
                amsdu_supported: parameters.amsdu_supported,
                policy: parameters.policy,
                tid: parameters.tid,
                buffer_size: parameters.buffer_size,
                timeout,
            },
        ))
    }
}

impl Serialize for AddBaResponse {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        let parameters = BlockAckParameters {
            amsdu_supported: self.amsdu_supported,
            policy: self.policy,
            tid: self.tid,
            buffer_size: self.buffer_size,
        }
        .to_field()?;
        (self.dialog_token, self.status, parameters, self.timeout).serialize_to(target)
    }
}

impl Deserialize for DelBa {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        let (rest, (parameters, reason)) =
            <(DelBaParameterSet, ReasonCode)>::deserialize(input)?;
        let tid = Tid::new(parameters.tid())
            .ok_or_else(|| nom::Err::Error(DeserializeError::unexpected_data(input)))?;
        Ok((
            rest,
            DelBa {
                initiator: parameters.initiator() != 0,
                tid,
                reason,
            },
        ))
    }
}

impl Serialize for DelBa {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        let mut parameters = DelBaParameterSet(0);
        parameters.set_initiator(self.initiator.into());
        parameters.set_tid(self.tid.value());
        (parameters, self.reason).serialize_to(target)
    }
}

impl SerializeTagged for BlockAckFrame {
    type TagType = u8;
    fn serialize_tag(&self) -> SerializeResult<u8> {
        Ok(match self {
            BlockAckFrame::AddBaRequest(_) => BlockAckAction::AddBaRequest as u8,
            BlockAckFrame::AddBaResponse(_) => BlockAckAction::AddBaResponse as u8,
            BlockAckFrame::DelBa(_) => BlockAckAction::DelBa as u8,
            BlockAckFrame::Unsupported { action, .. } => *action,
        })
    }
}

impl DeserializeTagged for BlockAckFrame {
    fn deserialize(action: u8, input: &[u8]) -> DeserializeResult<Self> {
        match BlockAckAction::try_from(action) {
            Ok(BlockAckAction::AddBaRequest) => {
                nom::combinator::map(AddBaRequest::deserialize, BlockAckFrame::AddBaRequest)(input)
            }
            Ok(BlockAckAction::AddBaResponse) => nom::combinator::map(
                AddBaResponse::deserialize,
                BlockAckFrame::AddBaResponse,
            )(input),
            Ok(BlockAckAction::DelBa) => {
                nom::combinator::map(DelBa::deserialize, BlockAckFrame::DelBa)(input)
            }
            Err(_) => {
                let (input, body) = nom::combinator::rest(input)?;
                Ok((
                    input,
                    BlockAckFrame::Unsupported {
                        action,
                        body: body.to_vec(),
                    },
                ))
            }
        }
    }
}

impl Serialize for BlockAckFrame {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        match self {
            BlockAckFrame::AddBaRequest(request) => request.serialize_to(target),
            BlockAckFrame::AddBaResponse(response) => response.serialize_to(target),
            BlockAckFrame::DelBa(delba) => delba.serialize_to(target),
            BlockAckFrame::Unsupported { body, .. } => {
                target.extend_from_slice(body);
                Ok(())
            }
        }
    }
}

impl Deserialize for ActionFrame {
    fn deserialize(input: &[u8]) -> DeserializeResult<ActionFrame> {
        let (input, (category, action)) = <(u8, u8)>::deserialize(input)?;
        match ActionCategory::try_from(category) {
            Ok(ActionCategory::BlockAck) => nom::combinator::map(
                |input: &[u8]| <BlockAckFrame as DeserializeTagged>::deserialize(action, input),
                ActionFrame::BlockAck,
            )(input),
            _ => {
                let (input, body) = nom::combinator::rest(input)?;
                Ok((
                    input,
                    ActionFrame::Other {
                        category,
                        action,
                        body: body.to_vec(),
                    },
                ))
            }
        }
    }
}

impl Serialize for ActionFrame {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        match self {
            ActionFrame::BlockAck(frame) => {
                (ActionCategory::BlockAck, frame.serialize_tag()?).serialize_to(target)?;
                frame.serialize_to(target)
            }
            ActionFrame::Other {
                category,
                action,
                body,
            } => {
                (*category, *action).serialize_to(target)?;
                target.extend_from_slice(body);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
fn tid(value: u8) -> Tid {
    Tid::new(value).unwrap()
}

#[test]
fn test_block_ack_parameter_set() {
    let parsed = BlockAckParameterSet::deserialize_complete(&[0xd7, 0xff]).unwrap();
    assert_eq!(parsed.amsdu_supported(), 1);
    assert_eq!(parsed.policy(), 1);
    assert_eq!(parsed.tid(), 5);
    assert_eq!(parsed.buffer_size(), 1023);
}

#[test]
fn test_parse_addba_request() {
    let input: [u8; 9] = [0x03, 0x00, 0x01, 0x17, 0x10, 0x00, 0x00, 0x40, 0x06];
    let parsed = ActionFrame::deserialize_complete(&input).unwrap();
    assert_eq!(
        parsed,
        ActionFrame::BlockAck(BlockAckFrame::AddBaRequest(AddBaRequest {
            dialog_token: 1,
            amsdu_supported: true,
            policy: BlockAckPolicy::Immediate,
            tid: tid(5),
            buffer_size: 64,
            timeout: 0,
            starting_sequence: 100,
        }))
    );
    assert_eq!(parsed.serialize().unwrap(), input.to_vec());
}

#[test]
fn test_serialize_addba_response() {
    let response = ActionFrame::BlockAck(BlockAckFrame::AddBaResponse(AddBaResponse {
        dialog_token: 1,
        status: StatusCode::SUCCESS,
        amsdu_supported: true,
        policy: BlockAckPolicy::Immediate,
        tid: tid(5),
        buffer_size: 1023,
        timeout: 0,
    }));
    assert_eq!(
        response.serialize().unwrap(),
        vec![0x03, 0x01, 0x01, 0x00, 0x00, 0xd7, 0xff, 0x00, 0x00]
    );
}

#[test]
fn test_parse_delba() {
    let input: [u8; 6] = [0x03, 0x02, 0x00, 0x68, 0x25, 0x00];
    let parsed = ActionFrame::deserialize_complete(&input).unwrap();
    assert_eq!(
        parsed,
        ActionFrame::BlockAck(BlockAckFrame::DelBa(DelBa {
            initiator: true,
            tid: tid(6),
            reason: ReasonCode::END_BLOCK_ACK,
        }))
    );
    assert_eq!(parsed.serialize().unwrap(), input.to_vec());
}

#[test]
fn test_parse_unsupported_actions() {
    // ADDBA extension style action code within the block ack category
    let parsed = ActionFrame::deserialize_complete(&[0x03, 0x07, 0xAA]).unwrap();
    assert_eq!(
        parsed,
        ActionFrame::BlockAck(BlockAckFrame::Unsupported {
            action: 7,
            body: vec![0xAA]
        })
    );

    // SA Query request
    let parsed = ActionFrame::deserialize_complete(&[0x08, 0x00, 0x12, 0x34]).unwrap();
    assert_eq!(
        parsed,
        ActionFrame::Other {
            category: ActionCategory::SaQuery as u8,
            action: 0,
            body: vec![0x12, 0x34]
        }
    );
    assert_eq!(parsed.category(), 8);
}

#[test]
fn test_malformed_block_ack_frames() {
    // Truncated ADDBA request
    assert_eq!(
        ActionFrame::deserialize_complete(&[0x03, 0x00, 0x01, 0x17]),
        Err(SerializeError::InsufficientData)
    );
    // DELBA for TID 9
    assert_eq!(
        ActionFrame::deserialize_complete(&[0x03, 0x02, 0x00, 0x98, 0x25, 0x00]),
        Err(SerializeError::UnexpectedData)
    );
}

#[test]
fn test_buffer_size_out_of_range() {
    let request = AddBaRequest {
        dialog_token: 0,
        amsdu_supported: false,
        policy: BlockAckPolicy::Delayed,
        tid: tid(0),
        buffer_size: 1024,
        timeout: 0,
        starting_sequence: 0,
    };
    assert!(request.serialize().is_err());
}
