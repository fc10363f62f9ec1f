use crate::ieee80211::{Mac48Address, Tid};
use crate::parse_serialize::{
    Deserialize, DeserializeError, DeserializeResult, Serialize, SerializeError, SerializeResult,
};
use bitfield::bitfield;

/*=== Publicly accessible structures & enums ===*/

pub const MANAGEMENT_SUBTYPE_ACTION: u8 = 0b1101;
pub const MANAGEMENT_SUBTYPE_ACTION_NO_ACK: u8 = 0b1110;
pub const DATA_SUBTYPE_QOS_FLAG: u8 = 0b1000;
pub const DATA_SUBTYPE_NO_DATA_FLAG: u8 = 0b0100;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum FrameType {
    Management(u8),
    Control(u8),
    Data(u8),
    Extension(u8),
}

impl FrameType {
    pub fn action() -> Self {
        FrameType::Management(MANAGEMENT_SUBTYPE_ACTION)
    }

    pub fn qos_data() -> Self {
        FrameType::Data(DATA_SUBTYPE_QOS_FLAG)
    }

    pub fn is_action(&self) -> bool {
        match self {
            FrameType::Management(subtype) => {
                *subtype == MANAGEMENT_SUBTYPE_ACTION || *subtype == MANAGEMENT_SUBTYPE_ACTION_NO_ACK
            }
            _ => false,
        }
    }

    pub fn is_data(&self) -> bool {
        match self {
            FrameType::Data(_) => true,
            _ => false,
        }
    }

    pub fn is_qos_data(&self) -> bool {
        match self {
            FrameType::Data(subtype) => subtype & DATA_SUBTYPE_QOS_FLAG != 0,
            _ => false,
        }
    }

    fn type_and_subtype(&self) -> (u16, u8) {
        match self {
            FrameType::Management(subtype) => (0, *subtype),
            FrameType::Control(subtype) => (1, *subtype),
            FrameType::Data(subtype) => (2, *subtype),
            FrameType::Extension(subtype) => (3, *subtype),
        }
    }

    fn from_type_and_subtype(frame_type: u16, subtype: u8) -> Self {
        match frame_type {
            0 => FrameType::Management(subtype),
            1 => FrameType::Control(subtype),
            2 => FrameType::Data(subtype),
            _ => FrameType::Extension(subtype),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct SequenceControl {
    pub fragment_number: u8,
    pub sequence_number: u16,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct QosControl {
    pub tid: Tid,
    pub end_of_service_period: bool,
    pub ack_policy: u8,
    pub amsdu_present: bool,
    pub txop: u8,
}

/**
 * MAC header of a management or data frame (802.11-2016 9.2.3). Control frames have a
 * different, shorter, layout and are not parsed here.
 */
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MacHeader {
    pub frame_type: FrameType,
    pub to_ds: bool,
    pub from_ds: bool,
    pub more_fragments: bool,
    pub retry: bool,
    pub power_management: bool,
    pub more_data: bool,
    pub protected: bool,
    pub order: bool,
    pub duration: u16,
    pub addr1: Mac48Address,
    pub addr2: Mac48Address,
    pub addr3: Mac48Address,
    pub sequence_control: SequenceControl,
    pub addr4: Option<Mac48Address>,
    pub qos_control: Option<QosControl>,
}

impl MacHeader {
    /**
     * Header of an action frame on a direct (non-DS) link.
     */
    pub fn action(addr1: Mac48Address, addr2: Mac48Address, addr3: Mac48Address) -> Self {
        MacHeader {
            frame_type: FrameType::action(),
            to_ds: false,
            from_ds: false,
            more_fragments: false,
            retry: false,
            power_management: false,
            more_data: false,
            protected: false,
            order: false,
            duration: 0,
            addr1,
            addr2,
            addr3,
            sequence_control: SequenceControl::default(),
            addr4: None,
            qos_control: None,
        }
    }

    pub fn is_action(&self) -> bool {
        self.frame_type.is_action()
    }

}

/*=== Bitfields for serialization & parsing ===*/
bitfield! {
    pub struct FrameControl(u16);
    impl Debug;
    pub protocol_version, set_protocol_version: 1, 0;
    pub frame_type, set_frame_type: 3, 2;
    pub u8, subtype, set_subtype: 7, 4;
    pub to_ds, set_to_ds: 8, 8;
    pub from_ds, set_from_ds: 9, 9;
    pub more_fragments, set_more_fragments: 10, 10;
    pub retry, set_retry: 11, 11;
    pub power_management, set_power_management: 12, 12;
    pub more_data, set_more_data: 13, 13;
    pub protected, set_protected: 14, 14;
    pub order, set_order: 15, 15;
}
default_serialization_newtype!(FrameControl, u16);

bitfield! {
    struct SequenceControlField(u16);
    impl Debug;
    pub u8, fragment_number, set_fragment_number: 3, 0;
    pub sequence_number, set_sequence_number: 15, 4;
}
default_serialization_newtype!(SequenceControlField, u16);

bitfield! {
    struct QosControlField(u16);
    impl Debug;
    pub u8, tid, set_tid: 3, 0;
    pub eosp, set_eosp: 4, 4;
    pub u8, ack_policy, set_ack_policy: 6, 5;
    pub amsdu_present, set_amsdu_present: 7, 7;
    pub u8, txop, set_txop: 15, 8;
}
default_serialization_newtype!(QosControlField, u16);

impl Deserialize for SequenceControl {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        nom::combinator::map(SequenceControlField::deserialize, |field| SequenceControl {
            fragment_number: field.fragment_number(),
            sequence_number: field.sequence_number(),
        })(input)
    }
}

impl Serialize for SequenceControl {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        if self.fragment_number > 0x0F || self.sequence_number > 0x0FFF {
            return Err(SerializeError::OutOfRange("Sequence control"));
        }
        let mut field = SequenceControlField(0);
        field.set_fragment_number(self.fragment_number);
        field.set_sequence_number(self.sequence_number);
        field.serialize_to(target)
    }
}

impl Deserialize for QosControl {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self> {
        let (rest, field) = QosControlField::deserialize(input)?;
        let tid = Tid::new(field.tid())
            .ok_or_else(|| nom::Err::Error(DeserializeError::unexpected_data(input)))?;
        Ok((
            rest,
            QosControl {
                tid,
                end_of_service_period: field.eosp() != 0,
                ack_policy: field.ack_policy(),
                amsdu_present: field.amsdu_present() != 0,
                txop: field.txop(),
            },
        ))
    }
}

impl Serialize for QosControl {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        let mut field = QosControlField(0);
        field.set_tid(self.tid.value());
        field.set_eosp(self.end_of_service_period.into());
        field.set_ack_policy(self.ack_policy & 0x03);
        field.set_amsdu_present(self.amsdu_present.into());
        field.set_txop(self.txop);
        field.serialize_to(target)
    }
}

impl Deserialize for MacHeader {
    fn deserialize(input: &[u8]) -> DeserializeResult<MacHeader> {
        let (input, fc) = FrameControl::deserialize(input)?;
        if fc.protocol_version() != 0 {
            return Err(nom::Err::Error(DeserializeError::unexpected_data(input)));
        }
        let frame_type = FrameType::from_type_and_subtype(fc.frame_type(), fc.subtype());
        match frame_type {
            FrameType::Management(_) | FrameType::Data(_) => {}
            _ => {
                return Err(nom::Err::Error(DeserializeError::unimplemented(
                    input,
                    "Only management and data frame headers are implemented",
                )))
            }
        }
        let to_ds = fc.to_ds() != 0;
        let from_ds = fc.from_ds() != 0;
        let (input, (duration, addr1, addr2, addr3)) =
            <(u16, Mac48Address, Mac48Address, Mac48Address)>::deserialize(input)?;
        let (input, sequence_control) = SequenceControl::deserialize(input)?;
        let (input, addr4) = nom::combinator::cond(
            frame_type.is_data() && to_ds && from_ds,
            Mac48Address::deserialize,
        )(input)?;
        let (input, qos_control) =
            nom::combinator::cond(frame_type.is_qos_data(), QosControl::deserialize)(input)?;
        Ok((
            input,
            MacHeader {
                frame_type,
                to_ds,
                from_ds,
                more_fragments: fc.more_fragments() != 0,
                retry: fc.retry() != 0,
                power_management: fc.power_management() != 0,
                more_data: fc.more_data() != 0,
                protected: fc.protected() != 0,
                order: fc.order() != 0,
                duration,
                addr1,
                addr2,
                addr3,
                sequence_control,
                addr4,
                qos_control,
            },
        ))
    }
}

impl Serialize for MacHeader {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        let (frame_type, subtype) = self.frame_type.type_and_subtype();
        match self.frame_type {
            FrameType::Management(_) | FrameType::Data(_) => {}
            _ => {
                return Err(SerializeError::Unimplemented(
                    "Only management and data frame headers are implemented",
                ))
            }
        }
        if subtype > 0x0F {
            return Err(SerializeError::OutOfRange("Frame subtype"));
        }
        if self.frame_type.is_qos_data() != self.qos_control.is_some() {
            return Err(SerializeError::UnexpectedData);
        }
        let four_address = self.frame_type.is_data() && self.to_ds && self.from_ds;
        if four_address != self.addr4.is_some() {
            return Err(SerializeError::UnexpectedData);
        }
        let mut fc = FrameControl(0);
        fc.set_protocol_version(0);
        fc.set_frame_type(frame_type);
        fc.set_subtype(subtype);
        fc.set_to_ds(self.to_ds.into());
        fc.set_from_ds(self.from_ds.into());
        fc.set_more_fragments(self.more_fragments.into());
        fc.set_retry(self.retry.into());
        fc.set_power_management(self.power_management.into());
        fc.set_more_data(self.more_data.into());
        fc.set_protected(self.protected.into());
        fc.set_order(self.order.into());
        (fc, self.duration, self.addr1, self.addr2, self.addr3).serialize_to(target)?;
        self.sequence_control.serialize_to(target)?;
        if let Some(addr4) = self.addr4 {
            addr4.serialize_to(target)?;
        }
        if let Some(qos_control) = self.qos_control {
            qos_control.serialize_to(target)?;
        }
        Ok(())
    }
}

#[test]
fn test_frame_control_parsing() {
    // Action
    let input: [u8; 2] = [0xd0, 0x00];
    let parsed = FrameControl::deserialize_complete(&input).unwrap();
    assert_eq!(parsed.protocol_version(), 0);
    assert_eq!(parsed.frame_type(), 0);
    assert_eq!(parsed.subtype(), MANAGEMENT_SUBTYPE_ACTION);
    assert_eq!(parsed.to_ds(), 0);
    assert_eq!(parsed.from_ds(), 0);
    assert_eq!(parsed.retry(), 0);
    assert_eq!(parsed.protected(), 0);

    // QoS data, to DS, retried
    let input: [u8; 2] = [0x88, 0x09];
    let parsed = FrameControl::deserialize_complete(&input).unwrap();
    assert_eq!(parsed.frame_type(), 2);
    assert_eq!(parsed.subtype(), DATA_SUBTYPE_QOS_FLAG);
    assert_eq!(parsed.to_ds(), 1);
    assert_eq!(parsed.from_ds(), 0);
    assert_eq!(parsed.retry(), 1);
    assert_eq!(parsed.serialize().unwrap(), input);
}

#[cfg(test)]
fn address(last: u8) -> Mac48Address {
    Mac48Address([0x02, 0x00, 0x00, 0x00, 0x00, last])
}

#[test]
fn test_parse_action_header() {
    let input: [u8; 24] = [
        0xd0, 0x00, 0x3a, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00,
        0x02, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02, 0x50, 0x01,
    ];
    let parsed = MacHeader::deserialize_complete(&input).unwrap();
    let mut expected = MacHeader::action(address(1), address(2), address(2));
    expected.duration = 0x013a;
    expected.sequence_control = SequenceControl {
        fragment_number: 0,
        sequence_number: 0x15,
    };
    assert_eq!(parsed, expected);
    assert!(parsed.is_action());
    assert_eq!(parsed.serialize().unwrap(), input.to_vec());
}

#[test]
fn test_qos_data_header() {
    let mut header = MacHeader::action(address(1), address(2), address(3));
    header.frame_type = FrameType::qos_data();
    header.from_ds = true;
    header.qos_control = Some(QosControl {
        tid: Tid::new(5).unwrap(),
        end_of_service_period: false,
        ack_policy: 0,
        amsdu_present: true,
        txop: 0,
    });
    let serialized = header.serialize().unwrap();
    assert_eq!(serialized.len(), 26);
    assert_eq!(&serialized[24..], &[0x85, 0x00]);
    let parsed = MacHeader::deserialize_complete(&serialized).unwrap();
    assert_eq!(parsed, header);
    assert!(parsed.qos_control.map_or(false, |qos| qos.amsdu_present));
}

#[test]
fn test_header_consistency_checks() {
    let mut header = MacHeader::action(address(1), address(2), address(3));
    header.frame_type = FrameType::qos_data();
    assert_eq!(header.serialize(), Err(SerializeError::UnexpectedData));

    header.frame_type = FrameType::Control(0b1101);
    assert!(header.serialize().is_err());
    // ACK
    assert!(MacHeader::deserialize_complete(&[0xd4, 0x00, 0x00, 0x00]).is_err());
}
