pub mod action;
pub mod amsdu;
pub mod frame;
pub mod mac;
pub mod phy;
pub mod services;

use crate::parse_serialize::{
    Deserialize, DeserializeError, DeserializeResult, Serialize, SerializeResult,
};
use std::convert::TryFrom;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Mac48Address(pub [u8; 6]);
default_serialization_newtype!(Mac48Address, [u8; 6]);

impl Mac48Address {
    pub fn broadcast() -> Self {
        Mac48Address([0xFF; 6])
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::broadcast()
    }

    pub fn is_group(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl From<[u8; 6]> for Mac48Address {
    fn from(octets: [u8; 6]) -> Self {
        Mac48Address(octets)
    }
}

impl fmt::Debug for Mac48Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Mac48Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

/**
 * Traffic identifier. Only the eight user priorities (0..=7) are valid, traffic stream
 * identifiers (8..=15) are not supported.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tid(u8);

impl Tid {
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Option<Tid> {
        if value <= Self::MAX {
            Some(Tid(value))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /**
     * Maps a user priority onto its access category (802.11-2016 Table 10-1).
     */
    pub fn access_category(self) -> AccessCategory {
        match self.0 {
            1 | 2 => AccessCategory::Background,
            0 | 3 => AccessCategory::BestEffort,
            4 | 5 => AccessCategory::Video,
            _ => AccessCategory::Voice,
        }
    }
}

impl TryFrom<u8> for Tid {
    type Error = u8;
    fn try_from(value: u8) -> Result<Tid, u8> {
        Tid::new(value).ok_or(value)
    }
}

impl From<Tid> for u8 {
    fn from(tid: Tid) -> u8 {
        tid.0
    }
}

impl Deserialize for Tid {
    fn deserialize(input: &[u8]) -> DeserializeResult<Tid> {
        let (rest, value) = u8::deserialize(input)?;
        match Tid::new(value) {
            Some(tid) => Ok((rest, tid)),
            None => Err(nom::Err::Error(DeserializeError::unexpected_data(input))),
        }
    }
}

impl Serialize for Tid {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        self.0.serialize_to(target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessCategory {
    Voice,
    Video,
    BestEffort,
    Background,
    BestEffortNonQos,
}

impl AccessCategory {
    /** The QoS access categories, highest priority first. */
    pub const EDCA: [AccessCategory; 4] = [
        AccessCategory::Voice,
        AccessCategory::Video,
        AccessCategory::BestEffort,
        AccessCategory::Background,
    ];

    pub fn is_qos(self) -> bool {
        self != AccessCategory::BestEffortNonQos
    }

    pub(crate) fn index(self) -> usize {
        match self {
            AccessCategory::Voice => 0,
            AccessCategory::Video => 1,
            AccessCategory::BestEffort => 2,
            AccessCategory::Background => 3,
            AccessCategory::BestEffortNonQos => 4,
        }
    }
}

impl fmt::Display for AccessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessCategory::Voice => "AC_VO",
            AccessCategory::Video => "AC_VI",
            AccessCategory::BestEffort => "AC_BE",
            AccessCategory::Background => "AC_BK",
            AccessCategory::BestEffortNonQos => "AC_BE_NQOS",
        })
    }
}

#[test]
fn test_tid_to_access_category() {
    let expected = [
        AccessCategory::BestEffort,
        AccessCategory::Background,
        AccessCategory::Background,
        AccessCategory::BestEffort,
        AccessCategory::Video,
        AccessCategory::Video,
        AccessCategory::Voice,
        AccessCategory::Voice,
    ];
    for (tid, ac) in expected.iter().enumerate() {
        assert_eq!(Tid::new(tid as u8).unwrap().access_category(), *ac);
    }
}

#[test]
fn test_tid_range() {
    assert_eq!(Tid::new(7).map(Tid::value), Some(7));
    assert_eq!(Tid::new(8), None);
    assert_eq!(Tid::try_from(15), Err(15));
    assert!(Tid::deserialize_complete(&[9]).is_err());
}

#[test]
fn test_mac48_address() {
    let address = Mac48Address([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    assert_eq!(format!("{}", address), "00:11:22:33:44:55");
    assert_eq!(
        Mac48Address::deserialize_complete(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]).unwrap(),
        address
    );
    assert!(!address.is_group());
    assert!(Mac48Address::broadcast().is_group());
    assert!(Mac48Address::broadcast().is_broadcast());
}
