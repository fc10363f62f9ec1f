use crate::ieee80211::phy::PhyStandard;
use crate::ieee80211::Mac48Address;
use std::convert::TryFrom;
use std::time::Duration;

/**
 * Role of this station in the BSS. Forwarded to every transmit queue.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationType {
    Sta,
    Ap,
    AdhocSta,
    Mesh,
}

/**
 * Configurable attributes of the station MAC. Most of them are kept by the low MAC or the
 * channel access manager and are only passed through.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacAttribute {
    QosSupported,
    Ssid,
    Address,
    Bssid,
    Promiscuous,
    TypeOfStation,
    PhyStandard,
    Slot,
    Sifs,
    Pifs,
    EifsNoDifs,
    AckTimeout,
    CtsTimeout,
    BasicBlockAckTimeout,
    CompressedBlockAckTimeout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MacValue {
    Bool(bool),
    Text(String),
    Duration(Duration),
    Address(Mac48Address),
    StationType(StationType),
    Standard(PhyStandard),
    Empty,
}

impl From<bool> for MacValue {
    fn from(value: bool) -> MacValue {
        MacValue::Bool(value)
    }
}
impl From<String> for MacValue {
    fn from(value: String) -> MacValue {
        MacValue::Text(value)
    }
}
impl From<&str> for MacValue {
    fn from(value: &str) -> MacValue {
        MacValue::Text(value.to_owned())
    }
}
impl From<Duration> for MacValue {
    fn from(value: Duration) -> MacValue {
        MacValue::Duration(value)
    }
}
impl From<Mac48Address> for MacValue {
    fn from(value: Mac48Address) -> MacValue {
        MacValue::Address(value)
    }
}
impl From<StationType> for MacValue {
    fn from(value: StationType) -> MacValue {
        MacValue::StationType(value)
    }
}
impl From<PhyStandard> for MacValue {
    fn from(value: PhyStandard) -> MacValue {
        MacValue::Standard(value)
    }
}
impl<T> From<Option<T>> for MacValue
where
    MacValue: From<T>,
{
    fn from(value: Option<T>) -> MacValue {
        match value {
            Option::Some(x) => x.into(),
            Option::None => MacValue::Empty,
        }
    }
}

impl TryFrom<MacValue> for bool {
    type Error = ();
    fn try_from(value: MacValue) -> Result<bool, Self::Error> {
        if let MacValue::Bool(x) = value {
            Ok(x)
        } else {
            Err(())
        }
    }
}
impl TryFrom<MacValue> for String {
    type Error = ();
    fn try_from(value: MacValue) -> Result<String, Self::Error> {
        if let MacValue::Text(x) = value {
            Ok(x)
        } else {
            Err(())
        }
    }
}
impl TryFrom<MacValue> for Duration {
    type Error = ();
    fn try_from(value: MacValue) -> Result<Duration, Self::Error> {
        if let MacValue::Duration(x) = value {
            Ok(x)
        } else {
            Err(())
        }
    }
}
impl TryFrom<MacValue> for Mac48Address {
    type Error = ();
    fn try_from(value: MacValue) -> Result<Mac48Address, Self::Error> {
        if let MacValue::Address(x) = value {
            Ok(x)
        } else {
            Err(())
        }
    }
}
impl TryFrom<MacValue> for StationType {
    type Error = ();
    fn try_from(value: MacValue) -> Result<StationType, Self::Error> {
        if let MacValue::StationType(x) = value {
            Ok(x)
        } else {
            Err(())
        }
    }
}
impl TryFrom<MacValue> for PhyStandard {
    type Error = ();
    fn try_from(value: MacValue) -> Result<PhyStandard, Self::Error> {
        if let MacValue::Standard(x) = value {
            Ok(x)
        } else {
            Err(())
        }
    }
}

/**
 * The part of the configuration owned by the station itself, everything else lives in the
 * collaborators.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct MacConfig {
    pub qos_supported: bool,
    pub ssid: String,
    pub type_of_station: StationType,
    pub standard: Option<PhyStandard>,
}

impl Default for MacConfig {
    fn default() -> Self {
        MacConfig {
            qos_supported: false,
            ssid: String::new(),
            type_of_station: StationType::Sta,
            standard: None,
        }
    }
}
