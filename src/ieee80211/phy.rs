use crate::ieee80211::services::error::{Error, Result};
use crate::ieee80211::AccessCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhyStandard {
    Ieee80211a,
    Ieee80211b,
    Ieee80211g,
    Ieee80211_10Mhz,
    Ieee80211_5Mhz,
    Holland,
    /** 802.11p control channel */
    Ieee80211pCch,
    /** 802.11p service channel */
    Ieee80211pSch,
    Ieee80211n2_4Ghz,
    Ieee80211n5Ghz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentionWindow {
    pub cw_min: u32,
    pub cw_max: u32,
}

impl ContentionWindow {
    pub fn for_standard(standard: PhyStandard) -> Result<ContentionWindow> {
        let (cw_min, cw_max) = match standard {
            PhyStandard::Ieee80211pCch | PhyStandard::Ieee80211pSch => (15, 511),
            PhyStandard::Holland
            | PhyStandard::Ieee80211a
            | PhyStandard::Ieee80211g
            | PhyStandard::Ieee80211_10Mhz
            | PhyStandard::Ieee80211_5Mhz => (15, 1023),
            PhyStandard::Ieee80211b => (31, 1023),
            PhyStandard::Ieee80211n2_4Ghz | PhyStandard::Ieee80211n5Ghz => {
                return Err(Error::UnsupportedStandard(standard))
            }
        };
        Ok(ContentionWindow { cw_min, cw_max })
    }

    fn quarter(self) -> u32 {
        (self.cw_min + 1) / 4 - 1
    }

    fn half(self) -> u32 {
        (self.cw_min + 1) / 2 - 1
    }
}

/**
 * Channel access parameters of a single queue.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdcaParameters {
    pub cw_min: u32,
    pub cw_max: u32,
    pub aifsn: u8,
}

impl EdcaParameters {
    /**
     * Default EDCA parameter set (802.11-2016 Table 9-137), derived from the PHY's
     * contention window.
     */
    pub fn for_access_category(cw: ContentionWindow, ac: AccessCategory) -> EdcaParameters {
        let (cw_min, cw_max, aifsn) = match ac {
            AccessCategory::Voice => (cw.quarter(), cw.half(), 2),
            AccessCategory::Video => (cw.half(), cw.cw_min, 2),
            AccessCategory::BestEffort => (cw.cw_min, cw.cw_max, 3),
            AccessCategory::Background => (cw.cw_min, cw.cw_max, 7),
            AccessCategory::BestEffortNonQos => (cw.cw_min, cw.cw_max, 2),
        };
        EdcaParameters {
            cw_min,
            cw_max,
            aifsn,
        }
    }

    /**
     * 802.11p control channel parameter set (IEEE 1609.4 Table 5).
     */
    pub fn for_control_channel(cw: ContentionWindow, ac: AccessCategory) -> EdcaParameters {
        let (cw_min, cw_max, aifsn) = match ac {
            AccessCategory::Voice => (cw.quarter(), cw.half(), 2),
            AccessCategory::Video => (cw.quarter(), cw.half(), 3),
            AccessCategory::BestEffort => (cw.half(), cw.cw_min, 6),
            AccessCategory::Background => (cw.cw_min, cw.cw_max, 9),
            AccessCategory::BestEffortNonQos => (cw.cw_min, cw.cw_max, 2),
        };
        EdcaParameters {
            cw_min,
            cw_max,
            aifsn,
        }
    }
}

#[test]
fn test_contention_window_table() {
    let expected = [
        (PhyStandard::Ieee80211pCch, 15, 511),
        (PhyStandard::Ieee80211pSch, 15, 511),
        (PhyStandard::Holland, 15, 1023),
        (PhyStandard::Ieee80211a, 15, 1023),
        (PhyStandard::Ieee80211g, 15, 1023),
        (PhyStandard::Ieee80211_10Mhz, 15, 1023),
        (PhyStandard::Ieee80211_5Mhz, 15, 1023),
        (PhyStandard::Ieee80211b, 31, 1023),
    ];
    for (standard, cw_min, cw_max) in expected.iter() {
        assert_eq!(
            ContentionWindow::for_standard(*standard),
            Ok(ContentionWindow {
                cw_min: *cw_min,
                cw_max: *cw_max
            })
        );
    }
}

#[test]
fn test_unsupported_standard() {
    assert_eq!(
        ContentionWindow::for_standard(PhyStandard::Ieee80211n5Ghz),
        Err(Error::UnsupportedStandard(PhyStandard::Ieee80211n5Ghz))
    );
}

#[test]
fn test_edca_parameters() {
    let cw = ContentionWindow {
        cw_min: 15,
        cw_max: 1023,
    };
    assert_eq!(
        EdcaParameters::for_access_category(cw, AccessCategory::Voice),
        EdcaParameters {
            cw_min: 3,
            cw_max: 7,
            aifsn: 2
        }
    );
    assert_eq!(
        EdcaParameters::for_access_category(cw, AccessCategory::Video),
        EdcaParameters {
            cw_min: 7,
            cw_max: 15,
            aifsn: 2
        }
    );
    assert_eq!(
        EdcaParameters::for_access_category(cw, AccessCategory::Background),
        EdcaParameters {
            cw_min: 15,
            cw_max: 1023,
            aifsn: 7
        }
    );
    let cw = ContentionWindow {
        cw_min: 15,
        cw_max: 511,
    };
    assert_eq!(
        EdcaParameters::for_control_channel(cw, AccessCategory::BestEffort),
        EdcaParameters {
            cw_min: 7,
            cw_max: 15,
            aifsn: 6
        }
    );
}
