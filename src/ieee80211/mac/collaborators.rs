use crate::ieee80211::action::{AddBaResponse, DelBa};
use crate::ieee80211::frame::MacHeader;
use crate::ieee80211::mac::attributes::StationType;
use crate::ieee80211::phy::{ContentionWindow, EdcaParameters, PhyStandard};
use crate::ieee80211::{AccessCategory, Mac48Address, Tid};
use bytes::Bytes;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/**
 * The transmitter/receiver below the queues. Besides timing parameters it keeps the
 * receive-side reordering state of every block ack agreement we are the recipient of.
 */
pub trait LowMac {
    fn set_address(&self, address: Mac48Address);
    fn address(&self) -> Mac48Address;
    fn set_bssid(&self, bssid: Mac48Address);
    fn bssid(&self) -> Mac48Address;
    fn set_promisc(&self);

    fn set_slot_time(&self, slot: Duration);
    fn slot_time(&self) -> Duration;
    fn set_sifs(&self, sifs: Duration);
    fn sifs(&self) -> Duration;
    fn set_pifs(&self, pifs: Duration);
    fn pifs(&self) -> Duration;
    fn set_ack_timeout(&self, timeout: Duration);
    fn ack_timeout(&self) -> Duration;
    fn set_cts_timeout(&self, timeout: Duration);
    fn cts_timeout(&self) -> Duration;
    fn set_basic_block_ack_timeout(&self, timeout: Duration);
    fn basic_block_ack_timeout(&self) -> Duration;
    fn set_compressed_block_ack_timeout(&self, timeout: Duration);
    fn compressed_block_ack_timeout(&self) -> Duration;

    fn set_phy(&self, phy: Rc<dyn WifiPhy>);
    fn set_remote_station_manager(&self, manager: Rc<dyn RemoteStationManager>);

    fn create_block_ack_agreement(
        &self,
        response: &AddBaResponse,
        originator: Mac48Address,
        starting_sequence: u16,
    );
    fn destroy_block_ack_agreement(&self, originator: Mac48Address, tid: Tid);
}

/**
 * Contention engine shared by all queues.
 */
pub trait ChannelAccessManager {
    fn set_slot(&self, slot: Duration);
    fn set_sifs(&self, sifs: Duration);
    fn set_eifs_no_difs(&self, eifs_no_difs: Duration);
    fn eifs_no_difs(&self) -> Duration;
    fn setup_phy_listener(&self, phy: Rc<dyn WifiPhy>);
}

pub trait WifiPhy: fmt::Debug {
    fn standard(&self) -> PhyStandard;
}

/** Rate control and per-peer state. Opaque to this layer, only handed to the queues. */
pub trait RemoteStationManager: fmt::Debug {}

/**
 * A transmit queue with its own channel access function, one per access category.
 */
pub trait TxQueue {
    fn start(&mut self);
    fn set_access_category(&mut self, ac: AccessCategory);
    fn set_type_of_station(&mut self, station_type: StationType);
    fn set_remote_station_manager(&mut self, manager: Rc<dyn RemoteStationManager>);
    fn set_edca_parameters(&mut self, parameters: EdcaParameters);

    fn configure_dcf(&mut self, cw: ContentionWindow, ac: AccessCategory) {
        self.set_edca_parameters(EdcaParameters::for_access_category(cw, ac));
    }

    fn configure_cch_dcf(&mut self, cw: ContentionWindow, ac: AccessCategory) {
        self.set_edca_parameters(EdcaParameters::for_control_channel(cw, ac));
    }

    fn queue(&mut self, packet: Bytes, header: MacHeader);
    /** Queues a frame ahead of everything already waiting. */
    fn push_front(&mut self, packet: Bytes, header: MacHeader);

    fn got_addba_response(&mut self, response: &AddBaResponse, recipient: Mac48Address);
    fn got_delba_frame(&mut self, delba: &DelBa, recipient: Mac48Address);
}

/**
 * Everything a queue is bound to when it is created.
 */
#[derive(Clone)]
pub struct QueueBindings {
    pub low: Rc<dyn LowMac>,
    pub channel_access: Rc<dyn ChannelAccessManager>,
    pub tx_trace: TxTrace,
}

pub type HeaderListener = Box<dyn FnMut(&MacHeader)>;

#[derive(Default)]
struct TxTraceListeners {
    ok: Vec<HeaderListener>,
    failed: Vec<HeaderListener>,
}

/**
 * Station wide transmit outcome trace. Every queue reports to the same instance.
 * Listeners may report further outcomes or connect new listeners while being notified. A
 * nested notification of the same outcome does not reach the listeners already running.
 */
#[derive(Clone, Default)]
pub struct TxTrace {
    listeners: Rc<RefCell<TxTraceListeners>>,
}

impl TxTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_tx_ok(&self, listener: HeaderListener) {
        self.listeners.borrow_mut().ok.push(listener);
    }

    pub fn connect_tx_failed(&self, listener: HeaderListener) {
        self.listeners.borrow_mut().failed.push(listener);
    }

    pub fn notify_tx_ok(&self, header: &MacHeader) {
        let mut running = std::mem::take(&mut self.listeners.borrow_mut().ok);
        notify_all(&mut running, header);
        let mut listeners = self.listeners.borrow_mut();
        running.append(&mut listeners.ok);
        listeners.ok = running;
    }

    pub fn notify_tx_failed(&self, header: &MacHeader) {
        let mut running = std::mem::take(&mut self.listeners.borrow_mut().failed);
        notify_all(&mut running, header);
        let mut listeners = self.listeners.borrow_mut();
        running.append(&mut listeners.failed);
        listeners.failed = running;
    }
}

fn notify_all(listeners: &mut [HeaderListener], header: &MacHeader) {
    for listener in listeners.iter_mut() {
        listener(header);
    }
}

impl fmt::Debug for TxTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_struct("TxTrace")
            .field("ok", &listeners.ok.len())
            .field("failed", &listeners.failed.len())
            .finish()
    }
}

#[test]
fn test_tx_trace_fans_out() {
    let trace = TxTrace::new();
    let ok = Rc::new(RefCell::new(Vec::new()));
    let failed = Rc::new(RefCell::new(0));
    {
        let ok = ok.clone();
        trace.connect_tx_ok(Box::new(move |header| ok.borrow_mut().push(header.addr1)));
    }
    {
        let failed = failed.clone();
        trace.connect_tx_failed(Box::new(move |_| *failed.borrow_mut() += 1));
    }
    let header = MacHeader::action(
        Mac48Address([2, 0, 0, 0, 0, 1]),
        Mac48Address([2, 0, 0, 0, 0, 2]),
        Mac48Address([2, 0, 0, 0, 0, 2]),
    );
    // Queues hold clones of the station's trace.
    let from_queue = trace.clone();
    from_queue.notify_tx_ok(&header);
    from_queue.notify_tx_failed(&header);
    from_queue.notify_tx_failed(&header);
    assert_eq!(*ok.borrow(), vec![Mac48Address([2, 0, 0, 0, 0, 1])]);
    assert_eq!(*failed.borrow(), 2);
}

#[test]
fn test_tx_trace_nested_notification() {
    let trace = TxTrace::new();
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    {
        // A failed transmission that is retried and succeeds right away.
        let retry = trace.clone();
        let outcomes = outcomes.clone();
        trace.connect_tx_failed(Box::new(move |header| {
            outcomes.borrow_mut().push("failed");
            retry.notify_tx_ok(header);
        }));
    }
    {
        let late = trace.clone();
        let outcomes = outcomes.clone();
        trace.connect_tx_ok(Box::new(move |_| {
            outcomes.borrow_mut().push("ok");
            let outcomes = outcomes.clone();
            late.connect_tx_failed(Box::new(move |_| outcomes.borrow_mut().push("late")));
        }));
    }
    let header = MacHeader::action(
        Mac48Address([2, 0, 0, 0, 0, 1]),
        Mac48Address([2, 0, 0, 0, 0, 2]),
        Mac48Address([2, 0, 0, 0, 0, 2]),
    );
    trace.notify_tx_failed(&header);
    assert_eq!(*outcomes.borrow(), vec!["failed", "ok"]);

    // The listener connected during the first notification is kept, after the original one.
    outcomes.borrow_mut().clear();
    trace.notify_tx_failed(&header);
    assert_eq!(*outcomes.borrow(), vec!["failed", "ok", "late"]);
    assert_eq!(format!("{:?}", trace), "TxTrace { ok: 1, failed: 3 }");
}
