use crate::ieee80211::action::{AddBaResponse, DelBa};
use crate::ieee80211::frame::MacHeader;
use crate::ieee80211::mac::attributes::StationType;
use crate::ieee80211::mac::collaborators::{
    ChannelAccessManager, LowMac, QueueBindings, RemoteStationManager, TxQueue, WifiPhy,
};
use crate::ieee80211::phy::{EdcaParameters, PhyStandard};
use crate::ieee80211::{AccessCategory, Mac48Address, Tid};
use bytes::Bytes;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/**
 * Every call the fakes below receive, in order.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    QueueCreated(AccessCategory),
    Start(AccessCategory),
    StationType(AccessCategory, StationType),
    QueueStationManager(AccessCategory),
    Edca(AccessCategory, EdcaParameters),
    Queue(AccessCategory, Bytes, MacHeader),
    PushFront(AccessCategory, Bytes, MacHeader),
    GotAddBaResponse(AccessCategory, AddBaResponse, Mac48Address),
    GotDelBa(AccessCategory, DelBa, Mac48Address),
    CreateAgreement(AddBaResponse, Mac48Address, u16),
    DestroyAgreement(Mac48Address, Tid),
    LowStationManager,
    LowPhy(PhyStandard),
    PhyListener(PhyStandard),
    Promisc,
}

#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn take(&self) -> Vec<Event> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

pub fn address(last: u8) -> Mac48Address {
    Mac48Address([0x02, 0x00, 0x00, 0x00, 0x00, last])
}

pub fn tid(value: u8) -> Tid {
    Tid::new(value).unwrap()
}

pub struct FakeQueue {
    ac: AccessCategory,
    log: EventLog,
    pub bindings: QueueBindings,
}

impl TxQueue for FakeQueue {
    fn start(&mut self) {
        self.log.push(Event::Start(self.ac));
    }
    fn set_access_category(&mut self, ac: AccessCategory) {
        self.ac = ac;
    }
    fn set_type_of_station(&mut self, station_type: StationType) {
        self.log.push(Event::StationType(self.ac, station_type));
    }
    fn set_remote_station_manager(&mut self, _manager: Rc<dyn RemoteStationManager>) {
        self.log.push(Event::QueueStationManager(self.ac));
    }
    fn set_edca_parameters(&mut self, parameters: EdcaParameters) {
        self.log.push(Event::Edca(self.ac, parameters));
    }
    fn queue(&mut self, packet: Bytes, header: MacHeader) {
        self.log.push(Event::Queue(self.ac, packet, header));
    }
    fn push_front(&mut self, packet: Bytes, header: MacHeader) {
        self.log.push(Event::PushFront(self.ac, packet, header));
    }
    fn got_addba_response(&mut self, response: &AddBaResponse, recipient: Mac48Address) {
        self.log
            .push(Event::GotAddBaResponse(self.ac, *response, recipient));
    }
    fn got_delba_frame(&mut self, delba: &DelBa, recipient: Mac48Address) {
        self.log.push(Event::GotDelBa(self.ac, *delba, recipient));
    }
}

/**
 * Factory handed to the registry, records the creation order.
 */
pub fn fake_queue_factory(
    log: &EventLog,
) -> impl FnMut(AccessCategory, &QueueBindings) -> Box<dyn TxQueue> {
    let log = log.clone();
    move |ac, bindings| {
        log.push(Event::QueueCreated(ac));
        Box::new(FakeQueue {
            ac,
            log: log.clone(),
            bindings: bindings.clone(),
        })
    }
}

pub struct FakeLowMac {
    log: EventLog,
    address: Cell<Mac48Address>,
    bssid: Cell<Mac48Address>,
    slot: Cell<Duration>,
    sifs: Cell<Duration>,
    pifs: Cell<Duration>,
    ack_timeout: Cell<Duration>,
    cts_timeout: Cell<Duration>,
    basic_block_ack_timeout: Cell<Duration>,
    compressed_block_ack_timeout: Cell<Duration>,
}

impl FakeLowMac {
    pub fn new(log: &EventLog, address: Mac48Address) -> Self {
        FakeLowMac {
            log: log.clone(),
            address: Cell::new(address),
            bssid: Cell::new(Mac48Address::default()),
            slot: Cell::new(Duration::default()),
            sifs: Cell::new(Duration::default()),
            pifs: Cell::new(Duration::default()),
            ack_timeout: Cell::new(Duration::default()),
            cts_timeout: Cell::new(Duration::default()),
            basic_block_ack_timeout: Cell::new(Duration::default()),
            compressed_block_ack_timeout: Cell::new(Duration::default()),
        }
    }
}

impl LowMac for FakeLowMac {
    fn set_address(&self, address: Mac48Address) {
        self.address.set(address);
    }
    fn address(&self) -> Mac48Address {
        self.address.get()
    }
    fn set_bssid(&self, bssid: Mac48Address) {
        self.bssid.set(bssid);
    }
    fn bssid(&self) -> Mac48Address {
        self.bssid.get()
    }
    fn set_promisc(&self) {
        self.log.push(Event::Promisc);
    }
    fn set_slot_time(&self, slot: Duration) {
        self.slot.set(slot);
    }
    fn slot_time(&self) -> Duration {
        self.slot.get()
    }
    fn set_sifs(&self, sifs: Duration) {
        self.sifs.set(sifs);
    }
    fn sifs(&self) -> Duration {
        self.sifs.get()
    }
    fn set_pifs(&self, pifs: Duration) {
        self.pifs.set(pifs);
    }
    fn pifs(&self) -> Duration {
        self.pifs.get()
    }
    fn set_ack_timeout(&self, timeout: Duration) {
        self.ack_timeout.set(timeout);
    }
    fn ack_timeout(&self) -> Duration {
        self.ack_timeout.get()
    }
    fn set_cts_timeout(&self, timeout: Duration) {
        self.cts_timeout.set(timeout);
    }
    fn cts_timeout(&self) -> Duration {
        self.cts_timeout.get()
    }
    fn set_basic_block_ack_timeout(&self, timeout: Duration) {
        self.basic_block_ack_timeout.set(timeout);
    }
    fn basic_block_ack_timeout(&self) -> Duration {
        self.basic_block_ack_timeout.get()
    }
    fn set_compressed_block_ack_timeout(&self, timeout: Duration) {
        self.compressed_block_ack_timeout.set(timeout);
    }
    fn compressed_block_ack_timeout(&self) -> Duration {
        self.compressed_block_ack_timeout.get()
    }
    fn set_phy(&self, phy: Rc<dyn WifiPhy>) {
        self.log.push(Event::LowPhy(phy.standard()));
    }
    fn set_remote_station_manager(&self, _manager: Rc<dyn RemoteStationManager>) {
        self.log.push(Event::LowStationManager);
    }
    fn create_block_ack_agreement(
        &self,
        response: &AddBaResponse,
        originator: Mac48Address,
        starting_sequence: u16,
    ) {
        self.log.push(Event::CreateAgreement(
            *response,
            originator,
            starting_sequence,
        ));
    }
    fn destroy_block_ack_agreement(&self, originator: Mac48Address, tid: Tid) {
        self.log.push(Event::DestroyAgreement(originator, tid));
    }
}

pub struct FakeChannelAccess {
    log: EventLog,
    pub slot: Cell<Duration>,
    pub sifs: Cell<Duration>,
    eifs_no_difs: Cell<Duration>,
}

impl FakeChannelAccess {
    pub fn new(log: &EventLog) -> Self {
        FakeChannelAccess {
            log: log.clone(),
            slot: Cell::new(Duration::default()),
            sifs: Cell::new(Duration::default()),
            eifs_no_difs: Cell::new(Duration::default()),
        }
    }
}

impl ChannelAccessManager for FakeChannelAccess {
    fn set_slot(&self, slot: Duration) {
        self.slot.set(slot);
    }
    fn set_sifs(&self, sifs: Duration) {
        self.sifs.set(sifs);
    }
    fn set_eifs_no_difs(&self, eifs_no_difs: Duration) {
        self.eifs_no_difs.set(eifs_no_difs);
    }
    fn eifs_no_difs(&self) -> Duration {
        self.eifs_no_difs.get()
    }
    fn setup_phy_listener(&self, phy: Rc<dyn WifiPhy>) {
        self.log.push(Event::PhyListener(phy.standard()));
    }
}

#[derive(Debug)]
pub struct FakePhy(pub PhyStandard);

impl WifiPhy for FakePhy {
    fn standard(&self) -> PhyStandard {
        self.0
    }
}

#[derive(Debug)]
pub struct FakeStationManager;

impl RemoteStationManager for FakeStationManager {}

pub fn bindings(log: &EventLog, own: Mac48Address) -> QueueBindings {
    QueueBindings {
        low: Rc::new(FakeLowMac::new(log, own)),
        channel_access: Rc::new(FakeChannelAccess::new(log)),
        tx_trace: Default::default(),
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
