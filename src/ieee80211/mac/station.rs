use crate::ieee80211::action::AddBaRequest;
use crate::ieee80211::frame::MacHeader;
use crate::ieee80211::mac::attributes::{MacAttribute, MacConfig, MacValue, StationType};
use crate::ieee80211::mac::block_ack::{AgreementRole, BlockAckCoordinator};
use crate::ieee80211::mac::collaborators::{
    ChannelAccessManager, LowMac, QueueBindings, RemoteStationManager, TxQueue, TxTrace, WifiPhy,
};
use crate::ieee80211::mac::receive::{self, Dispatch};
use crate::ieee80211::mac::registry::AccessCategoryRegistry;
use crate::ieee80211::phy::PhyStandard;
use crate::ieee80211::services::error::{Error, Result};
use crate::ieee80211::{AccessCategory, Mac48Address, Tid};
use bytes::Bytes;
use log::{debug, error};
use std::convert::TryInto;
use std::rc::Rc;
use std::time::Duration;

/** Delivers (payload, source, destination) to the layer above. */
pub type ForwardUpCallback = Box<dyn FnMut(Bytes, Mac48Address, Mac48Address)>;
pub type LinkCallback = Box<dyn FnMut()>;

/**
 * QoS station MAC: owns the transmit queues and the block ack bookkeeping, and dispatches
 * received control traffic. Timing parameters and addresses are kept by the low MAC and the
 * channel access manager, and only passed through here.
 *
 * After the first fatal error every entry point that returns a `Result` fails with
 * `Error::Halted`.
 */
pub struct RegularWifiMac {
    config: MacConfig,
    low: Rc<dyn LowMac>,
    channel_access: Rc<dyn ChannelAccessManager>,
    phy: Option<Rc<dyn WifiPhy>>,
    station_manager: Option<Rc<dyn RemoteStationManager>>,
    registry: AccessCategoryRegistry,
    block_ack: BlockAckCoordinator,
    tx_trace: TxTrace,
    forward_up: Option<ForwardUpCallback>,
    link_up: Option<LinkCallback>,
    link_down: Option<LinkCallback>,
    halted: bool,
}

impl RegularWifiMac {
    /**
     * Creates the station and its queues. `factory` is called once per queue, in the order
     * DCF, VO, VI, BE, BK.
     */
    pub fn new<F>(
        low: Rc<dyn LowMac>,
        channel_access: Rc<dyn ChannelAccessManager>,
        factory: F,
    ) -> Result<Self>
    where
        F: FnMut(AccessCategory, &QueueBindings) -> Box<dyn TxQueue>,
    {
        let tx_trace = TxTrace::new();
        let bindings = QueueBindings {
            low: low.clone(),
            channel_access: channel_access.clone(),
            tx_trace: tx_trace.clone(),
        };
        let registry = AccessCategoryRegistry::with_queues(bindings, factory)?;
        Ok(RegularWifiMac {
            config: MacConfig::default(),
            low,
            channel_access,
            phy: None,
            station_manager: None,
            registry,
            block_ack: BlockAckCoordinator::new(),
            tx_trace,
            forward_up: None,
            link_up: None,
            link_down: None,
            halted: false,
        })
    }

    fn check_running(&self) -> Result<()> {
        if self.halted {
            Err(Error::Halted)
        } else {
            Ok(())
        }
    }

    fn latch<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                error!("Station {} halted: {}", self.low.address(), err);
                self.halted = true;
            }
        }
        result
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /*=== Receive path ===*/

    pub fn receive(&mut self, packet: Bytes, header: &MacHeader) -> Result<()> {
        self.check_running()?;
        let result = self.dispatch(&packet, header);
        self.latch(result)
    }

    fn dispatch(&mut self, packet: &[u8], header: &MacHeader) -> Result<()> {
        let own = self.low.address();
        match receive::classify(packet, header, own, self.config.qos_supported)? {
            Dispatch::Discard => Ok(()),
            Dispatch::AddBaRequest(from, request) => {
                self.block_ack
                    .on_addba_request(from, &request, &mut self.registry)
            }
            Dispatch::AddBaResponse(from, response) => {
                self.block_ack
                    .on_addba_response(from, &response, &mut self.registry)
            }
            Dispatch::DelBa(from, delba) => {
                self.block_ack.on_delba(from, &delba, &mut self.registry)
            }
        }
    }

    /**
     * Splits a received A-MSDU and forwards every MSDU it contains.
     */
    pub fn deaggregate_and_forward(&mut self, aggregate: Bytes, header: &MacHeader) -> Result<()> {
        self.check_running()?;
        let forward_up = &mut self.forward_up;
        let result = receive::deaggregate_and_forward(&aggregate, header, |packet, from, to| {
            if let Some(forward_up) = forward_up.as_mut() {
                forward_up(packet, from, to);
            }
        })
        .map(|_| ());
        self.latch(result)
    }

    pub fn forward_up(&mut self, packet: Bytes, from: Mac48Address, to: Mac48Address) {
        if let Some(forward_up) = self.forward_up.as_mut() {
            forward_up(packet, from, to);
        }
    }

    pub fn set_forward_up_callback(&mut self, callback: ForwardUpCallback) {
        self.forward_up = Some(callback);
    }

    /*=== Block ack notifications from the queues and the low MAC ===*/

    pub fn notify_addba_request_sent(&mut self, recipient: Mac48Address, request: &AddBaRequest) {
        self.block_ack.on_addba_request_sent(recipient, request);
    }

    pub fn on_block_ack_inactivity_timeout(
        &mut self,
        peer: Mac48Address,
        tid: Tid,
        role: AgreementRole,
    ) -> Result<()> {
        self.check_running()?;
        let result = self
            .block_ack
            .on_inactivity_timeout(peer, tid, role, &mut self.registry);
        self.latch(result)
    }

    pub fn block_ack(&self) -> &BlockAckCoordinator {
        &self.block_ack
    }

    /*=== Transmit side ===*/

    /**
     * This MAC never sends on behalf of another station.
     */
    pub fn supports_send_from(&self) -> bool {
        false
    }

    pub fn enqueue_from(&mut self, _packet: Bytes, _to: Mac48Address, from: Mac48Address) -> Result<()> {
        self.check_running()?;
        let result = Err(Error::SendFromUnsupported(from));
        self.latch(result)
    }

    pub fn dcf(&mut self) -> Result<&mut dyn TxQueue> {
        self.registry.dcf_mut()
    }

    pub fn vo_queue(&mut self) -> Result<&mut dyn TxQueue> {
        self.registry.queue_mut(AccessCategory::Voice)
    }

    pub fn vi_queue(&mut self) -> Result<&mut dyn TxQueue> {
        self.registry.queue_mut(AccessCategory::Video)
    }

    pub fn be_queue(&mut self) -> Result<&mut dyn TxQueue> {
        self.registry.queue_mut(AccessCategory::BestEffort)
    }

    pub fn bk_queue(&mut self) -> Result<&mut dyn TxQueue> {
        self.registry.queue_mut(AccessCategory::Background)
    }

    pub fn tx_trace(&self) -> &TxTrace {
        &self.tx_trace
    }

    pub fn start(&mut self) -> Result<()> {
        self.check_running()?;
        self.registry.start();
        Ok(())
    }

    /*=== Link state ===*/

    pub fn set_link_up_callback(&mut self, callback: LinkCallback) {
        self.link_up = Some(callback);
    }

    pub fn set_link_down_callback(&mut self, callback: LinkCallback) {
        self.link_down = Some(callback);
    }

    pub fn notify_link_up(&mut self) {
        if let Some(link_up) = self.link_up.as_mut() {
            link_up();
        }
    }

    pub fn notify_link_down(&mut self) {
        if let Some(link_down) = self.link_down.as_mut() {
            link_down();
        }
    }

    /*=== Configuration ===*/

    pub fn configure_standard(&mut self, standard: PhyStandard) -> Result<()> {
        self.check_running()?;
        let result = self.registry.apply_standard(standard).map(|_| ());
        if result.is_ok() {
            self.config.standard = Some(standard);
        }
        self.latch(result)
    }

    /**
     * Applies the standard reported by the attached PHY, if any.
     */
    pub fn configure_standard_from_phy(&mut self) -> Result<()> {
        match self.phy.as_ref().map(|phy| phy.standard()) {
            Some(standard) => self.configure_standard(standard),
            None => {
                self.check_running()?;
                Err(Error::InvalidParameter(MacAttribute::PhyStandard))
            }
        }
    }

    pub fn set_wifi_phy(&mut self, phy: Rc<dyn WifiPhy>) {
        debug!("Attaching phy ({:?})", phy.standard());
        self.channel_access.setup_phy_listener(phy.clone());
        self.low.set_phy(phy.clone());
        self.phy = Some(phy);
    }

    pub fn wifi_phy(&self) -> Option<Rc<dyn WifiPhy>> {
        self.phy.clone()
    }

    pub fn set_wifi_remote_station_manager(&mut self, manager: Rc<dyn RemoteStationManager>) {
        self.low.set_remote_station_manager(manager.clone());
        self.registry.set_remote_station_manager(manager.clone());
        self.station_manager = Some(manager);
    }

    pub fn wifi_remote_station_manager(&self) -> Option<Rc<dyn RemoteStationManager>> {
        self.station_manager.clone()
    }

    pub fn set_qos_supported(&mut self, enable: bool) {
        self.config.qos_supported = enable;
    }

    pub fn qos_supported(&self) -> bool {
        self.config.qos_supported
    }

    pub fn set_type_of_station(&mut self, station_type: StationType) {
        self.config.type_of_station = station_type;
        self.registry.set_type_of_station(station_type);
    }

    pub fn type_of_station(&self) -> StationType {
        self.config.type_of_station
    }

    pub fn set_ssid(&mut self, ssid: String) {
        self.config.ssid = ssid;
    }

    pub fn ssid(&self) -> &str {
        &self.config.ssid
    }

    pub fn set_address(&mut self, address: Mac48Address) {
        self.low.set_address(address);
    }

    pub fn address(&self) -> Mac48Address {
        self.low.address()
    }

    pub fn set_bssid(&mut self, bssid: Mac48Address) {
        self.low.set_bssid(bssid);
    }

    pub fn bssid(&self) -> Mac48Address {
        self.low.bssid()
    }

    pub fn set_promisc(&mut self) {
        self.low.set_promisc();
    }

    pub fn set_slot(&mut self, slot: Duration) {
        self.channel_access.set_slot(slot);
        self.low.set_slot_time(slot);
    }

    pub fn slot(&self) -> Duration {
        self.low.slot_time()
    }

    pub fn set_sifs(&mut self, sifs: Duration) {
        self.channel_access.set_sifs(sifs);
        self.low.set_sifs(sifs);
    }

    pub fn sifs(&self) -> Duration {
        self.low.sifs()
    }

    pub fn set_eifs_no_difs(&mut self, eifs_no_difs: Duration) {
        self.channel_access.set_eifs_no_difs(eifs_no_difs);
    }

    pub fn eifs_no_difs(&self) -> Duration {
        self.channel_access.eifs_no_difs()
    }

    pub fn set_pifs(&mut self, pifs: Duration) {
        self.low.set_pifs(pifs);
    }

    pub fn pifs(&self) -> Duration {
        self.low.pifs()
    }

    pub fn set_ack_timeout(&mut self, timeout: Duration) {
        self.low.set_ack_timeout(timeout);
    }

    pub fn ack_timeout(&self) -> Duration {
        self.low.ack_timeout()
    }

    pub fn set_cts_timeout(&mut self, timeout: Duration) {
        self.low.set_cts_timeout(timeout);
    }

    pub fn cts_timeout(&self) -> Duration {
        self.low.cts_timeout()
    }

    pub fn set_basic_block_ack_timeout(&mut self, timeout: Duration) {
        self.low.set_basic_block_ack_timeout(timeout);
    }

    pub fn basic_block_ack_timeout(&self) -> Duration {
        self.low.basic_block_ack_timeout()
    }

    pub fn set_compressed_block_ack_timeout(&mut self, timeout: Duration) {
        self.low.set_compressed_block_ack_timeout(timeout);
    }

    pub fn compressed_block_ack_timeout(&self) -> Duration {
        self.low.compressed_block_ack_timeout()
    }

    pub fn get(&self, attribute: MacAttribute) -> Result<MacValue> {
        match attribute {
            MacAttribute::QosSupported => Ok(self.qos_supported().into()),
            MacAttribute::Ssid => Ok(self.config.ssid.clone().into()),
            MacAttribute::Address => Ok(self.address().into()),
            MacAttribute::Bssid => Ok(self.bssid().into()),
            MacAttribute::Promiscuous => Err(Error::WriteOnly(attribute)),
            MacAttribute::TypeOfStation => Ok(self.type_of_station().into()),
            MacAttribute::PhyStandard => Ok(self.config.standard.into()),
            MacAttribute::Slot => Ok(self.slot().into()),
            MacAttribute::Sifs => Ok(self.sifs().into()),
            MacAttribute::Pifs => Ok(self.pifs().into()),
            MacAttribute::EifsNoDifs => Ok(self.eifs_no_difs().into()),
            MacAttribute::AckTimeout => Ok(self.ack_timeout().into()),
            MacAttribute::CtsTimeout => Ok(self.cts_timeout().into()),
            MacAttribute::BasicBlockAckTimeout => Ok(self.basic_block_ack_timeout().into()),
            MacAttribute::CompressedBlockAckTimeout => {
                Ok(self.compressed_block_ack_timeout().into())
            }
        }
    }

    pub fn set(&mut self, attribute: MacAttribute, value: MacValue) -> Result<()> {
        self.check_running()?;
        let invalid = Error::InvalidParameter(attribute);
        match attribute {
            MacAttribute::QosSupported => {
                self.set_qos_supported(value.try_into().or(Err(invalid))?)
            }
            MacAttribute::Ssid => self.set_ssid(value.try_into().or(Err(invalid))?),
            MacAttribute::Address => self.set_address(value.try_into().or(Err(invalid))?),
            MacAttribute::Bssid => self.set_bssid(value.try_into().or(Err(invalid))?),
            MacAttribute::Promiscuous => {
                let enable: bool = value.try_into().or(Err(invalid.clone()))?;
                if !enable {
                    return Err(invalid);
                }
                self.set_promisc()
            }
            MacAttribute::TypeOfStation => {
                self.set_type_of_station(value.try_into().or(Err(invalid))?)
            }
            MacAttribute::PhyStandard => {
                return self.configure_standard(value.try_into().or(Err(invalid))?)
            }
            MacAttribute::Slot => self.set_slot(value.try_into().or(Err(invalid))?),
            MacAttribute::Sifs => self.set_sifs(value.try_into().or(Err(invalid))?),
            MacAttribute::Pifs => self.set_pifs(value.try_into().or(Err(invalid))?),
            MacAttribute::EifsNoDifs => self.set_eifs_no_difs(value.try_into().or(Err(invalid))?),
            MacAttribute::AckTimeout => self.set_ack_timeout(value.try_into().or(Err(invalid))?),
            MacAttribute::CtsTimeout => self.set_cts_timeout(value.try_into().or(Err(invalid))?),
            MacAttribute::BasicBlockAckTimeout => {
                self.set_basic_block_ack_timeout(value.try_into().or(Err(invalid))?)
            }
            MacAttribute::CompressedBlockAckTimeout => {
                self.set_compressed_block_ack_timeout(value.try_into().or(Err(invalid))?)
            }
        }
        Ok(())
    }
}
