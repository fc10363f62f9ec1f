use crate::ieee80211::mac::attributes::StationType;
use crate::ieee80211::mac::collaborators::{QueueBindings, RemoteStationManager, TxQueue};
use crate::ieee80211::phy::{ContentionWindow, PhyStandard};
use crate::ieee80211::services::error::{Error, Result};
use crate::ieee80211::AccessCategory;
use log::debug;
use std::rc::Rc;

/**
 * Owns the transmit queues: one per QoS access category plus the non-QoS default queue
 * (the DCF), which is kept under `AccessCategory::BestEffortNonQos`.
 */
pub struct AccessCategoryRegistry {
    bindings: QueueBindings,
    queues: [Option<Box<dyn TxQueue>>; 5],
}

impl AccessCategoryRegistry {
    pub fn new(bindings: QueueBindings) -> Self {
        AccessCategoryRegistry {
            bindings,
            queues: [None, None, None, None, None],
        }
    }

    /**
     * Creates the DCF followed by the EDCA queues, highest priority first.
     */
    pub fn with_queues<F>(bindings: QueueBindings, mut factory: F) -> Result<Self>
    where
        F: FnMut(AccessCategory, &QueueBindings) -> Box<dyn TxQueue>,
    {
        let mut registry = Self::new(bindings);
        registry.create_queue(AccessCategory::BestEffortNonQos, &mut factory)?;
        for ac in AccessCategory::EDCA.iter() {
            registry.create_queue(*ac, &mut factory)?;
        }
        Ok(registry)
    }

    pub fn bindings(&self) -> &QueueBindings {
        &self.bindings
    }

    pub fn create_queue<F>(&mut self, ac: AccessCategory, factory: &mut F) -> Result<()>
    where
        F: FnMut(AccessCategory, &QueueBindings) -> Box<dyn TxQueue>,
    {
        if self.queues[ac.index()].is_some() {
            return Err(Error::DuplicateQueue(ac));
        }
        let queue = factory(ac, &self.bindings);
        self.register_queue(ac, queue)
    }

    pub fn register_queue(&mut self, ac: AccessCategory, mut queue: Box<dyn TxQueue>) -> Result<()> {
        let slot = &mut self.queues[ac.index()];
        if slot.is_some() {
            return Err(Error::DuplicateQueue(ac));
        }
        debug!("Registering transmit queue for {}", ac);
        queue.set_access_category(ac);
        *slot = Some(queue);
        Ok(())
    }

    pub fn contains(&self, ac: AccessCategory) -> bool {
        self.queues[ac.index()].is_some()
    }

    pub fn queue(&self, ac: AccessCategory) -> Result<&dyn TxQueue> {
        match &self.queues[ac.index()] {
            Some(queue) => Ok(queue.as_ref()),
            None => Err(Error::MissingQueue(ac)),
        }
    }

    pub fn queue_mut(&mut self, ac: AccessCategory) -> Result<&mut dyn TxQueue> {
        match &mut self.queues[ac.index()] {
            Some(queue) => Ok(queue.as_mut()),
            None => Err(Error::MissingQueue(ac)),
        }
    }

    pub fn dcf_mut(&mut self) -> Result<&mut dyn TxQueue> {
        self.queue_mut(AccessCategory::BestEffortNonQos)
    }

    fn edca_queues_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn TxQueue>> {
        self.queues[..AccessCategory::EDCA.len()]
            .iter_mut()
            .filter_map(Option::as_mut)
    }

    pub fn set_type_of_station(&mut self, station_type: StationType) {
        for queue in self.queues.iter_mut().filter_map(Option::as_mut) {
            queue.set_type_of_station(station_type);
        }
    }

    pub fn set_remote_station_manager(&mut self, manager: Rc<dyn RemoteStationManager>) {
        for queue in self.queues.iter_mut().filter_map(Option::as_mut) {
            queue.set_remote_station_manager(manager.clone());
        }
    }

    /**
     * Configures every queue for the given PHY standard. Fails, leaving all queues untouched,
     * if the standard is not supported or a queue is missing.
     */
    pub fn apply_standard(&mut self, standard: PhyStandard) -> Result<ContentionWindow> {
        let cw = ContentionWindow::for_standard(standard)?;
        if let Some(ac) = std::iter::once(AccessCategory::BestEffortNonQos)
            .chain(AccessCategory::EDCA.iter().cloned())
            .find(|ac| !self.contains(*ac))
        {
            return Err(Error::MissingQueue(ac));
        }
        debug!(
            "Applying {:?}: cw_min={} cw_max={}",
            standard, cw.cw_min, cw.cw_max
        );
        self.dcf_mut()?
            .configure_dcf(cw, AccessCategory::BestEffortNonQos);
        for ac in AccessCategory::EDCA.iter() {
            let queue = self.queue_mut(*ac)?;
            if standard == PhyStandard::Ieee80211pCch {
                queue.configure_cch_dcf(cw, *ac);
            } else {
                queue.configure_dcf(cw, *ac);
            }
        }
        Ok(cw)
    }

    pub fn start(&mut self) {
        if let Some(dcf) = self.queues[AccessCategory::BestEffortNonQos.index()].as_mut() {
            dcf.start();
        }
        for queue in self.edca_queues_mut() {
            queue.start();
        }
    }
}
