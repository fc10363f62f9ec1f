use crate::ieee80211::action::{
    ActionFrame, AddBaRequest, AddBaResponse, BlockAckFrame, BlockAckPolicy, DelBa, ReasonCode,
    StatusCode,
};
use crate::ieee80211::frame::MacHeader;
use crate::ieee80211::mac::registry::AccessCategoryRegistry;
use crate::ieee80211::services::error::Result;
use crate::ieee80211::{Mac48Address, Tid};
use crate::parse_serialize::Serialize;
use bytes::Bytes;
use log::{debug, warn};
use std::collections::HashMap;

/**
 * Reorder buffer size advertised to every originator. (1023 + 1) is a multiple of 16, as
 * required for the sequence number space.
 */
pub const RECIPIENT_BUFFER_SIZE: u16 = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgreementRole {
    /** We send the data and receive the block acks */
    Originator,
    /** We receive the data and send the block acks */
    Recipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgreementState {
    Requested,
    Established,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Agreement {
    pub state: AgreementState,
    pub dialog_token: u8,
    pub policy: BlockAckPolicy,
    pub amsdu_supported: bool,
    pub buffer_size: u16,
    pub timeout: u16,
    pub starting_sequence: Option<u16>,
}

/**
 * Builds the response to an ADDBA request. Every request is accepted, everything but the
 * buffer size is mirrored.
 */
pub fn accept(request: &AddBaRequest) -> AddBaResponse {
    AddBaResponse {
        dialog_token: request.dialog_token,
        status: StatusCode::SUCCESS,
        amsdu_supported: request.amsdu_supported,
        policy: request.policy,
        tid: request.tid,
        buffer_size: RECIPIENT_BUFFER_SIZE,
        timeout: request.timeout,
    }
}

type AgreementKey = (Mac48Address, Tid, AgreementRole);

/**
 * Tracks block ack agreements per (peer, TID, role) and performs the side effects of setting
 * them up and tearing them down. Originator and recipient agreements with the same peer and
 * TID are independent of each other.
 */
#[derive(Debug, Default)]
pub struct BlockAckCoordinator {
    agreements: HashMap<AgreementKey, Agreement>,
}

impl BlockAckCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agreement(&self, peer: Mac48Address, tid: Tid, role: AgreementRole) -> Option<&Agreement> {
        self.agreements.get(&(peer, tid, role))
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }

    /**
     * Called by an originating queue after it sent an ADDBA request.
     */
    pub fn on_addba_request_sent(&mut self, recipient: Mac48Address, request: &AddBaRequest) {
        debug!("ADDBA request sent to {} for TID {}", recipient, request.tid.value());
        self.agreements.insert(
            (recipient, request.tid, AgreementRole::Originator),
            Agreement {
                state: AgreementState::Requested,
                dialog_token: request.dialog_token,
                policy: request.policy,
                amsdu_supported: request.amsdu_supported,
                buffer_size: request.buffer_size,
                timeout: request.timeout,
                starting_sequence: Some(request.starting_sequence),
            },
        );
    }

    /**
     * Accepts the request, sets up the reordering state in the low MAC and puts the response
     * at the head of the queue the TID maps to.
     */
    pub fn on_addba_request(
        &mut self,
        originator: Mac48Address,
        request: &AddBaRequest,
        registry: &mut AccessCategoryRegistry,
    ) -> Result<()> {
        let low = registry.bindings().low.clone();
        let own = low.address();
        let response = accept(request);

        let header = MacHeader::action(originator, own, own);
        let body = ActionFrame::BlockAck(BlockAckFrame::AddBaResponse(response)).serialize()?;
        let queue = registry.queue_mut(request.tid.access_category())?;

        debug!(
            "Accepting block ack from {} for TID {} (ssn {})",
            originator,
            request.tid.value(),
            request.starting_sequence
        );
        low.create_block_ack_agreement(&response, originator, request.starting_sequence);
        queue.push_front(Bytes::from(body), header);

        self.agreements.insert(
            (originator, request.tid, AgreementRole::Recipient),
            Agreement {
                state: AgreementState::Established,
                dialog_token: response.dialog_token,
                policy: response.policy,
                amsdu_supported: response.amsdu_supported,
                buffer_size: response.buffer_size,
                timeout: response.timeout,
                starting_sequence: Some(request.starting_sequence),
            },
        );
        Ok(())
    }

    /**
     * The status of the response is not inspected, it is handed to the queue as is.
     */
    pub fn on_addba_response(
        &mut self,
        recipient: Mac48Address,
        response: &AddBaResponse,
        registry: &mut AccessCategoryRegistry,
    ) -> Result<()> {
        registry
            .queue_mut(response.tid.access_category())?
            .got_addba_response(response, recipient);

        let key = (recipient, response.tid, AgreementRole::Originator);
        let starting_sequence = self
            .agreements
            .get(&key)
            .and_then(|agreement| agreement.starting_sequence);
        debug!(
            "Block ack with {} for TID {} established",
            recipient,
            response.tid.value()
        );
        self.agreements.insert(
            key,
            Agreement {
                state: AgreementState::Established,
                dialog_token: response.dialog_token,
                policy: response.policy,
                amsdu_supported: response.amsdu_supported,
                buffer_size: response.buffer_size,
                timeout: response.timeout,
                starting_sequence,
            },
        );
        Ok(())
    }

    /**
     * A DELBA from the originator tears down an agreement we are the recipient of, otherwise
     * it tears down one we originated.
     */
    pub fn on_delba(
        &mut self,
        peer: Mac48Address,
        delba: &DelBa,
        registry: &mut AccessCategoryRegistry,
    ) -> Result<()> {
        let role = if delba.initiator {
            registry
                .bindings()
                .low
                .destroy_block_ack_agreement(peer, delba.tid);
            AgreementRole::Recipient
        } else {
            registry
                .queue_mut(delba.tid.access_category())?
                .got_delba_frame(delba, peer);
            AgreementRole::Originator
        };
        match self.agreements.remove(&(peer, delba.tid, role)) {
            Some(_) => debug!(
                "Block ack with {} for TID {} torn down ({:?}, reason {})",
                peer,
                delba.tid.value(),
                role,
                delba.reason.0
            ),
            None => warn!(
                "DELBA from {} for TID {} without a {:?} agreement",
                peer,
                delba.tid.value(),
                role
            ),
        }
        Ok(())
    }

    /**
     * Inactivity timeout reported by the low MAC. Handled as if the peer had sent a DELBA.
     */
    pub fn on_inactivity_timeout(
        &mut self,
        peer: Mac48Address,
        tid: Tid,
        role: AgreementRole,
        registry: &mut AccessCategoryRegistry,
    ) -> Result<()> {
        let delba = DelBa {
            initiator: role == AgreementRole::Recipient,
            tid,
            reason: ReasonCode::TIMEOUT,
        };
        self.on_delba(peer, &delba, registry)
    }
}

#[cfg(test)]
mod tests;
