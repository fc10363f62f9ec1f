use crate::ieee80211::action::{
    ActionFrame, AddBaRequest, AddBaResponse, BlockAckFrame, BlockAckPolicy, DelBa, ReasonCode,
    StatusCode,
};
use crate::ieee80211::frame::MacHeader;
use crate::ieee80211::mac::block_ack::{
    accept, AgreementRole, AgreementState, BlockAckCoordinator, RECIPIENT_BUFFER_SIZE,
};
use crate::ieee80211::mac::registry::AccessCategoryRegistry;
use crate::ieee80211::mac::testing::*;
use crate::ieee80211::services::error::Error;
use crate::ieee80211::AccessCategory;
use crate::parse_serialize::Deserialize;

const OWN: u8 = 1;
const PEER: u8 = 2;

fn setup() -> (EventLog, AccessCategoryRegistry, BlockAckCoordinator) {
    init_logging();
    let log = EventLog::default();
    let registry =
        AccessCategoryRegistry::with_queues(bindings(&log, address(OWN)), fake_queue_factory(&log))
            .unwrap();
    log.take();
    (log, registry, BlockAckCoordinator::new())
}

fn request(tid_value: u8) -> AddBaRequest {
    AddBaRequest {
        dialog_token: 7,
        amsdu_supported: true,
        policy: BlockAckPolicy::Immediate,
        tid: tid(tid_value),
        buffer_size: 64,
        timeout: 100,
        starting_sequence: 1234,
    }
}

fn response(tid_value: u8) -> AddBaResponse {
    AddBaResponse {
        dialog_token: 3,
        status: StatusCode::SUCCESS,
        amsdu_supported: false,
        policy: BlockAckPolicy::Delayed,
        tid: tid(tid_value),
        buffer_size: 32,
        timeout: 0,
    }
}

#[test]
fn test_accept_mirrors_request() {
    let mut req = request(5);
    let resp = accept(&req);
    assert_eq!(resp.status, StatusCode::SUCCESS);
    assert_eq!(resp.dialog_token, 7);
    assert!(resp.amsdu_supported);
    assert_eq!(resp.policy, BlockAckPolicy::Immediate);
    assert_eq!(resp.tid, tid(5));
    assert_eq!(resp.buffer_size, 1023);
    assert_eq!(resp.timeout, 100);
    assert_eq!((RECIPIENT_BUFFER_SIZE + 1) % 16, 0);

    req.amsdu_supported = false;
    req.policy = BlockAckPolicy::Delayed;
    let resp = accept(&req);
    assert!(!resp.amsdu_supported);
    assert_eq!(resp.policy, BlockAckPolicy::Delayed);
}

#[test]
fn test_addba_request() {
    let (log, mut registry, mut coordinator) = setup();
    let req = request(6);
    coordinator
        .on_addba_request(address(PEER), &req, &mut registry)
        .unwrap();

    let events = log.take();
    assert_eq!(events.len(), 2);
    let expected_response = accept(&req);
    assert_eq!(
        events[0],
        Event::CreateAgreement(expected_response, address(PEER), 1234)
    );
    match &events[1] {
        Event::PushFront(ac, packet, header) => {
            assert_eq!(*ac, AccessCategory::Voice);
            assert_eq!(
                *header,
                MacHeader::action(address(PEER), address(OWN), address(OWN))
            );
            assert!(!header.to_ds && !header.from_ds);
            assert_eq!(
                ActionFrame::deserialize_complete(packet).unwrap(),
                ActionFrame::BlockAck(BlockAckFrame::AddBaResponse(expected_response))
            );
        }
        other => panic!("Unexpected event {:?}", other),
    }

    let agreement = coordinator
        .agreement(address(PEER), tid(6), AgreementRole::Recipient)
        .unwrap();
    assert_eq!(agreement.state, AgreementState::Established);
    assert_eq!(agreement.buffer_size, 1023);
    assert_eq!(agreement.starting_sequence, Some(1234));
    assert!(coordinator
        .agreement(address(PEER), tid(6), AgreementRole::Originator)
        .is_none());
}

#[test]
fn test_addba_request_selects_queue_by_tid() {
    let expected = [
        (0, AccessCategory::BestEffort),
        (1, AccessCategory::Background),
        (4, AccessCategory::Video),
        (7, AccessCategory::Voice),
    ];
    for (tid_value, expected_ac) in expected.iter() {
        let (log, mut registry, mut coordinator) = setup();
        coordinator
            .on_addba_request(address(PEER), &request(*tid_value), &mut registry)
            .unwrap();
        let pushed: Vec<AccessCategory> = log
            .take()
            .into_iter()
            .filter_map(|event| match event {
                Event::PushFront(ac, _, _) => Some(ac),
                _ => None,
            })
            .collect();
        assert_eq!(pushed, vec![*expected_ac]);
    }
}

#[test]
fn test_addba_response() {
    let (log, mut registry, mut coordinator) = setup();
    let mut req = request(2);
    req.dialog_token = 3;
    coordinator.on_addba_request_sent(address(PEER), &req);
    assert_eq!(
        coordinator
            .agreement(address(PEER), tid(2), AgreementRole::Originator)
            .map(|agreement| agreement.state),
        Some(AgreementState::Requested)
    );

    let resp = response(2);
    coordinator
        .on_addba_response(address(PEER), &resp, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::GotAddBaResponse(
            AccessCategory::Background,
            resp,
            address(PEER)
        )]
    );
    let agreement = coordinator
        .agreement(address(PEER), tid(2), AgreementRole::Originator)
        .unwrap();
    assert_eq!(agreement.state, AgreementState::Established);
    assert_eq!(agreement.buffer_size, 32);
    assert_eq!(agreement.starting_sequence, Some(1234));
}

#[test]
fn test_addba_response_status_not_inspected() {
    let (log, mut registry, mut coordinator) = setup();
    let mut resp = response(4);
    resp.status = StatusCode::REFUSED;
    coordinator
        .on_addba_response(address(PEER), &resp, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::GotAddBaResponse(
            AccessCategory::Video,
            resp,
            address(PEER)
        )]
    );
}

#[test]
fn test_delba_from_originator() {
    let (log, mut registry, mut coordinator) = setup();
    coordinator
        .on_addba_request(address(PEER), &request(0), &mut registry)
        .unwrap();
    coordinator
        .on_addba_response(address(PEER), &response(0), &mut registry)
        .unwrap();
    log.take();

    let delba = DelBa {
        initiator: true,
        tid: tid(0),
        reason: ReasonCode::END_BLOCK_ACK,
    };
    coordinator
        .on_delba(address(PEER), &delba, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::DestroyAgreement(address(PEER), tid(0))]
    );
    assert!(coordinator
        .agreement(address(PEER), tid(0), AgreementRole::Recipient)
        .is_none());
    // Our own agreement in the other direction is unaffected.
    assert!(coordinator
        .agreement(address(PEER), tid(0), AgreementRole::Originator)
        .is_some());
}

#[test]
fn test_delba_from_recipient() {
    let (log, mut registry, mut coordinator) = setup();
    coordinator
        .on_addba_response(address(PEER), &response(5), &mut registry)
        .unwrap();
    log.take();

    let delba = DelBa {
        initiator: false,
        tid: tid(5),
        reason: ReasonCode::UNSPECIFIED,
    };
    coordinator
        .on_delba(address(PEER), &delba, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::GotDelBa(AccessCategory::Video, delba, address(PEER))]
    );
    assert!(coordinator.is_empty());
}

#[test]
fn test_delba_without_agreement_is_forwarded() {
    let (log, mut registry, mut coordinator) = setup();
    let delba = DelBa {
        initiator: true,
        tid: tid(3),
        reason: ReasonCode::UNKNOWN_BLOCK_ACK,
    };
    coordinator
        .on_delba(address(PEER), &delba, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::DestroyAgreement(address(PEER), tid(3))]
    );
}

#[test]
fn test_inactivity_timeout() {
    let (log, mut registry, mut coordinator) = setup();
    coordinator
        .on_addba_request(address(PEER), &request(1), &mut registry)
        .unwrap();
    coordinator
        .on_addba_response(address(PEER), &response(1), &mut registry)
        .unwrap();
    log.take();

    coordinator
        .on_inactivity_timeout(address(PEER), tid(1), AgreementRole::Recipient, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::DestroyAgreement(address(PEER), tid(1))]
    );

    coordinator
        .on_inactivity_timeout(address(PEER), tid(1), AgreementRole::Originator, &mut registry)
        .unwrap();
    assert_eq!(
        log.take(),
        vec![Event::GotDelBa(
            AccessCategory::Background,
            DelBa {
                initiator: false,
                tid: tid(1),
                reason: ReasonCode::TIMEOUT,
            },
            address(PEER)
        )]
    );
    assert!(coordinator.is_empty());
}

#[test]
fn test_missing_queue_has_no_side_effects() {
    init_logging();
    let log = EventLog::default();
    let mut registry = AccessCategoryRegistry::new(bindings(&log, address(OWN)));
    let mut coordinator = BlockAckCoordinator::new();
    assert_eq!(
        coordinator.on_addba_request(address(PEER), &request(6), &mut registry),
        Err(Error::MissingQueue(AccessCategory::Voice))
    );
    assert!(log.is_empty());
    assert!(coordinator.is_empty());
}
