//! End-to-end scenarios through the public crate surface: two engines
//! exchanging a realistic table over in-process links.

use std::num::NonZeroU8;

use bytes::{BufMut, Bytes, BytesMut};
use slotlink::engine::{
    Fault, Mailbox, MailboxConfig, RetryPolicy, SlotConfig, SlotFlag, UpdateRate,
};
use slotlink::frame::Value;
use slotlink::transport::{loopback_pair, BusyLink, Destination, Frame, Location, LossyLink};

fn every(n: u8) -> UpdateRate {
    UpdateRate::EveryRounds(NonZeroU8::new(n).expect("nonzero rate"))
}

fn telemetry_table() -> Vec<SlotConfig> {
    vec![
        SlotConfig {
            name: "pressure".into(),
            initial: Value::Float32(0.0),
            rate: every(1),
            source: Location::Mcu,
            destination: Location::Host,
        },
        SlotConfig {
            name: "setpoint".into(),
            initial: Value::Uint32(0),
            rate: UpdateRate::Async,
            source: Location::Host,
            destination: Location::Mcu,
        },
        SlotConfig {
            name: "armed".into(),
            initial: Value::Boolean(false),
            rate: every(5),
            source: Location::Mcu,
            destination: Location::Host,
        },
    ]
}

/// One full half-duplex round: mcu transmits, host drains and replies,
/// mcu drains the replies.
fn full_round<A, B>(mcu: &Mailbox<A>, host: &Mailbox<B>)
where
    A: slotlink::transport::LinkTransport,
    B: slotlink::transport::LinkTransport,
{
    mcu.tx_runtime();
    host.rx_runtime();
    host.rx_runtime();
    host.tx_runtime();
    mcu.rx_runtime();
    mcu.rx_runtime();
}

#[test]
fn bidirectional_exchange_over_lossless_link() {
    let (mcu_link, host_link) = loopback_pair();
    let mcu = Mailbox::new(
        telemetry_table(),
        MailboxConfig::new(Location::Mcu),
        mcu_link,
    )
    .expect("mcu engine");
    let host = Mailbox::new(
        telemetry_table(),
        MailboxConfig::new(Location::Host),
        host_link,
    )
    .expect("host engine");

    mcu.update(0, Value::Float32(101.3)).expect("mcu write");
    host.update(1, Value::Uint32(1500)).expect("host write");

    for _ in 0..3 {
        full_round(&mcu, &host);
    }

    let pressure = host.read(0).expect("host read");
    assert_eq!(pressure.value, Value::Float32(101.3));

    let setpoint = mcu.read(1).expect("mcu read");
    assert_eq!(setpoint.value, Value::Uint32(1500));

    // Every send was acked within the exchange.
    assert!(!mcu.awaiting_ack(0));
    assert!(!host.awaiting_ack(1));
    assert!(mcu.faults().is_empty());
    assert!(host.faults().is_empty());
}

#[test]
fn values_converge_across_a_lossy_link_with_retransmit() {
    let (mcu_link, host_link) = loopback_pair();
    let retry = RetryPolicy::Retransmit { max_attempts: 5 };
    let mcu = Mailbox::new(
        telemetry_table(),
        MailboxConfig {
            retry,
            ..MailboxConfig::new(Location::Mcu)
        },
        LossyLink::new(mcu_link, 3),
    )
    .expect("mcu engine");
    let host = Mailbox::new(
        telemetry_table(),
        MailboxConfig {
            retry,
            ..MailboxConfig::new(Location::Host)
        },
        LossyLink::new(host_link, 3),
    )
    .expect("host engine");

    host.update(1, Value::Uint32(77)).expect("host write");
    for _ in 0..10 {
        full_round(&mcu, &host);
    }

    assert_eq!(mcu.peek(1).expect("mcu read").value, Value::Uint32(77));
}

#[test]
fn round_counters_realign_after_drift() {
    let (mcu_link, host_link) = loopback_pair();
    let mcu = Mailbox::new(
        telemetry_table(),
        MailboxConfig {
            round_sync_interval: NonZeroU8::new(1),
            ..MailboxConfig::new(Location::Mcu)
        },
        mcu_link,
    )
    .expect("mcu engine");
    let host = Mailbox::new(
        telemetry_table(),
        MailboxConfig::new(Location::Host),
        host_link,
    )
    .expect("host engine");

    // Let the host tick ahead on its own.
    for _ in 0..13 {
        host.tx_runtime();
    }
    assert_ne!(host.round(), mcu.round());

    mcu.tx_runtime();
    host.rx_runtime();
    assert_eq!(host.round(), mcu.round());
}

#[test]
fn malformed_inbound_frame_is_contained() {
    let host = Mailbox::new(
        telemetry_table(),
        MailboxConfig::new(Location::Host),
        BusyLink::new(),
    )
    .expect("host engine");

    // A well-formed float entry for slot 0 followed by a truncated boolean
    // entry for slot 2.
    let mut payload = BytesMut::new();
    payload.put_u8(0);
    payload.put_f32_le(2.5);
    payload.put_u8(2);
    let frame = Frame::new(Destination::Unit(Location::Host), Bytes::from(payload));

    host.transport().stage(frame);
    host.rx_runtime();

    // The entry before the damage was applied; the damage was recorded.
    let read = host.read(0).expect("host read");
    assert_eq!(read.value, Value::Float32(2.5));
    assert_eq!(read.flag, SlotFlag::ReceivePending);
    assert!(host.faults().contains(Fault::RxMsgOverflow));

    // The engine keeps running afterwards.
    host.rx_runtime();
    assert_eq!(host.read(0).expect("host read").flag, SlotFlag::None);
}

#[test]
fn unknown_slot_index_faults_without_corrupting_the_table() {
    let host = Mailbox::new(
        telemetry_table(),
        MailboxConfig::new(Location::Host),
        BusyLink::new(),
    )
    .expect("host engine");

    let mut payload = BytesMut::new();
    payload.put_u8(0x40); // beyond the 3-slot table
    payload.put_u32_le(0xDEAD_BEEF);
    host.transport()
        .stage(Frame::new(Destination::Unit(Location::Host), Bytes::from(payload)));

    host.rx_runtime();
    assert!(host.faults().contains(Fault::RxInvalidIdx));
    for index in 0..3 {
        assert_eq!(
            host.peek(index).expect("peek").flag,
            SlotFlag::None,
            "slot {index} must be untouched"
        );
    }
}
