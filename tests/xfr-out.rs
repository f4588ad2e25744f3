use core::str::FromStr;
use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

use domain_xfrout::base::{
    Class, Name, ParsedMessage, Rcode, Record, RecordData, Rtype, Soa,
};
use domain_xfrout::journal::InMemoryJournal;
use domain_xfrout::xfr::{
    StreamTransport, TransportKind, XfrConfig, XfrError, XfrKind,
    XfrRequest, XfrResponder,
};
use domain_xfrout::zonetree::in_memory::ZoneBuilder;
use domain_xfrout::zonetree::ZoneTree;

#[tokio::test]
async fn axfr_then_ixfr_over_a_stream() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();

    let journal = Arc::new(InMemoryJournal::default());
    let mut builder =
        ZoneBuilder::new(n("example.org"), Class::IN).with_journal(journal);
    builder.insert(soa(2024010101)).unwrap();
    for idx in 0..200u8 {
        builder.insert(a(&format!("host{idx}.example.org"), idx)).unwrap();
    }
    let mut tree = ZoneTree::new();
    let apex = builder.finalize_into_set(&mut tree).unwrap();

    let mut config = XfrConfig::new();
    config.set_max_message_size(1024);
    let responder = XfrResponder::new(Arc::new(tree), config);

    // Full transfer.
    let req = XfrRequest::new(
        1,
        n("example.org"),
        Rtype::AXFR,
        Class::IN,
        TransportKind::Stream,
    );
    let msgs = transfer(responder.clone(), req).await.unwrap();
    assert!(msgs.len() > 1);
    let answers: Vec<_> =
        msgs.into_iter().flat_map(ParsedMessage::into_answer).collect();
    assert_eq!(answers.len(), 202);
    assert_eq!(answers.first(), Some(&soa(2024010101)));
    assert_eq!(answers.last(), Some(&soa(2024010101)));

    // Change the zone and fetch the difference.
    let mut writer = apex.clone().write().await;
    writer.remove(&a("host7.example.org", 7)).unwrap();
    writer.add(a("new.example.org", 42)).unwrap();
    writer.commit(2024010102.into()).unwrap();

    let mut req = XfrRequest::new(
        2,
        n("example.org"),
        Rtype::IXFR,
        Class::IN,
        TransportKind::Stream,
    );
    req.push_authority(soa(2024010101));
    let msgs = transfer(responder.clone(), req).await.unwrap();
    let answers: Vec<_> =
        msgs.into_iter().flat_map(ParsedMessage::into_answer).collect();
    assert_eq!(
        answers,
        [
            soa(2024010102),
            soa(2024010101),
            a("host7.example.org", 7),
            soa(2024010102),
            a("new.example.org", 42),
            soa(2024010102),
        ]
    );

    // A zone we don't have gets an error response.
    let req = XfrRequest::new(
        3,
        n("example.net"),
        Rtype::AXFR,
        Class::IN,
        TransportKind::Stream,
    );
    let (err, msgs) = transfer(responder, req).await.unwrap_err();
    assert!(matches!(err, XfrError::NotAuthoritative));
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].header().rcode(), Rcode::NOTAUTH);
}

#[tokio::test]
async fn ixfr_over_udp_returns_datagram() {
    let mut builder = ZoneBuilder::new(n("example.org"), Class::IN);
    builder.insert(soa(5)).unwrap();
    builder.insert(a("www.example.org", 1)).unwrap();
    let mut tree = ZoneTree::new();
    builder.finalize_into_set(&mut tree).unwrap();
    let responder = XfrResponder::new(Arc::new(tree), XfrConfig::new());

    let mut req = XfrRequest::new(
        9,
        n("example.org"),
        Rtype::IXFR,
        Class::IN,
        TransportKind::Datagram,
    );
    req.push_authority(soa(3));
    let session = responder.prepare(req).unwrap();
    assert_eq!(session.kind(), XfrKind::SoaOnly);

    let (client, server) = tokio::io::duplex(512);
    let mut transport = StreamTransport::new(server);
    let summary = session.run(&mut transport).await.unwrap();
    drop(transport);
    assert!(read_messages(client).await.is_empty());

    let msg = ParsedMessage::parse(&summary.datagram.unwrap()).unwrap();
    assert_eq!(msg.header().id(), 9);
    assert_eq!(msg.answer(), [soa(5)]);
}

//------------ Helpers -------------------------------------------------------

type TransferResult =
    Result<Vec<ParsedMessage>, (XfrError, Vec<ParsedMessage>)>;

async fn transfer(responder: XfrResponder, req: XfrRequest) -> TransferResult {
    let (client, server) = tokio::io::duplex(4096);
    let sender = tokio::spawn(async move {
        let mut transport = StreamTransport::new(server);
        responder.respond(req, &mut transport).await
    });
    let msgs = read_messages(client).await;
    match sender.await.unwrap() {
        Ok(summary) => {
            assert_eq!(summary.messages, msgs.len());
            Ok(msgs)
        }
        Err(err) => Err((err, msgs)),
    }
}

async fn read_messages(mut client: impl AsyncRead + Unpin) -> Vec<ParsedMessage> {
    let mut msgs = Vec::new();
    loop {
        let mut len = [0u8; 2];
        if client.read_exact(&mut len).await.is_err() {
            return msgs;
        }
        let mut buf = vec![0; usize::from(u16::from_be_bytes(len))];
        client.read_exact(&mut buf).await.unwrap();
        msgs.push(ParsedMessage::parse(&buf).unwrap());
    }
}

fn n(name: &str) -> Name {
    Name::from_str(name).unwrap()
}

fn soa(serial: u32) -> Record {
    Record::new(
        n("example.org"),
        Class::IN,
        3600,
        Soa::new(
            n("ns1.example.org"),
            n("hostmaster.example.org"),
            serial.into(),
            7200,
            3600,
            1209600,
            3600,
        )
        .to_record_data(),
    )
}

fn a(owner: &str, last: u8) -> Record {
    Record::new(
        n(owner),
        Class::IN,
        3600,
        RecordData::a(Ipv4Addr::new(198, 51, 100, last)),
    )
}
