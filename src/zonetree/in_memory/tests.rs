use core::str::FromStr;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::base::iana::Class;
use crate::base::name::Name;
use crate::base::record::{Record, RecordData, Soa};
use crate::journal::{InMemoryJournal, Journal};
use crate::zonetree::{StoreError, ZoneSnapshot, ZoneStore, ZoneTree};

use super::{ZoneApex, ZoneBuilder};

fn n(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

fn soa(serial: u32) -> Record {
    Record::new(
        n("example.com"),
        Class::IN,
        3600,
        Soa::new(
            n("ns.example.com"),
            n("hostmaster.example.com"),
            serial.into(),
            3600,
            600,
            86400,
            300,
        )
        .to_record_data(),
    )
}

fn a(owner: &str, last: u8) -> Record {
    Record::new(
        n(owner),
        Class::IN,
        300,
        RecordData::a(Ipv4Addr::new(192, 0, 2, last)),
    )
}

fn zone(journal: Option<Arc<InMemoryJournal>>) -> Arc<ZoneApex> {
    let mut builder = ZoneBuilder::new(n("example.com"), Class::IN);
    if let Some(journal) = journal {
        builder = builder.with_journal(journal);
    }
    builder.insert(soa(1)).unwrap();
    builder.insert(a("www.example.com", 1)).unwrap();
    builder.insert(a("www.example.com", 2)).unwrap();
    builder.insert(a("mail.example.com", 3)).unwrap();
    builder.build().unwrap()
}

fn walk(snapshot: &dyn ZoneSnapshot) -> Vec<Record> {
    let mut res = Vec::new();
    let mut nodes = snapshot.nodes().unwrap();
    while let Some(owner) = nodes.next_node().unwrap() {
        for rrset in snapshot.rrsets(&owner).unwrap() {
            for idx in 0..rrset.len() {
                res.push(rrset.record(idx, &owner, snapshot.class()).unwrap());
            }
        }
    }
    res
}

#[test]
fn builder_requires_soa() {
    let mut builder = ZoneBuilder::new(n("example.com"), Class::IN);
    builder.insert(a("www.example.com", 1)).unwrap();
    assert_eq!(builder.build().err(), Some(StoreError::MissingSoa));

    let mut builder = ZoneBuilder::new(n("example.com"), Class::IN);
    assert_eq!(
        builder.insert(a("www.example.net", 1)),
        Err(StoreError::OutOfZone(n("www.example.net")))
    );
}

#[test]
fn snapshot_walks_in_canonical_order() {
    let apex = zone(None);
    let snapshot = apex.clone().open_snapshot().unwrap();
    assert_eq!(snapshot.soa().unwrap(), soa(1));
    assert_eq!(
        walk(snapshot.as_ref()),
        [
            soa(1),
            a("mail.example.com", 3),
            a("www.example.com", 1),
            a("www.example.com", 2),
        ]
    );
    assert!(matches!(
        snapshot.rrsets(&n("example.org")),
        Err(StoreError::OutOfZone(_))
    ));
    assert!(snapshot.rrsets(&n("none.example.com")).unwrap().is_empty());
}

#[tokio::test]
async fn snapshots_are_isolated_from_commits() {
    let journal = Arc::new(InMemoryJournal::default());
    let apex = zone(Some(journal.clone()));
    let before = apex.clone().open_snapshot().unwrap();

    let mut writer = apex.clone().write().await;
    assert!(writer.add(a("new.example.com", 9)).unwrap());
    assert!(!writer.add(a("new.example.com", 9)).unwrap());
    assert!(writer.remove(&a("www.example.com", 1)).unwrap());
    assert!(!writer.remove(&a("www.example.com", 7)).unwrap());
    assert_eq!(writer.add(soa(5)).err(), Some(StoreError::InvalidSoa));
    let diff = writer.commit(2.into()).unwrap();
    assert_eq!(diff.removed(), &[a("www.example.com", 1)]);
    assert_eq!(diff.added(), &[a("new.example.com", 9)]);

    let after = apex.clone().open_snapshot().unwrap();
    assert_eq!(after.soa().unwrap(), soa(2));
    assert_eq!(
        walk(after.as_ref()),
        [
            soa(2),
            a("mail.example.com", 3),
            a("new.example.com", 9),
            a("www.example.com", 2),
        ]
    );

    // The old snapshot still sees the old version.
    assert_eq!(walk(before.as_ref()).len(), 4);
    assert_eq!(before.soa().unwrap(), soa(1));
    assert!(before.rrsets(&n("new.example.com")).unwrap().is_empty());

    let mut reader = journal.open(1.into(), 2.into()).unwrap();
    assert!(reader.first().unwrap().is_ready());
    assert_eq!(reader.current(), Some(&soa(1)));
}

#[tokio::test]
async fn dropped_writer_rolls_back() {
    let apex = zone(None);
    let mut writer = apex.clone().write().await;
    writer.add(a("gone.example.com", 1)).unwrap();
    writer.remove(&a("mail.example.com", 3)).unwrap();
    drop(writer);

    let snapshot = apex.clone().open_snapshot().unwrap();
    assert_eq!(walk(snapshot.as_ref()).len(), 4);
    assert!(snapshot.rrsets(&n("gone.example.com")).unwrap().is_empty());

    let writer = apex.clone().write().await;
    assert_eq!(writer.commit(1.into()).err(), Some(StoreError::InvalidSoa));
}

#[test]
fn tree_lookup() {
    let mut tree = ZoneTree::new();
    let mut builder = ZoneBuilder::new(n("example.com"), Class::IN);
    builder.insert(soa(1)).unwrap();
    builder.finalize_into_set(&mut tree).unwrap();

    assert!(tree.get_zone(&n("EXAMPLE.com"), Class::IN).is_some());
    assert!(tree.get_zone(&n("www.example.com"), Class::IN).is_none());
    assert!(tree.get_zone(&n("example.com"), Class::CH).is_none());
    assert_eq!(
        tree.find_zone(&n("www.example.com"), Class::IN)
            .map(|zone| zone.apex_name().clone()),
        Some(n("example.com"))
    );
    assert!(tree
        .get_zone(&n("example.com"), Class::IN)
        .unwrap()
        .journal()
        .is_none());
}

#[test]
fn zone_exposes_its_store() {
    let mut tree = ZoneTree::new();
    let mut builder = ZoneBuilder::new(n("example.com"), Class::IN);
    builder.insert(soa(7)).unwrap();
    builder.finalize_into_set(&mut tree).unwrap();

    let zone = tree.get_zone(&n("example.com"), Class::IN).unwrap();
    let store: &dyn ZoneStore = zone.as_ref();
    assert_eq!(store.apex_name(), &n("example.com"));
    assert_eq!(store.class(), Class::IN);
}
