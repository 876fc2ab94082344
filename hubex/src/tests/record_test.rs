use super::*;
use crate::report::format_row;
use chrono::DateTime;

fn raw(payload: Option<&'static [u8]>) -> RawEvent {
    RawEvent {
        partition: PartitionId::from("7"),
        payload: payload.map(Bytes::from_static),
        enqueued_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}

#[rstest]
#[case::absent(None)]
#[case::empty(Some(b"".as_slice()))]
fn drops_missing_payload(#[case] payload: Option<&'static [u8]>) {
    assert!(raw(payload).into_record().is_none());
}

#[rstest]
fn keeps_transport_fields() {
    let event = raw(Some(b"\x00\xffbinary"));
    let enqueued_at = event.enqueued_at;

    let record = event.into_record().unwrap();

    assert_eq!(record.partition.as_str(), "7");
    assert_eq!(record.payload, Bytes::from_static(b"\x00\xffbinary"));
    assert_eq!(record.enqueued_at, enqueued_at);
}

#[rstest]
fn formats_table_row() {
    let record = EventRecord {
        partition: PartitionId::from("0"),
        payload: Bytes::from_static(b"hello"),
        enqueued_at: DateTime::from_timestamp(0, 0).unwrap(),
    };

    let row = format_row(&record);

    assert!(row.starts_with("| 0            | hello "));
    assert!(row.ends_with("| 1970-01-01T00:00:00Z      |\n"));
    assert_eq!(row.chars().count(), 2 + 12 + 3 + 50 + 3 + 25 + 3);
}

#[rstest]
fn partition_id_display() {
    let id = PartitionId::from(String::from("12"));

    assert_eq!(id.to_string(), "12");
    assert_eq!(id, PartitionId::from("12"));
}
