//! Byte-exact wire vectors against the shipped protocol catalog.

use std::os::fd::RawFd;

use waywire_client::protocol::{wl_display, wl_registry, wl_shm};
use waywire_core::marshal::{marshal_message, unmarshal_message};
use waywire_core::{ArgKind, Direction, MessageHeader, ObjectId};

fn id(raw: u32) -> ObjectId {
    ObjectId::new(raw).unwrap()
}

fn words(bytes: &[u8]) -> Vec<u32> {
    assert_eq!(bytes.len() % 4, 0);
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn sync_frame_is_three_words() {
    let mut buf = [0u32; 4];
    let mut fds: Vec<RawFd> = Vec::new();
    let msg = wl_display::Request::Sync { callback: id(3) };
    let n = marshal_message(ObjectId::DISPLAY, &msg, &mut buf, &mut fds).unwrap();
    assert_eq!(&buf[..n], &[1, 12 << 16, 3]);
    assert!(fds.is_empty());
}

#[test]
fn registry_global_decodes() {
    // name = 1, interface = "wl_shm" (six characters, length word counts
    // the NUL: 7), version = 3.
    let mut body = vec![1u32, 7];
    body.extend(words(b"wl_shm\x00\x00"));
    body.push(3);
    assert_eq!(body, [1, 7, u32::from_ne_bytes(*b"wl_s"), u32::from_ne_bytes(*b"hm\0\0"), 3]);

    let header = MessageHeader {
        object_id: id(2),
        size: (8 + body.len() * 4) as u16,
        opcode: 0,
    };
    let event: wl_registry::Event = unmarshal_message(&header, &body).unwrap();
    match event {
        wl_registry::Event::Global { name, interface, version } => {
            assert_eq!(name, 1);
            assert_eq!(interface, c"wl_shm");
            assert_eq!(version, 3);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn display_error_decodes() {
    let message = b"invalid arguments to wl_registry@2.bind";
    let mut body = vec![1u32, 15, (message.len() + 1) as u32];
    let mut payload = message.to_vec();
    payload.push(0);
    while payload.len() % 4 != 0 {
        payload.push(0);
    }
    body.extend(words(&payload));

    let header = MessageHeader {
        object_id: ObjectId::DISPLAY,
        size: (8 + body.len() * 4) as u16,
        opcode: 0,
    };
    let event: wl_display::Event = unmarshal_message(&header, &body).unwrap();
    match event {
        wl_display::Event::Error { object_id, code, message } => {
            assert_eq!(object_id, ObjectId::DISPLAY);
            assert_eq!(code, 15);
            assert_eq!(message.to_str().unwrap(), "invalid arguments to wl_registry@2.bind");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn roundtrip_preserves_header() {
    let mut buf = [0u32; 16];
    let mut fds: Vec<RawFd> = Vec::new();
    let msg = wl_registry::Request::Bind {
        name: 17,
        interface: c"wl_shm".into(),
        version: 1,
        id: id(6),
    };
    let n = marshal_message(id(2), &msg, &mut buf, &mut fds).unwrap();

    assert_eq!(buf[0], 2);
    let size = (buf[1] >> 16) as u16;
    let opcode = (buf[1] & 0xFFFF) as u16;
    assert_eq!(size as usize, n * 4);
    assert_eq!(size % 4, 0);
    assert_eq!(opcode, 0);
    // Untyped new_id layout: name, interface string, version, id.
    assert_eq!(buf[n - 2], 1);
    assert_eq!(buf[n - 1], 6);
}

#[test]
fn catalog_descriptors_are_consistent() {
    let shm = wl_shm::INTERFACE;
    assert_eq!(shm.name, c"wl_shm");
    assert_eq!(shm.op_count(Direction::Request), 1);
    assert_eq!(shm.op_count(Direction::Event), 1);

    let create_pool = shm.signature(Direction::Request, 0).unwrap();
    assert_eq!(create_pool, &[ArgKind::NewId, ArgKind::Fd, ArgKind::Int]);
    assert_eq!(shm.requests[0].fd_count(), 1);
    assert!(shm.signature(Direction::Request, 1).is_none());

    let display = wl_display::INTERFACE;
    assert_eq!(display.version, 1);
    assert_eq!(
        display.signature(Direction::Event, 0).unwrap(),
        &[ArgKind::Object, ArgKind::Uint, ArgKind::String],
    );
}
