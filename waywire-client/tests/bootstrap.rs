//! Transport and bootstrap scenarios against an in-process mock server.
//!
//! Both ends of a `UnixStream::pair` fit in the kernel's socket buffers for
//! everything exchanged here, so no threads are needed: the server side
//! pre-writes its events, the client runs, then the server reads back what
//! the client sent.

use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

use waywire_client::protocol::{wl_compositor, wl_shm, xdg_toplevel};
use waywire_client::{register_globals, BootstrapError, Connection, IdPool, RecvError};
use waywire_core::marshal::ArgReader;
use waywire_core::ObjectId;

fn pair() -> (Connection, UnixStream) {
    let (client, server) = UnixStream::pair().unwrap();
    (Connection::from(client), server)
}

/// Encode one frame the way a compositor would.
fn frame(object: u32, opcode: u16, body: &[u32]) -> Vec<u8> {
    let size = (8 + body.len() * 4) as u32;
    let mut words = vec![object, size << 16 | opcode as u32];
    words.extend_from_slice(body);
    words.iter().flat_map(|w| w.to_ne_bytes()).collect()
}

/// Length word (counting the NUL) plus zero-padded payload words.
fn string_words(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    let mut words = vec![bytes.len() as u32];
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        words.push(u32::from_ne_bytes(word));
    }
    words
}

fn global_event(registry: u32, name: u32, interface: &str, version: u32) -> Vec<u8> {
    let mut body = vec![name];
    body.extend(string_words(interface));
    body.push(version);
    frame(registry, 0, &body)
}

struct RawFrame {
    object: u32,
    opcode: u16,
    body: Vec<u32>,
}

fn read_frame(sock: &mut UnixStream) -> RawFrame {
    let mut header = [0u8; 8];
    sock.read_exact(&mut header).unwrap();
    let object = u32::from_ne_bytes(header[0..4].try_into().unwrap());
    let size_and_opcode = u32::from_ne_bytes(header[4..8].try_into().unwrap());
    let size = (size_and_opcode >> 16) as usize;
    let opcode = (size_and_opcode & 0xFFFF) as u16;

    let mut payload = vec![0u8; size - 8];
    sock.read_exact(&mut payload).unwrap();
    let body = payload
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes(chunk.try_into().unwrap()))
        .collect();
    RawFrame { object, opcode, body }
}

#[test]
fn bootstrap_binds_required_globals() {
    let (mut conn, mut server) = pair();
    let mut pool = IdPool::new();

    // A fresh pool allocates registry = 2 and sync callback = 3.
    server.write_all(&global_event(2, 1, "wl_compositor", 5)).unwrap();
    server.write_all(&global_event(2, 2, "wl_shm", 1)).unwrap();
    server.write_all(&frame(2, 1, &[40])).unwrap(); // global_remove, skipped
    server.write_all(&frame(1, 1, &[8])).unwrap(); // delete_id for some dead object
    server.write_all(&frame(3, 0, &[1])).unwrap(); // wl_callback.done

    let bound = register_globals(
        &mut conn,
        &mut pool,
        &[wl_shm::INTERFACE, wl_compositor::INTERFACE],
    )
    .unwrap();

    // Output is in input order; ids were allocated in advertisement order,
    // after the registry and callback ids.
    assert_eq!(bound.len(), 2);
    assert_eq!(bound[0].unwrap().as_u32(), 5);
    assert_eq!(bound[1].unwrap().as_u32(), 4);

    // The delete_id above went back to the pool.
    assert_eq!(pool.create().as_u32(), 8);

    // Client side of the conversation: get_registry, sync, two binds.
    let get_registry = read_frame(&mut server);
    assert_eq!((get_registry.object, get_registry.opcode), (1, 1));
    assert_eq!(get_registry.body, [2]);

    let sync = read_frame(&mut server);
    assert_eq!((sync.object, sync.opcode), (1, 0));
    assert_eq!(sync.body, [3]);

    let bind_compositor = read_frame(&mut server);
    assert_eq!((bind_compositor.object, bind_compositor.opcode), (2, 0));
    let mut expected = vec![1u32];
    expected.extend(string_words("wl_compositor"));
    expected.push(wl_compositor::INTERFACE.version);
    expected.push(4);
    assert_eq!(bind_compositor.body, expected);

    let bind_shm = read_frame(&mut server);
    assert_eq!(bind_shm.body[0], 2);
    assert_eq!(*bind_shm.body.last().unwrap(), 5);
}

#[test]
fn bootstrap_rejects_outdated_global() {
    let (mut conn, mut server) = pair();
    let mut pool = IdPool::new();

    server.write_all(&global_event(2, 7, "wl_shm", 0)).unwrap();
    server.write_all(&frame(3, 0, &[1])).unwrap();

    let err = register_globals(&mut conn, &mut pool, &[wl_shm::INTERFACE]).unwrap_err();
    match err {
        BootstrapError::OutdatedCompositorProtocol { interface, advertised, required } => {
            assert_eq!(interface.as_c_str(), c"wl_shm");
            assert_eq!(advertised, 0);
            assert_eq!(required, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bootstrap_reports_missing_globals() {
    let (mut conn, mut server) = pair();
    let mut pool = IdPool::new();

    server.write_all(&global_event(2, 1, "wl_compositor", 5)).unwrap();
    server.write_all(&frame(3, 0, &[1])).unwrap();

    let bound = register_globals(
        &mut conn,
        &mut pool,
        &[wl_shm::INTERFACE, wl_compositor::INTERFACE],
    )
    .unwrap();
    assert_eq!(bound[0], None);
    assert!(bound[1].is_some());
}

#[test]
fn bootstrap_surfaces_protocol_errors() {
    let (mut conn, mut server) = pair();
    let mut pool = IdPool::new();

    let mut body = vec![1u32, 0];
    body.extend(string_words("bad client"));
    server.write_all(&frame(1, 0, &body)).unwrap();

    let err = register_globals(&mut conn, &mut pool, &[wl_shm::INTERFACE]).unwrap_err();
    assert!(matches!(err, BootstrapError::Protocol { .. }));
}

#[test]
fn create_pool_transfers_one_fd() {
    let (mut client, server) = pair();
    let mut receiver = Connection::from(server);

    let fd = std::fs::File::open("/dev/null").unwrap().into();
    client
        .send(
            ObjectId::new(4).unwrap(),
            wl_shm::Request::CreatePool { id: ObjectId::new(5).unwrap(), fd, size: 4096 },
        )
        .unwrap();

    let (header, body) = receiver.recv().unwrap();
    assert_eq!(header.object_id.as_u32(), 4);
    assert_eq!(header.opcode, 0);
    // The descriptor is not part of the word stream.
    assert_eq!(body, [5, 4096]);

    let received = receiver.take_fd().unwrap();
    assert!(received.as_raw_fd() >= 0);
    let mut file = std::fs::File::from(received);
    let mut buf = [0u8; 4];
    assert_eq!(file.read(&mut buf).unwrap(), 0); // still /dev/null

    assert!(receiver.take_fd().is_err());
}

#[test]
fn buffers_grow_past_initial_capacity() {
    let (mut client, server) = pair();
    let mut receiver = Connection::from(server);

    // Far larger than the 16-word initial buffers on both sides.
    let title = "t".repeat(300);
    let request = xdg_toplevel::Request::SetTitle {
        title: std::ffi::CString::new(title.clone()).unwrap(),
    };
    client.send(ObjectId::new(9).unwrap(), request).unwrap();

    let (header, body) = receiver.recv().unwrap();
    assert_eq!(header.opcode, 2);
    let mut reader = ArgReader::new(body);
    assert_eq!(reader.string().unwrap().to_str().unwrap(), title);
}

#[test]
fn closed_socket_is_reported() {
    let (mut conn, server) = pair();
    drop(server);
    assert!(matches!(conn.recv(), Err(RecvError::SocketClosed)));
}

#[test]
fn malformed_headers_are_rejected() {
    // size below the header size
    let (mut conn, mut server) = pair();
    server.write_all(&frame(1, 0, &[])[..8]).unwrap();
    let mut bad = frame(1, 0, &[]);
    bad[4..8].copy_from_slice(&((4u32 << 16) | 0).to_ne_bytes());
    server.write_all(&bad[..8]).unwrap();
    // First frame is fine (size 8, empty body), second is not.
    conn.recv().unwrap();
    assert!(matches!(
        conn.recv(),
        Err(RecvError::OversizedFrame { size: 4 })
    ));

    // null object id
    let (mut conn, mut server) = pair();
    server.write_all(&frame(0, 0, &[])[..8]).unwrap();
    assert!(matches!(conn.recv(), Err(RecvError::NullObject)));
}
