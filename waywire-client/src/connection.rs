//! The Wayland connection.
//!
//! Owns the Unix-domain stream, the send/receive word buffers and the
//! queue of file descriptors delivered over SCM_RIGHTS ancillary data.

use std::collections::VecDeque;
use std::env;
use std::io::{self, IoSlice, IoSliceMut};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::socket::{self, ControlMessage, ControlMessageOwned, MsgFlags};

use waywire_core::marshal::{self, Marshal, MarshalError};
use waywire_core::{MessageHeader, ObjectId};

/// Initial capacity of the send and receive buffers, in words.
const INITIAL_BUF_WORDS: usize = 16;

/// Frames are bounded by the header's 16-bit size field.
const MAX_FRAME_WORDS: usize = (u16::MAX as usize + 1) / 4;

/// Capacity of the ancillary buffer of one `recvmsg`, in descriptors.
const FDS_IN_LEN: usize = 56;

/// An error that can occur while connecting to a Wayland socket.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// `$XDG_RUNTIME_DIR` was not available.
    #[error("$XDG_RUNTIME_DIR must be set")]
    NoRuntimeDir,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An error that can occur while sending a request.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The message cannot be represented on the wire. Buffer exhaustion is
    /// handled internally; only `StringTooLong` and `MessageTooLong` reach
    /// the caller.
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// An error that can occur while receiving a message.
#[derive(Debug, thiserror::Error)]
pub enum RecvError {
    /// The compositor closed the connection. Terminal: discard the
    /// connection.
    #[error("server closed the connection")]
    SocketClosed,
    /// The frame header declares a size that is below the header size or
    /// not a multiple of four.
    #[error("frame header declares an invalid size ({size})")]
    OversizedFrame { size: u16 },
    /// The frame header names the null object.
    #[error("frame header names the null object")]
    NullObject,
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// `take_fd` was called with nothing queued.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("no file descriptor is queued")]
pub struct EmptyFdQueue;

/// Resolve the compositor socket path from the environment.
///
/// `$XDG_RUNTIME_DIR` is required. `$WAYLAND_DISPLAY` defaults to
/// `wayland-0` and is used verbatim when it is an absolute path.
pub fn socket_path() -> Result<PathBuf, ConnectError> {
    let runtime_dir = env::var_os("XDG_RUNTIME_DIR").ok_or(ConnectError::NoRuntimeDir)?;
    let display = PathBuf::from(env::var_os("WAYLAND_DISPLAY").unwrap_or_else(|| "wayland-0".into()));

    if display.is_absolute() {
        Ok(display)
    } else {
        Ok(PathBuf::from(runtime_dir).join(display))
    }
}

/// A connection to a Wayland compositor.
///
/// All I/O is blocking and a connection is not internally synchronized;
/// callers that share one across threads must serialize access themselves.
/// For readiness-driven integration, poll the descriptor exposed through
/// [`AsRawFd`] and call [`recv`](Self::recv) once it is readable.
pub struct Connection {
    socket: UnixStream,
    send_buf: Vec<u32>,
    recv_buf: Vec<u32>,
    fds_out: Vec<RawFd>,
    /// Received descriptors waiting for [`Connection::take_fd`]. Anything
    /// still queued when the connection drops is closed.
    fd_queue: VecDeque<OwnedFd>,
}

impl AsRawFd for Connection {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

impl From<UnixStream> for Connection {
    fn from(socket: UnixStream) -> Self {
        Self {
            socket,
            send_buf: vec![0; INITIAL_BUF_WORDS],
            recv_buf: vec![0; INITIAL_BUF_WORDS],
            fds_out: Vec::new(),
            fd_queue: VecDeque::new(),
        }
    }
}

impl Connection {
    /// Connect to the socket advertised by the environment (see
    /// [`socket_path`]).
    pub fn connect() -> Result<Self, ConnectError> {
        Self::connect_to_path(socket_path()?)
    }

    /// Connect to a compositor socket at an explicit path.
    pub fn connect_to_path(path: impl AsRef<Path>) -> Result<Self, ConnectError> {
        Ok(Self::from(UnixStream::connect(path)?))
    }

    /// Send one request on `object_id`.
    ///
    /// The frame is marshalled into the internal buffer, growing it by
    /// doubling as needed, and written with a single `sendmsg` whose
    /// ancillary data carries every fd argument of the message. Requests
    /// take their fd arguments by value; they are closed when the request
    /// is dropped on return, so callers keep a duplicate if they still
    /// need the descriptor.
    pub fn send<M: Marshal>(&mut self, object_id: ObjectId, request: M) -> Result<(), SendError> {
        self.fds_out.clear();
        let words = loop {
            match marshal::marshal_message(object_id, &request, &mut self.send_buf, &mut self.fds_out)
            {
                Ok(words) => break words,
                Err(MarshalError::OverflowBuffer) => {
                    if self.send_buf.len() >= MAX_FRAME_WORDS {
                        return Err(MarshalError::MessageTooLong.into());
                    }
                    let grown = (self.send_buf.len() * 2).min(MAX_FRAME_WORDS);
                    self.send_buf.resize(grown, 0);
                }
                Err(err) => return Err(err.into()),
            }
        };

        log::trace!(
            "-> {}@{}.{}",
            M::INTERFACE.name.to_string_lossy(),
            object_id.as_u32(),
            M::INTERFACE
                .requests
                .get(request.opcode() as usize)
                .map_or("?", |desc| desc.name),
        );

        let bytes = marshal::words_as_bytes(&self.send_buf[..words]);
        send_all(&self.socket, bytes, &self.fds_out)?;
        Ok(())
    }

    /// Receive one message: its header and a view of its body words.
    ///
    /// The view stays valid until the next `recv`. File descriptors
    /// arriving on the ancillary channel are queued in arrival order; a
    /// message whose record contains fd arguments expects one
    /// [`take_fd`](Self::take_fd) per argument, in field order, after this
    /// call returns it.
    pub fn recv(&mut self) -> Result<(MessageHeader, &[u32]), RecvError> {
        let mut header_words = [0u32; MessageHeader::WORDS];
        recv_exact(
            &self.socket,
            &mut self.fd_queue,
            marshal::words_as_bytes_mut(&mut header_words),
        )?;

        let size_and_opcode = header_words[1];
        let size = (size_and_opcode >> 16) as u16;
        let opcode = (size_and_opcode & 0xFFFF) as u16;
        if (size as usize) < MessageHeader::SIZE || size % 4 != 0 {
            return Err(RecvError::OversizedFrame { size });
        }
        let object_id = ObjectId::new(header_words[0]).ok_or(RecvError::NullObject)?;
        let header = MessageHeader { object_id, size, opcode };

        let body_words = header.body_words();
        if self.recv_buf.len() < body_words {
            let mut grown = self.recv_buf.len().max(INITIAL_BUF_WORDS);
            while grown < body_words {
                grown *= 2;
            }
            self.recv_buf.resize(grown, 0);
        }
        recv_exact(
            &self.socket,
            &mut self.fd_queue,
            marshal::words_as_bytes_mut(&mut self.recv_buf[..body_words]),
        )?;

        log::trace!(
            "<- object {} opcode {} ({} bytes)",
            object_id.as_u32(),
            opcode,
            size,
        );

        Ok((header, &self.recv_buf[..body_words]))
    }

    /// Pop the oldest queued file descriptor.
    pub fn take_fd(&mut self) -> Result<OwnedFd, EmptyFdQueue> {
        self.fd_queue.pop_front().ok_or(EmptyFdQueue)
    }
}

/// Write a whole frame, attaching `fds` as a single SCM_RIGHTS control
/// message. The kernel associates ancillary data with the first byte of
/// the segment, so a short write continues without them.
fn send_all(socket: &UnixStream, bytes: &[u8], fds: &[RawFd]) -> io::Result<()> {
    let mut offset = 0;
    let mut fds = fds;
    while offset < bytes.len() {
        let iov = [IoSlice::new(&bytes[offset..])];
        let scm;
        let cmsgs: &[ControlMessage] = match fds {
            [] => &[],
            fds => {
                scm = [ControlMessage::ScmRights(fds)];
                &scm
            }
        };

        match socket::sendmsg::<()>(
            socket.as_raw_fd(),
            &iov,
            cmsgs,
            MsgFlags::MSG_NOSIGNAL,
            None,
        ) {
            Ok(sent) => {
                offset += sent;
                fds = &[];
            }
            Err(Errno::EINTR) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Fill `buf` completely, harvesting SCM_RIGHTS descriptors from every
/// `recvmsg` along the way.
fn recv_exact(
    socket: &UnixStream,
    fd_queue: &mut VecDeque<OwnedFd>,
    buf: &mut [u8],
) -> Result<(), RecvError> {
    let mut filled = 0;
    while filled < buf.len() {
        let mut cmsg = nix::cmsg_space!([RawFd; FDS_IN_LEN]);
        let mut iov = [IoSliceMut::new(&mut buf[filled..])];

        let msg = match socket::recvmsg::<()>(
            socket.as_raw_fd(),
            &mut iov,
            Some(&mut cmsg),
            MsgFlags::MSG_CMSG_CLOEXEC | MsgFlags::MSG_NOSIGNAL,
        ) {
            Ok(msg) => msg,
            Err(Errno::EINTR) => continue,
            Err(err) => return Err(io::Error::from(err).into()),
        };

        for cmsg in msg.cmsgs() {
            if let ControlMessageOwned::ScmRights(fds) = cmsg {
                for fd in fds {
                    debug_assert_ne!(fd, -1);
                    // SAFETY: the kernel just installed this descriptor
                    // into our table for us; nothing else owns it.
                    fd_queue.push_back(unsafe { OwnedFd::from_raw_fd(fd) });
                }
            }
        }

        if msg.bytes == 0 {
            return Err(RecvError::SocketClosed);
        }
        filled += msg.bytes;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test for all the env-derived paths: parallel tests must not race
    // on the process environment.
    #[test]
    fn socket_path_resolution() {
        env::remove_var("XDG_RUNTIME_DIR");
        env::remove_var("WAYLAND_DISPLAY");
        assert!(matches!(socket_path(), Err(ConnectError::NoRuntimeDir)));

        env::set_var("XDG_RUNTIME_DIR", "/run/user/1000");
        assert_eq!(socket_path().unwrap(), Path::new("/run/user/1000/wayland-0"));

        env::set_var("WAYLAND_DISPLAY", "wayland-7");
        assert_eq!(socket_path().unwrap(), Path::new("/run/user/1000/wayland-7"));

        env::set_var("WAYLAND_DISPLAY", "/tmp/custom-socket");
        assert_eq!(socket_path().unwrap(), Path::new("/tmp/custom-socket"));
    }
}
