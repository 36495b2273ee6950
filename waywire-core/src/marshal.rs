//! The message codec.
//!
//! Maps typed messages to and from the word-oriented wire format: one
//! 32-bit host-endian word per scalar argument, length-prefixed
//! zero-padded payloads for strings and arrays, and no words at all for
//! file descriptors, which travel on the socket's ancillary channel.
//!
//! Each interface's `Request` and `Event` enums implement [`Marshal`] and
//! [`Unmarshal`] with hand-generated per-opcode routines over the
//! [`ArgWriter`]/[`ArgReader`] cursors defined here.

use std::ffi::CStr;
use std::mem;
use std::num::NonZeroU32;
use std::os::fd::RawFd;
use std::slice;

use crate::{Fixed, Interface, MessageHeader, ObjectId};

/// An error occurred while writing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MarshalError {
    /// The caller-supplied word buffer is too small. The connection layer
    /// treats this as a request to grow the buffer and retry.
    #[error("message does not fit into the provided buffer")]
    OverflowBuffer,
    /// A string argument cannot be represented in a 32-bit length word.
    #[error("string is too long for the wire format")]
    StringTooLong,
    /// The finished frame exceeds the 16-bit size field.
    #[error("message is too large for a single frame")]
    MessageTooLong,
}

/// An error occurred while decoding a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnmarshalError {
    /// The message body ended before the argument record was complete.
    #[error("message body ended prematurely")]
    EndOfStream,
    /// The header's opcode is outside the interface's declared range.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),
    /// A closed enum received a value it does not define.
    #[error("unknown enum tag {0}")]
    UnknownEnumTag(u32),
    /// A null object id or empty string where the protocol forbids one.
    #[error("unexpected null")]
    UnexpectedNull,
    /// A string payload without its trailing NUL, or with an interior one.
    #[error("malformed string payload")]
    BadString,
    /// An array's byte length is not a multiple of its element size.
    #[error("array length does not match its element size")]
    BadArrayLength,
}

/// A message the client can put on the wire.
pub trait Marshal {
    const INTERFACE: &'static Interface;

    /// The wire opcode of the active variant.
    fn opcode(&self) -> u16;

    /// Write the argument record, in declaration order.
    fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError>;
}

/// A message parsed off the wire.
///
/// Strings and arrays in the decoded value borrow the body buffer the
/// message was parsed from; with [`Connection::recv`] that buffer is only
/// valid until the next receive.
///
/// [`Connection::recv`]: https://docs.rs/waywire-client
pub trait Unmarshal<'a>: Sized {
    const INTERFACE: &'static Interface;

    /// Decode the variant selected by `header.opcode`.
    fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError>;
}

/// Serialize a full frame: header plus argument record.
///
/// Returns the number of words written to `buf`. File descriptor arguments
/// are appended to `fds` and contribute nothing to the word stream; on
/// failure `fds` is restored to its previous length.
pub fn marshal_message<M: Marshal>(
    object_id: ObjectId,
    msg: &M,
    buf: &mut [u32],
    fds: &mut Vec<RawFd>,
) -> Result<usize, MarshalError> {
    let fds_mark = fds.len();
    match marshal_into(object_id, msg, buf, fds) {
        Ok(words) => Ok(words),
        Err(err) => {
            fds.truncate(fds_mark);
            Err(err)
        }
    }
}

fn marshal_into<M: Marshal>(
    object_id: ObjectId,
    msg: &M,
    buf: &mut [u32],
    fds: &mut Vec<RawFd>,
) -> Result<usize, MarshalError> {
    if buf.len() < MessageHeader::WORDS {
        return Err(MarshalError::OverflowBuffer);
    }
    let (header, body) = buf.split_at_mut(MessageHeader::WORDS);

    let mut w = ArgWriter::new(body, fds);
    msg.marshal(&mut w)?;
    let body_words = w.written();

    let size = MessageHeader::SIZE + body_words * 4;
    if size > u16::MAX as usize {
        return Err(MarshalError::MessageTooLong);
    }
    header[0] = object_id.as_u32();
    header[1] = (size as u32) << 16 | msg.opcode() as u32;

    Ok(MessageHeader::WORDS + body_words)
}

/// Deserialize a message body against the variant named by `header`.
pub fn unmarshal_message<'a, E: Unmarshal<'a>>(
    header: &MessageHeader,
    body: &'a [u32],
) -> Result<E, UnmarshalError> {
    let mut r = ArgReader::new(body);
    E::unmarshal(header, &mut r)
}

/// A writing cursor over a word buffer and an out-of-band fd list.
pub struct ArgWriter<'a> {
    words: &'a mut [u32],
    len: usize,
    fds: &'a mut Vec<RawFd>,
}

impl<'a> ArgWriter<'a> {
    pub fn new(words: &'a mut [u32], fds: &'a mut Vec<RawFd>) -> Self {
        Self { words, len: 0, fds }
    }

    /// Words written so far.
    pub fn written(&self) -> usize {
        self.len
    }

    pub fn uint(&mut self, val: u32) -> Result<(), MarshalError> {
        self.word(val)
    }

    pub fn int(&mut self, val: i32) -> Result<(), MarshalError> {
        self.word(val as u32)
    }

    pub fn fixed(&mut self, val: Fixed) -> Result<(), MarshalError> {
        self.word(val.0 as u32)
    }

    pub fn object(&mut self, id: ObjectId) -> Result<(), MarshalError> {
        self.word(id.as_u32())
    }

    pub fn object_or_null(&mut self, id: Option<ObjectId>) -> Result<(), MarshalError> {
        self.word(id.map_or(0, ObjectId::as_u32))
    }

    /// Length word counting the trailing NUL, then the zero-padded payload.
    pub fn string(&mut self, val: &CStr) -> Result<(), MarshalError> {
        let bytes = val.to_bytes_with_nul();
        if bytes.len() > u32::MAX as usize {
            return Err(MarshalError::StringTooLong);
        }
        self.word(bytes.len() as u32)?;
        self.bytes(bytes)
    }

    /// Length word in bytes, then the zero-padded payload.
    pub fn array(&mut self, val: &[u8]) -> Result<(), MarshalError> {
        if val.len() > u32::MAX as usize {
            return Err(MarshalError::StringTooLong);
        }
        self.word(val.len() as u32)?;
        self.bytes(val)
    }

    /// Contributes no words; the descriptor is queued for the ancillary
    /// channel of the `sendmsg` that will carry this frame.
    pub fn fd(&mut self, fd: RawFd) -> Result<(), MarshalError> {
        self.fds.push(fd);
        Ok(())
    }

    fn word(&mut self, val: u32) -> Result<(), MarshalError> {
        let slot = self
            .words
            .get_mut(self.len)
            .ok_or(MarshalError::OverflowBuffer)?;
        *slot = val;
        self.len += 1;
        Ok(())
    }

    fn bytes(&mut self, data: &[u8]) -> Result<(), MarshalError> {
        let mut chunks = data.chunks_exact(4);
        for chunk in &mut chunks {
            self.word(u32::from_ne_bytes(chunk.try_into().unwrap()))?;
        }
        let rem = chunks.remainder();
        if !rem.is_empty() {
            let mut tail = [0u8; 4];
            tail[..rem.len()].copy_from_slice(rem);
            self.word(u32::from_ne_bytes(tail))?;
        }
        Ok(())
    }
}

/// A reading cursor over a message body.
///
/// Never reads past the end of the supplied slice: a record that does not
/// fit the body fails with [`UnmarshalError::EndOfStream`].
pub struct ArgReader<'a> {
    words: &'a [u32],
    pos: usize,
}

impl<'a> ArgReader<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, pos: 0 }
    }

    pub fn uint(&mut self) -> Result<u32, UnmarshalError> {
        let words = self.take_words(1)?;
        Ok(words[0])
    }

    pub fn int(&mut self) -> Result<i32, UnmarshalError> {
        Ok(self.uint()? as i32)
    }

    pub fn fixed(&mut self) -> Result<Fixed, UnmarshalError> {
        Ok(Fixed(self.int()?))
    }

    pub fn object(&mut self) -> Result<ObjectId, UnmarshalError> {
        self.object_or_null()?.ok_or(UnmarshalError::UnexpectedNull)
    }

    pub fn object_or_null(&mut self) -> Result<Option<ObjectId>, UnmarshalError> {
        Ok(NonZeroU32::new(self.uint()?).map(ObjectId))
    }

    /// A view of the string payload, NUL located at `length - 1`.
    ///
    /// The zero fill after the NUL is skipped but not required.
    pub fn string(&mut self) -> Result<&'a CStr, UnmarshalError> {
        let len = self.uint()? as usize;
        if len == 0 {
            return Err(UnmarshalError::UnexpectedNull);
        }
        let bytes = self.bytes(len)?;
        CStr::from_bytes_with_nul(bytes).map_err(|_| UnmarshalError::BadString)
    }

    /// A view of the array payload reinterpreted as `T`-wide elements.
    pub fn array<T: ArrayElement>(&mut self) -> Result<&'a [T], UnmarshalError> {
        let len = self.uint()? as usize;
        let bytes = self.bytes(len)?;
        if len % mem::size_of::<T>() != 0 {
            return Err(UnmarshalError::BadArrayLength);
        }
        // SAFETY: the payload starts on a word boundary of the backing
        // `[u32]` buffer and `ArrayElement` is limited to plain word-sized
        // or word-dividing types, so alignment and size both hold.
        Ok(unsafe { slice::from_raw_parts(bytes.as_ptr().cast(), len / mem::size_of::<T>()) })
    }

    fn take_words(&mut self, count: usize) -> Result<&'a [u32], UnmarshalError> {
        let words: &'a [u32] = self.words;
        let end = self
            .pos
            .checked_add(count)
            .ok_or(UnmarshalError::EndOfStream)?;
        let taken = words
            .get(self.pos..end)
            .ok_or(UnmarshalError::EndOfStream)?;
        self.pos = end;
        Ok(taken)
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], UnmarshalError> {
        let words = self.take_words(len.div_ceil(4))?;
        Ok(&words_as_bytes(words)[..len])
    }
}

/// Element types a wire array may be viewed as: plain old data whose size
/// is 4 or divides 4.
pub trait ArrayElement: sealed::Sealed + Copy {}

impl ArrayElement for u8 {}
impl ArrayElement for u16 {}
impl ArrayElement for i32 {}
impl ArrayElement for u32 {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
}

/// View a word buffer as raw bytes.
pub fn words_as_bytes(words: &[u32]) -> &[u8] {
    // SAFETY: u8 needs no alignment and every byte of a u32 is initialized.
    unsafe { slice::from_raw_parts(words.as_ptr().cast(), mem::size_of_val(words)) }
}

/// View a word buffer as raw bytes, mutably.
pub fn words_as_bytes_mut(words: &mut [u32]) -> &mut [u8] {
    // SAFETY: as above; u8 cannot violate u32's validity invariant.
    unsafe { slice::from_raw_parts_mut(words.as_mut_ptr().cast(), mem::size_of_val(words)) }
}
