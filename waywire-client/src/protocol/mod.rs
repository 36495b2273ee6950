//! The typed interface catalog.
//!
//! Hand-maintained from the core `wayland.xml` schema, one module per
//! interface. Every module carries its static [`Interface`] descriptor and
//! a `Request`/`Event` enum pair whose variants are position-encoded: the
//! wire opcode of a message is its index in the descriptor table. Request
//! tables may stop short of the schema's tail; event tables are complete
//! for the declared version so a conforming compositor can never send an
//! opcode the decoder lacks.
//!
//! Messages with `fd` arguments keep them out of the word stream: requests
//! carry an `OwnedFd` that is transmitted (and then closed) by
//! [`Connection::send`], events deliver theirs through
//! [`Connection::take_fd`].
//!
//! [`Connection::send`]: crate::Connection::send
//! [`Connection::take_fd`]: crate::Connection::take_fd

pub mod xdg_shell;

pub use xdg_shell::{xdg_surface, xdg_toplevel, xdg_wm_base};

use std::ffi::{CStr, CString};
use std::os::fd::{AsRawFd, OwnedFd};

use waywire_core::marshal::{ArgReader, ArgWriter, Marshal, MarshalError, Unmarshal, UnmarshalError};
use waywire_core::{ArgKind, Fixed, Interface, MessageDesc, MessageHeader, ObjectId};

/// The core global object; always object 1 on every connection.
pub mod wl_display {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_display",
        version: 1,
        requests: &[
            MessageDesc { name: "sync", signature: &[ArgKind::NewId] },
            MessageDesc { name: "get_registry", signature: &[ArgKind::NewId] },
        ],
        events: &[
            MessageDesc {
                name: "error",
                signature: &[ArgKind::Object, ArgKind::Uint, ArgKind::String],
            },
            MessageDesc { name: "delete_id", signature: &[ArgKind::Uint] },
        ],
    };

    waywire_core::wl_enum! {
        /// Global error codes carried by `error` events on any object.
        pub enum Error {
            InvalidObject = 0,
            InvalidMethod = 1,
            NoMemory = 2,
            Implementation = 3,
        }
    }

    #[derive(Debug)]
    pub enum Request {
        /// Ask the server to fire `wl_callback.done` on `callback` once
        /// every prior request has been processed.
        Sync { callback: ObjectId },
        GetRegistry { registry: ObjectId },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Sync { .. } => 0,
                Self::GetRegistry { .. } => 1,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Sync { callback } => w.object(*callback),
                Self::GetRegistry { registry } => w.object(*registry),
            }
        }
    }

    #[derive(Debug)]
    pub enum Event<'a> {
        /// Fatal protocol error; the connection is unusable afterwards.
        Error { object_id: ObjectId, code: u32, message: &'a CStr },
        /// The server is done with object `id`; return it to the id pool.
        DeleteId { id: u32 },
    }

    impl<'a> Unmarshal<'a> for Event<'a> {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Error {
                    object_id: r.object()?,
                    code: r.uint()?,
                    message: r.string()?,
                }),
                1 => Ok(Self::DeleteId { id: r.uint()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

/// The singleton that advertises and binds globals.
pub mod wl_registry {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_registry",
        version: 1,
        requests: &[MessageDesc {
            name: "bind",
            signature: &[ArgKind::Uint, ArgKind::String, ArgKind::Uint, ArgKind::NewId],
        }],
        events: &[
            MessageDesc {
                name: "global",
                signature: &[ArgKind::Uint, ArgKind::String, ArgKind::Uint],
            },
            MessageDesc { name: "global_remove", signature: &[ArgKind::Uint] },
        ],
    };

    #[derive(Debug)]
    pub enum Request {
        /// Bind the advertised global `name` as `id`. The untyped new_id
        /// puts the interface name and version on the wire ahead of the id
        /// so the server can validate them.
        Bind { name: u32, interface: CString, version: u32, id: ObjectId },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Bind { .. } => 0,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Bind { name, interface, version, id } => {
                    w.uint(*name)?;
                    w.string(interface)?;
                    w.uint(*version)?;
                    w.object(*id)
                }
            }
        }
    }

    #[derive(Debug)]
    pub enum Event<'a> {
        Global { name: u32, interface: &'a CStr, version: u32 },
        GlobalRemove { name: u32 },
    }

    impl<'a> Unmarshal<'a> for Event<'a> {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Global {
                    name: r.uint()?,
                    interface: r.string()?,
                    version: r.uint()?,
                }),
                1 => Ok(Self::GlobalRemove { name: r.uint()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

/// One-shot completion barrier.
pub mod wl_callback {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_callback",
        version: 1,
        requests: &[],
        events: &[MessageDesc { name: "done", signature: &[ArgKind::Uint] }],
    };

    #[derive(Debug)]
    pub enum Event {
        Done { callback_data: u32 },
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Done { callback_data: r.uint()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod wl_compositor {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_compositor",
        version: 4,
        requests: &[
            MessageDesc { name: "create_surface", signature: &[ArgKind::NewId] },
            MessageDesc { name: "create_region", signature: &[ArgKind::NewId] },
        ],
        events: &[],
    };

    #[derive(Debug)]
    pub enum Request {
        CreateSurface { id: ObjectId },
        CreateRegion { id: ObjectId },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::CreateSurface { .. } => 0,
                Self::CreateRegion { .. } => 1,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::CreateSurface { id } | Self::CreateRegion { id } => w.object(*id),
            }
        }
    }
}

/// Shared-memory buffer factory.
pub mod wl_shm {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_shm",
        version: 1,
        requests: &[MessageDesc {
            name: "create_pool",
            signature: &[ArgKind::NewId, ArgKind::Fd, ArgKind::Int],
        }],
        events: &[MessageDesc { name: "format", signature: &[ArgKind::Enum] }],
    };

    waywire_core::wl_enum! {
        pub enum Error {
            InvalidFormat = 0,
            InvalidStride = 1,
            InvalidFd = 2,
        }
    }

    waywire_core::wl_open_enum! {
        /// Pixel formats; fourcc codes beyond the two mandatory ones, and
        /// open because compositors keep gaining formats.
        pub enum Format {
            Argb8888 = 0,
            Xrgb8888 = 1,
            C8 = 0x20203843,
            Rgb565 = 0x36314752,
            Rgb888 = 0x34324752,
            Bgr888 = 0x34324742,
            Xbgr8888 = 0x34324258,
            Abgr8888 = 0x34324241,
            Xrgb2101010 = 0x30335258,
            Argb2101010 = 0x30335241,
        }
    }

    #[derive(Debug)]
    pub enum Request {
        /// Create a pool backed by the mapped file behind `fd`. The
        /// descriptor travels out of band and is closed after the send;
        /// keep a duplicate to mmap the pool yourself.
        CreatePool { id: ObjectId, fd: OwnedFd, size: i32 },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::CreatePool { .. } => 0,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::CreatePool { id, fd, size } => {
                    w.object(*id)?;
                    w.fd(fd.as_raw_fd())?;
                    w.int(*size)
                }
            }
        }
    }

    #[derive(Debug)]
    pub enum Event {
        Format { format: Format },
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Format { format: Format::from(r.uint()?) }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod wl_shm_pool {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_shm_pool",
        version: 1,
        requests: &[
            MessageDesc {
                name: "create_buffer",
                signature: &[
                    ArgKind::NewId,
                    ArgKind::Int,
                    ArgKind::Int,
                    ArgKind::Int,
                    ArgKind::Int,
                    ArgKind::Enum,
                ],
            },
            MessageDesc { name: "destroy", signature: &[] },
            MessageDesc { name: "resize", signature: &[ArgKind::Int] },
        ],
        events: &[],
    };

    #[derive(Debug)]
    pub enum Request {
        CreateBuffer {
            id: ObjectId,
            offset: i32,
            width: i32,
            height: i32,
            stride: i32,
            format: super::wl_shm::Format,
        },
        Destroy,
        /// Grow the pool; shrinking is a protocol violation.
        Resize { size: i32 },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::CreateBuffer { .. } => 0,
                Self::Destroy => 1,
                Self::Resize { .. } => 2,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::CreateBuffer { id, offset, width, height, stride, format } => {
                    w.object(*id)?;
                    w.int(*offset)?;
                    w.int(*width)?;
                    w.int(*height)?;
                    w.int(*stride)?;
                    w.uint(u32::from(*format))
                }
                Self::Destroy => Ok(()),
                Self::Resize { size } => w.int(*size),
            }
        }
    }
}

pub mod wl_buffer {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_buffer",
        version: 1,
        requests: &[MessageDesc { name: "destroy", signature: &[] }],
        events: &[MessageDesc { name: "release", signature: &[] }],
    };

    #[derive(Debug)]
    pub enum Request {
        Destroy,
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Destroy => 0,
            }
        }

        fn marshal(&self, _: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            Ok(())
        }
    }

    #[derive(Debug)]
    pub enum Event {
        /// The compositor no longer reads the buffer; it may be reused.
        Release,
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, _: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Release),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

/// A rectangle of pixels the compositor composites.
pub mod wl_surface {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_surface",
        version: 4,
        requests: &[
            MessageDesc { name: "destroy", signature: &[] },
            MessageDesc {
                name: "attach",
                signature: &[ArgKind::Object, ArgKind::Int, ArgKind::Int],
            },
            MessageDesc {
                name: "damage",
                signature: &[ArgKind::Int, ArgKind::Int, ArgKind::Int, ArgKind::Int],
            },
            MessageDesc { name: "frame", signature: &[ArgKind::NewId] },
            MessageDesc { name: "set_opaque_region", signature: &[ArgKind::Object] },
            MessageDesc { name: "set_input_region", signature: &[ArgKind::Object] },
            MessageDesc { name: "commit", signature: &[] },
        ],
        events: &[
            MessageDesc { name: "enter", signature: &[ArgKind::Object] },
            MessageDesc { name: "leave", signature: &[ArgKind::Object] },
        ],
    };

    #[derive(Debug)]
    pub enum Request {
        Destroy,
        /// A null buffer detaches the current content.
        Attach { buffer: Option<ObjectId>, x: i32, y: i32 },
        Damage { x: i32, y: i32, width: i32, height: i32 },
        /// Request a `wl_callback.done` for the next frame.
        Frame { callback: ObjectId },
        SetOpaqueRegion { region: Option<ObjectId> },
        SetInputRegion { region: Option<ObjectId> },
        /// Atomically apply all pending state.
        Commit,
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Destroy => 0,
                Self::Attach { .. } => 1,
                Self::Damage { .. } => 2,
                Self::Frame { .. } => 3,
                Self::SetOpaqueRegion { .. } => 4,
                Self::SetInputRegion { .. } => 5,
                Self::Commit => 6,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Destroy | Self::Commit => Ok(()),
                Self::Attach { buffer, x, y } => {
                    w.object_or_null(*buffer)?;
                    w.int(*x)?;
                    w.int(*y)
                }
                Self::Damage { x, y, width, height } => {
                    w.int(*x)?;
                    w.int(*y)?;
                    w.int(*width)?;
                    w.int(*height)
                }
                Self::Frame { callback } => w.object(*callback),
                Self::SetOpaqueRegion { region } | Self::SetInputRegion { region } => {
                    w.object_or_null(*region)
                }
            }
        }
    }

    #[derive(Debug)]
    pub enum Event {
        Enter { output: ObjectId },
        Leave { output: ObjectId },
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Enter { output: r.object()? }),
                1 => Ok(Self::Leave { output: r.object()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod wl_region {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_region",
        version: 1,
        requests: &[
            MessageDesc { name: "destroy", signature: &[] },
            MessageDesc {
                name: "add",
                signature: &[ArgKind::Int, ArgKind::Int, ArgKind::Int, ArgKind::Int],
            },
            MessageDesc {
                name: "subtract",
                signature: &[ArgKind::Int, ArgKind::Int, ArgKind::Int, ArgKind::Int],
            },
        ],
        events: &[],
    };

    #[derive(Debug)]
    pub enum Request {
        Destroy,
        Add { x: i32, y: i32, width: i32, height: i32 },
        Subtract { x: i32, y: i32, width: i32, height: i32 },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Destroy => 0,
                Self::Add { .. } => 1,
                Self::Subtract { .. } => 2,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Destroy => Ok(()),
                Self::Add { x, y, width, height } | Self::Subtract { x, y, width, height } => {
                    w.int(*x)?;
                    w.int(*y)?;
                    w.int(*width)?;
                    w.int(*height)
                }
            }
        }
    }
}

/// A group of input devices behind one seat.
pub mod wl_seat {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_seat",
        version: 5,
        requests: &[
            MessageDesc { name: "get_pointer", signature: &[ArgKind::NewId] },
            MessageDesc { name: "get_keyboard", signature: &[ArgKind::NewId] },
            MessageDesc { name: "get_touch", signature: &[ArgKind::NewId] },
            MessageDesc { name: "release", signature: &[] },
        ],
        events: &[
            MessageDesc { name: "capabilities", signature: &[ArgKind::Bitfield] },
            MessageDesc { name: "name", signature: &[ArgKind::String] },
        ],
    };

    waywire_core::wl_bitfield! {
        pub struct Capability {
            Pointer = 1,
            Keyboard = 2,
            Touch = 4,
        }
    }

    #[derive(Debug)]
    pub enum Request {
        GetPointer { id: ObjectId },
        GetKeyboard { id: ObjectId },
        GetTouch { id: ObjectId },
        Release,
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::GetPointer { .. } => 0,
                Self::GetKeyboard { .. } => 1,
                Self::GetTouch { .. } => 2,
                Self::Release => 3,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::GetPointer { id } | Self::GetKeyboard { id } | Self::GetTouch { id } => {
                    w.object(*id)
                }
                Self::Release => Ok(()),
            }
        }
    }

    #[derive(Debug)]
    pub enum Event<'a> {
        Capabilities { capabilities: Capability },
        Name { name: &'a CStr },
    }

    impl<'a> Unmarshal<'a> for Event<'a> {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Capabilities { capabilities: Capability::from(r.uint()?) }),
                1 => Ok(Self::Name { name: r.string()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod wl_pointer {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_pointer",
        version: 4,
        requests: &[
            MessageDesc {
                name: "set_cursor",
                signature: &[ArgKind::Uint, ArgKind::Object, ArgKind::Int, ArgKind::Int],
            },
            MessageDesc { name: "release", signature: &[] },
        ],
        events: &[
            MessageDesc {
                name: "enter",
                signature: &[ArgKind::Uint, ArgKind::Object, ArgKind::Fixed, ArgKind::Fixed],
            },
            MessageDesc { name: "leave", signature: &[ArgKind::Uint, ArgKind::Object] },
            MessageDesc {
                name: "motion",
                signature: &[ArgKind::Uint, ArgKind::Fixed, ArgKind::Fixed],
            },
            MessageDesc {
                name: "button",
                signature: &[ArgKind::Uint, ArgKind::Uint, ArgKind::Uint, ArgKind::Enum],
            },
            MessageDesc {
                name: "axis",
                signature: &[ArgKind::Uint, ArgKind::Enum, ArgKind::Fixed],
            },
        ],
    };

    waywire_core::wl_enum! {
        pub enum ButtonState {
            Released = 0,
            Pressed = 1,
        }
    }

    waywire_core::wl_enum! {
        pub enum Axis {
            VerticalScroll = 0,
            HorizontalScroll = 1,
        }
    }

    #[derive(Debug)]
    pub enum Request {
        /// A null surface hides the cursor.
        SetCursor { serial: u32, surface: Option<ObjectId>, hotspot_x: i32, hotspot_y: i32 },
        Release,
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::SetCursor { .. } => 0,
                Self::Release => 1,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::SetCursor { serial, surface, hotspot_x, hotspot_y } => {
                    w.uint(*serial)?;
                    w.object_or_null(*surface)?;
                    w.int(*hotspot_x)?;
                    w.int(*hotspot_y)
                }
                Self::Release => Ok(()),
            }
        }
    }

    #[derive(Debug)]
    pub enum Event {
        Enter { serial: u32, surface: ObjectId, surface_x: Fixed, surface_y: Fixed },
        Leave { serial: u32, surface: ObjectId },
        Motion { time: u32, surface_x: Fixed, surface_y: Fixed },
        Button { serial: u32, time: u32, button: u32, state: ButtonState },
        Axis { time: u32, axis: Axis, value: Fixed },
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Enter {
                    serial: r.uint()?,
                    surface: r.object()?,
                    surface_x: r.fixed()?,
                    surface_y: r.fixed()?,
                }),
                1 => Ok(Self::Leave { serial: r.uint()?, surface: r.object()? }),
                2 => Ok(Self::Motion {
                    time: r.uint()?,
                    surface_x: r.fixed()?,
                    surface_y: r.fixed()?,
                }),
                3 => Ok(Self::Button {
                    serial: r.uint()?,
                    time: r.uint()?,
                    button: r.uint()?,
                    state: r.uint()?.try_into()?,
                }),
                4 => Ok(Self::Axis {
                    time: r.uint()?,
                    axis: r.uint()?.try_into()?,
                    value: r.fixed()?,
                }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod wl_keyboard {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"wl_keyboard",
        version: 4,
        requests: &[MessageDesc { name: "release", signature: &[] }],
        events: &[
            MessageDesc {
                name: "keymap",
                signature: &[ArgKind::Enum, ArgKind::Fd, ArgKind::Uint],
            },
            MessageDesc {
                name: "enter",
                signature: &[ArgKind::Uint, ArgKind::Object, ArgKind::Array],
            },
            MessageDesc { name: "leave", signature: &[ArgKind::Uint, ArgKind::Object] },
            MessageDesc {
                name: "key",
                signature: &[ArgKind::Uint, ArgKind::Uint, ArgKind::Uint, ArgKind::Enum],
            },
            MessageDesc {
                name: "modifiers",
                signature: &[
                    ArgKind::Uint,
                    ArgKind::Uint,
                    ArgKind::Uint,
                    ArgKind::Uint,
                    ArgKind::Uint,
                ],
            },
            MessageDesc { name: "repeat_info", signature: &[ArgKind::Int, ArgKind::Int] },
        ],
    };

    waywire_core::wl_enum! {
        pub enum KeymapFormat {
            NoKeymap = 0,
            XkbV1 = 1,
        }
    }

    waywire_core::wl_enum! {
        pub enum KeyState {
            Released = 0,
            Pressed = 1,
        }
    }

    #[derive(Debug)]
    pub enum Request {
        Release,
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Release => 0,
            }
        }

        fn marshal(&self, _: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            Ok(())
        }
    }

    #[derive(Debug)]
    pub enum Event<'a> {
        /// The keymap file arrives out of band: call `Connection::take_fd`
        /// once after receiving this event, then map `size` bytes of it.
        Keymap { format: KeymapFormat, size: u32 },
        Enter { serial: u32, surface: ObjectId, keys: &'a [u32] },
        Leave { serial: u32, surface: ObjectId },
        Key { serial: u32, time: u32, key: u32, state: KeyState },
        Modifiers {
            serial: u32,
            mods_depressed: u32,
            mods_latched: u32,
            mods_locked: u32,
            group: u32,
        },
        RepeatInfo { rate: i32, delay: i32 },
    }

    impl<'a> Unmarshal<'a> for Event<'a> {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Keymap {
                    format: r.uint()?.try_into()?,
                    size: r.uint()?,
                }),
                1 => Ok(Self::Enter {
                    serial: r.uint()?,
                    surface: r.object()?,
                    keys: r.array()?,
                }),
                2 => Ok(Self::Leave { serial: r.uint()?, surface: r.object()? }),
                3 => Ok(Self::Key {
                    serial: r.uint()?,
                    time: r.uint()?,
                    key: r.uint()?,
                    state: r.uint()?.try_into()?,
                }),
                4 => Ok(Self::Modifiers {
                    serial: r.uint()?,
                    mods_depressed: r.uint()?,
                    mods_latched: r.uint()?,
                    mods_locked: r.uint()?,
                    group: r.uint()?,
                }),
                5 => Ok(Self::RepeatInfo { rate: r.int()?, delay: r.int()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}
