//! The xdg-shell protocol: desktop-style window roles for `wl_surface`s.

use std::ffi::CString;

use waywire_core::marshal::{ArgReader, ArgWriter, Marshal, MarshalError, Unmarshal, UnmarshalError};
use waywire_core::{ArgKind, Interface, MessageDesc, MessageHeader, ObjectId};

pub mod xdg_wm_base {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"xdg_wm_base",
        version: 2,
        requests: &[
            MessageDesc { name: "destroy", signature: &[] },
            MessageDesc { name: "create_positioner", signature: &[ArgKind::NewId] },
            MessageDesc {
                name: "get_xdg_surface",
                signature: &[ArgKind::NewId, ArgKind::Object],
            },
            MessageDesc { name: "pong", signature: &[ArgKind::Uint] },
        ],
        events: &[MessageDesc { name: "ping", signature: &[ArgKind::Uint] }],
    };

    #[derive(Debug)]
    pub enum Request {
        Destroy,
        CreatePositioner { id: ObjectId },
        GetXdgSurface { id: ObjectId, surface: ObjectId },
        /// Answer a `ping` with the same serial or be deemed unresponsive.
        Pong { serial: u32 },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Destroy => 0,
                Self::CreatePositioner { .. } => 1,
                Self::GetXdgSurface { .. } => 2,
                Self::Pong { .. } => 3,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Destroy => Ok(()),
                Self::CreatePositioner { id } => w.object(*id),
                Self::GetXdgSurface { id, surface } => {
                    w.object(*id)?;
                    w.object(*surface)
                }
                Self::Pong { serial } => w.uint(*serial),
            }
        }
    }

    #[derive(Debug)]
    pub enum Event {
        Ping { serial: u32 },
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Ping { serial: r.uint()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod xdg_surface {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"xdg_surface",
        version: 2,
        requests: &[
            MessageDesc { name: "destroy", signature: &[] },
            MessageDesc { name: "get_toplevel", signature: &[ArgKind::NewId] },
            MessageDesc {
                name: "get_popup",
                signature: &[ArgKind::NewId, ArgKind::Object, ArgKind::Object],
            },
            MessageDesc {
                name: "set_window_geometry",
                signature: &[ArgKind::Int, ArgKind::Int, ArgKind::Int, ArgKind::Int],
            },
            MessageDesc { name: "ack_configure", signature: &[ArgKind::Uint] },
        ],
        events: &[MessageDesc { name: "configure", signature: &[ArgKind::Uint] }],
    };

    #[derive(Debug)]
    pub enum Request {
        Destroy,
        GetToplevel { id: ObjectId },
        GetPopup { id: ObjectId, parent: Option<ObjectId>, positioner: ObjectId },
        SetWindowGeometry { x: i32, y: i32, width: i32, height: i32 },
        /// Commit to the configure event with this serial; must precede the
        /// next `wl_surface.commit` that applies it.
        AckConfigure { serial: u32 },
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Destroy => 0,
                Self::GetToplevel { .. } => 1,
                Self::GetPopup { .. } => 2,
                Self::SetWindowGeometry { .. } => 3,
                Self::AckConfigure { .. } => 4,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Destroy => Ok(()),
                Self::GetToplevel { id } => w.object(*id),
                Self::GetPopup { id, parent, positioner } => {
                    w.object(*id)?;
                    w.object_or_null(*parent)?;
                    w.object(*positioner)
                }
                Self::SetWindowGeometry { x, y, width, height } => {
                    w.int(*x)?;
                    w.int(*y)?;
                    w.int(*width)?;
                    w.int(*height)
                }
                Self::AckConfigure { serial } => w.uint(*serial),
            }
        }
    }

    #[derive(Debug)]
    pub enum Event {
        Configure { serial: u32 },
    }

    impl<'a> Unmarshal<'a> for Event {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Configure { serial: r.uint()? }),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}

pub mod xdg_toplevel {
    use super::*;

    pub const INTERFACE: &Interface = &Interface {
        name: c"xdg_toplevel",
        version: 2,
        requests: &[
            MessageDesc { name: "destroy", signature: &[] },
            MessageDesc { name: "set_parent", signature: &[ArgKind::Object] },
            MessageDesc { name: "set_title", signature: &[ArgKind::String] },
            MessageDesc { name: "set_app_id", signature: &[ArgKind::String] },
            MessageDesc {
                name: "show_window_menu",
                signature: &[ArgKind::Object, ArgKind::Uint, ArgKind::Int, ArgKind::Int],
            },
            MessageDesc { name: "move", signature: &[ArgKind::Object, ArgKind::Uint] },
            MessageDesc {
                name: "resize",
                signature: &[ArgKind::Object, ArgKind::Uint, ArgKind::Enum],
            },
            MessageDesc { name: "set_max_size", signature: &[ArgKind::Int, ArgKind::Int] },
            MessageDesc { name: "set_min_size", signature: &[ArgKind::Int, ArgKind::Int] },
            MessageDesc { name: "set_maximized", signature: &[] },
            MessageDesc { name: "unset_maximized", signature: &[] },
            MessageDesc { name: "set_fullscreen", signature: &[ArgKind::Object] },
            MessageDesc { name: "unset_fullscreen", signature: &[] },
            MessageDesc { name: "set_minimized", signature: &[] },
        ],
        events: &[
            MessageDesc {
                name: "configure",
                signature: &[ArgKind::Int, ArgKind::Int, ArgKind::Array],
            },
            MessageDesc { name: "close", signature: &[] },
        ],
    };

    waywire_core::wl_enum! {
        /// Which edge is being dragged in a `resize`.
        pub enum ResizeEdge {
            None = 0,
            Top = 1,
            Bottom = 2,
            Left = 4,
            TopLeft = 5,
            BottomLeft = 6,
            Right = 8,
            TopRight = 9,
            BottomRight = 10,
        }
    }

    waywire_core::wl_enum! {
        /// Window states delivered in the `configure` states array.
        pub enum State {
            Maximized = 1,
            Fullscreen = 2,
            Resizing = 3,
            Activated = 4,
            TiledLeft = 5,
            TiledRight = 6,
            TiledTop = 7,
            TiledBottom = 8,
        }
    }

    #[derive(Debug)]
    pub enum Request {
        Destroy,
        SetParent { parent: Option<ObjectId> },
        SetTitle { title: CString },
        SetAppId { app_id: CString },
        ShowWindowMenu { seat: ObjectId, serial: u32, x: i32, y: i32 },
        Move { seat: ObjectId, serial: u32 },
        Resize { seat: ObjectId, serial: u32, edges: ResizeEdge },
        SetMaxSize { width: i32, height: i32 },
        SetMinSize { width: i32, height: i32 },
        SetMaximized,
        UnsetMaximized,
        /// A null output lets the compositor pick one.
        SetFullscreen { output: Option<ObjectId> },
        UnsetFullscreen,
        SetMinimized,
    }

    impl Marshal for Request {
        const INTERFACE: &'static Interface = INTERFACE;

        fn opcode(&self) -> u16 {
            match self {
                Self::Destroy => 0,
                Self::SetParent { .. } => 1,
                Self::SetTitle { .. } => 2,
                Self::SetAppId { .. } => 3,
                Self::ShowWindowMenu { .. } => 4,
                Self::Move { .. } => 5,
                Self::Resize { .. } => 6,
                Self::SetMaxSize { .. } => 7,
                Self::SetMinSize { .. } => 8,
                Self::SetMaximized => 9,
                Self::UnsetMaximized => 10,
                Self::SetFullscreen { .. } => 11,
                Self::UnsetFullscreen => 12,
                Self::SetMinimized => 13,
            }
        }

        fn marshal(&self, w: &mut ArgWriter<'_>) -> Result<(), MarshalError> {
            match self {
                Self::Destroy
                | Self::SetMaximized
                | Self::UnsetMaximized
                | Self::UnsetFullscreen
                | Self::SetMinimized => Ok(()),
                Self::SetParent { parent } => w.object_or_null(*parent),
                Self::SetTitle { title } => w.string(title),
                Self::SetAppId { app_id } => w.string(app_id),
                Self::ShowWindowMenu { seat, serial, x, y } => {
                    w.object(*seat)?;
                    w.uint(*serial)?;
                    w.int(*x)?;
                    w.int(*y)
                }
                Self::Move { seat, serial } => {
                    w.object(*seat)?;
                    w.uint(*serial)
                }
                Self::Resize { seat, serial, edges } => {
                    w.object(*seat)?;
                    w.uint(*serial)?;
                    w.uint(u32::from(*edges))
                }
                Self::SetMaxSize { width, height } | Self::SetMinSize { width, height } => {
                    w.int(*width)?;
                    w.int(*height)
                }
                Self::SetFullscreen { output } => w.object_or_null(*output),
            }
        }
    }

    #[derive(Debug)]
    pub enum Event<'a> {
        /// A zero width or height leaves that dimension up to the client.
        /// `states` is a word array; see [`State`].
        Configure { width: i32, height: i32, states: &'a [u32] },
        Close,
    }

    impl<'a> Unmarshal<'a> for Event<'a> {
        const INTERFACE: &'static Interface = INTERFACE;

        fn unmarshal(header: &MessageHeader, r: &mut ArgReader<'a>) -> Result<Self, UnmarshalError> {
            match header.opcode {
                0 => Ok(Self::Configure {
                    width: r.int()?,
                    height: r.int()?,
                    states: r.array()?,
                }),
                1 => Ok(Self::Close),
                op => Err(UnmarshalError::UnknownOpcode(op)),
            }
        }
    }
}
