//! The registry bootstrap: discover and bind the globals a program needs.

use std::ffi::CString;

use waywire_core::marshal::{unmarshal_message, UnmarshalError};
use waywire_core::{Interface, ObjectId};

use crate::connection::{Connection, RecvError, SendError};
use crate::id_pool::IdPool;
use crate::protocol::{wl_display, wl_registry};

/// An error that can occur during [`register_globals`].
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// A required interface was advertised below the version the catalog
    /// descriptor asks for.
    #[error("compositor advertises {interface:?} v{advertised}, v{required} is required")]
    OutdatedCompositorProtocol {
        interface: CString,
        advertised: u32,
        required: u32,
    },
    /// The compositor reported a fatal protocol error.
    #[error("protocol error on object {} (code {code}): {message:?}", .object_id.as_u32())]
    Protocol {
        object_id: ObjectId,
        code: u32,
        message: CString,
    },
    #[error(transparent)]
    Send(#[from] SendError),
    #[error(transparent)]
    Recv(#[from] RecvError),
    #[error(transparent)]
    Decode(#[from] UnmarshalError),
}

// What the receive half of the loop decided, carried as owned data so the
// borrow of the receive buffer ends before the bind is sent.
enum Step {
    Bind { slot: usize, name: u32, interface: CString },
    DeleteId(u32),
    Done,
    Skip,
}

/// Drive the initial `get_registry`/`sync` handshake and bind every
/// advertised global that appears in `required`.
///
/// For each entry the advertised version must be at least the descriptor's
/// `version`; the bind is emitted at exactly the descriptor version, at
/// most once per entry, before the sync callback fires. Returns one id per
/// required interface, in input order; `None` means the compositor never
/// advertised it. Unrelated messages arriving during the handshake are
/// logged and skipped.
///
/// A `global_remove` for a global bound moments earlier is not detected
/// (the protocol offers no way to withdraw the bind); the caller holds an
/// id the server may already consider dead.
pub fn register_globals(
    conn: &mut Connection,
    pool: &mut IdPool,
    required: &[&'static Interface],
) -> Result<Vec<Option<ObjectId>>, BootstrapError> {
    let registry = pool.create();
    conn.send(ObjectId::DISPLAY, wl_display::Request::GetRegistry { registry })?;
    let sync_cb = pool.create();
    conn.send(ObjectId::DISPLAY, wl_display::Request::Sync { callback: sync_cb })?;

    let mut bound = vec![None; required.len()];
    loop {
        let step = {
            let (header, body) = conn.recv()?;

            if header.object_id == sync_cb {
                Step::Done
            } else if header.object_id == ObjectId::DISPLAY {
                match unmarshal_message::<wl_display::Event>(&header, body)? {
                    wl_display::Event::Error { object_id, code, message } => {
                        return Err(BootstrapError::Protocol {
                            object_id,
                            code,
                            message: message.to_owned(),
                        });
                    }
                    wl_display::Event::DeleteId { id } => Step::DeleteId(id),
                }
            } else if header.object_id == registry {
                match unmarshal_message::<wl_registry::Event>(&header, body)? {
                    wl_registry::Event::Global { name, interface, version } => {
                        match required.iter().position(|iface| iface.name == interface) {
                            Some(slot) if bound[slot].is_none() => {
                                if version < required[slot].version {
                                    return Err(BootstrapError::OutdatedCompositorProtocol {
                                        interface: interface.to_owned(),
                                        advertised: version,
                                        required: required[slot].version,
                                    });
                                }
                                Step::Bind { slot, name, interface: interface.to_owned() }
                            }
                            _ => Step::Skip,
                        }
                    }
                    wl_registry::Event::GlobalRemove { name } => {
                        log::debug!("global {name} removed during bootstrap");
                        Step::Skip
                    }
                }
            } else {
                log::debug!(
                    "skipping event for object {} during bootstrap",
                    header.object_id.as_u32(),
                );
                Step::Skip
            }
        };

        match step {
            Step::Bind { slot, name, interface } => {
                let id = pool.create();
                conn.send(
                    registry,
                    wl_registry::Request::Bind {
                        name,
                        interface,
                        version: required[slot].version,
                        id,
                    },
                )?;
                bound[slot] = Some(id);
            }
            Step::DeleteId(id) => {
                if let Some(id) = ObjectId::new(id) {
                    pool.destroy(id);
                }
            }
            Step::Done => break,
            Step::Skip => {}
        }
    }

    Ok(bound)
}
