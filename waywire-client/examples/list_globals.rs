use waywire_client::protocol::{wl_compositor, wl_seat, wl_shm};
use waywire_client::{register_globals, Connection, IdPool};

fn main() {
    env_logger::init();

    let mut conn = Connection::connect().expect("cannot reach the compositor");
    let mut ids = IdPool::new();

    let required = [
        wl_compositor::INTERFACE,
        wl_shm::INTERFACE,
        wl_seat::INTERFACE,
    ];
    let bound = register_globals(&mut conn, &mut ids, &required).unwrap();

    for (iface, id) in required.iter().zip(&bound) {
        match id {
            Some(id) => println!(
                "{} v{} -> object {}",
                iface.name.to_string_lossy(),
                iface.version,
                id.as_u32()
            ),
            None => println!("{} not advertised", iface.name.to_string_lossy()),
        }
    }
}
