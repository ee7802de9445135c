//! Scripted DrawFS client: opens a session against an in-process
//! `Device`, negotiates, binds a display, creates a surface, and
//! presents it a few times, logging every reply and event.

use drawfs_drivers::{ControlOp, Device, IoctlResult};
use drawfs_lib::DeviceConfig;
use drawfs_userland::{self as client, Reply};

fn main() {
    drawfs_lib::init_logging();

    let device = Device::new(DeviceConfig::default());
    let handle = device.open();
    log::info!("opened session {}", handle.id());

    handle.write(&client::hello(1, 1, 0, 0, 65536)).unwrap();
    expect_reply(&handle, "HELLO");

    handle.write(&client::display_list(2)).unwrap();
    match read_reply(&handle) {
        Reply::DisplayList { displays } => {
            for d in &displays {
                log::info!(
                    "display {}: {}x{} @ {}mHz",
                    d.id,
                    d.width,
                    d.height,
                    d.refresh_mhz
                );
            }
        }
        other => log::warn!("unexpected DISPLAY_LIST reply: {other:?}"),
    }

    handle.write(&client::display_open(3, 1)).unwrap();
    expect_reply(&handle, "DISPLAY_OPEN");

    handle
        .write(&client::surface_create(4, 640, 480, 1, 0))
        .unwrap();
    let sid = match read_reply(&handle) {
        Reply::SurfaceCreate {
            status: 0,
            sid,
            stride,
            total,
        } => {
            log::info!("surface {sid} created: stride={stride} total={total}");
            sid
        }
        other => panic!("surface create failed: {other:?}"),
    };

    match handle.ioctl(ControlOp::MapSurface(sid)).unwrap() {
        IoctlResult::MapSurface { total, .. } => {
            let mapping = handle.mmap(total as usize).unwrap();
            mapping.with_bytes_mut(|bytes| bytes.fill(0x20));
            log::info!("mapped {} bytes for surface {sid}", mapping.len());
        }
        _ => unreachable!(),
    }

    for cookie in 0..3u64 {
        handle
            .write(&client::surface_present(10 + cookie as u32, sid, 0, cookie))
            .unwrap();
        match read_reply(&handle) {
            Reply::SurfacePresent { status: 0, .. } => {}
            other => panic!("present reply unexpected: {other:?}"),
        }
        match read_reply(&handle) {
            Reply::SurfacePresented {
                cookie: evt_cookie, ..
            } => log::info!("present {cookie} acknowledged (cookie {evt_cookie})"),
            other => panic!("present event unexpected: {other:?}"),
        }
    }

    match handle.ioctl(ControlOp::Stats).unwrap() {
        IoctlResult::Stats(stats) => log::info!("final stats: {stats:?}"),
        _ => unreachable!(),
    }

    handle.write(&client::surface_destroy(20, sid)).unwrap();
    expect_reply(&handle, "SURFACE_DESTROY");
}

fn read_reply(handle: &drawfs_drivers::Handle) -> Reply {
    let frame = handle.read_blocking().expect("session closed unexpectedly");
    client::decode_frame(&frame)
}

fn expect_reply(handle: &drawfs_drivers::Handle, label: &str) {
    log::info!("{label} -> {:?}", read_reply(handle));
}
