//! DrawFS device-server process entry point: builds a `Registry` and a
//! `Device`, then drives one scripted client session over the wire
//! protocol so the whole stack can be exercised without a real
//! character-device node.

use clap::Parser;

use drawfs_abi::DisplayInfo;
use drawfs_drivers::{ControlOp, Device, IoctlResult};
use drawfs_lib::DeviceConfig;
use drawfs_userland as client;

/// DrawFS drawing-protocol device server.
#[derive(Parser, Debug)]
#[command(name = "drawfs-server", version, about)]
struct Args {
    /// Width of the single simulated display, in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Height of the single simulated display, in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Refresh rate of the simulated display, in millihertz.
    #[arg(long, default_value_t = 60_000)]
    refresh_mhz: u32,

    /// Number of SURFACE_PRESENT round-trips the scripted session runs.
    #[arg(long, default_value_t = 3)]
    presents: u32,

    /// Per-surface pixel byte cap.
    #[arg(long, default_value_t = DeviceConfig::default().max_surface_bytes)]
    max_surface_bytes: u64,

    /// Live-surface cap per session.
    #[arg(long, default_value_t = DeviceConfig::default().max_surfaces_per_session)]
    max_surfaces_per_session: usize,

    /// Outbound queue depth cap per session.
    #[arg(long, default_value_t = DeviceConfig::default().max_outq_depth)]
    max_outq_depth: usize,

    /// Outbound queue aggregate byte cap per session.
    #[arg(long, default_value_t = DeviceConfig::default().max_outq_bytes)]
    max_outq_bytes: usize,

    /// Inbound (not-yet-framed) byte buffer cap per session.
    #[arg(long, default_value_t = DeviceConfig::default().max_inbuf)]
    max_inbuf: usize,
}

fn main() {
    drawfs_lib::init_logging();
    let args = Args::parse();

    let config = DeviceConfig {
        displays: vec![DisplayInfo {
            id: 1,
            width: args.width,
            height: args.height,
            refresh_mhz: args.refresh_mhz,
            flags: 0,
        }],
        max_surface_bytes: args.max_surface_bytes,
        max_surfaces_per_session: args.max_surfaces_per_session,
        max_outq_depth: args.max_outq_depth,
        max_outq_bytes: args.max_outq_bytes,
        max_inbuf: args.max_inbuf,
    };
    let device = Device::new(config);

    run_scripted_session(&device, args.presents);
}

/// Drive one session through HELLO, display enumeration and binding,
/// a surface's whole lifecycle, and `presents` SURFACE_PRESENT
/// round-trips, logging each reply.
fn run_scripted_session(device: &Device, presents: u32) {
    let handle = device.open();
    log::info!("session {} opened", handle.id());

    handle.write(&client::hello(1, 1, 0, 0, 65536)).unwrap();
    log::info!("{:?}", read_reply(&handle));

    handle.write(&client::display_list(2)).unwrap();
    log::info!("{:?}", read_reply(&handle));

    handle.write(&client::display_open(3, 1)).unwrap();
    log::info!("{:?}", read_reply(&handle));

    handle
        .write(&client::surface_create(4, 640, 480, 1, 0))
        .unwrap();
    let sid = match read_reply(&handle) {
        client::Reply::SurfaceCreate { status: 0, sid, .. } => sid,
        other => {
            log::error!("surface create failed: {other:?}");
            return;
        }
    };

    if let Ok(IoctlResult::MapSurface { total, .. }) = handle.ioctl(ControlOp::MapSurface(sid))
        && let Ok(mapping) = handle.mmap(total as usize)
    {
        mapping.with_bytes_mut(|bytes| bytes.fill(0));
    }

    for i in 0..presents {
        handle
            .write(&client::surface_present(10 + i, sid, 0, i as u64))
            .unwrap();
        log::info!("{:?}", read_reply(&handle));
        log::info!("{:?}", read_reply(&handle));
    }

    if let Ok(IoctlResult::Stats(stats)) = handle.ioctl(ControlOp::Stats) {
        log::info!("session {} stats: {stats:?}", handle.id());
    }

    handle.write(&client::surface_destroy(20, sid)).unwrap();
    log::info!("{:?}", read_reply(&handle));

    handle.close();
}

fn read_reply(handle: &drawfs_drivers::Handle) -> client::Reply {
    let frame = handle.read_blocking().expect("session closed unexpectedly");
    client::decode_frame(&frame)
}
