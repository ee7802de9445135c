//! End-to-end DrawFS scenarios, driven purely through `Device`/`Handle`
//! over the wire protocol rather than any internal hook — the
//! cross-component and concurrency properties that a single leaf
//! component's unit tests can't express.

#[cfg(test)]
mod scenarios {
    use std::sync::Arc;
    use std::thread;

    use drawfs_abi::error::Errno;
    use drawfs_drivers::{ControlOp, Device, Handle, IoctlResult};
    use drawfs_lib::DeviceConfig;
    use drawfs_userland as client;

    fn opened() -> (Device, Handle) {
        let device = Device::new(DeviceConfig::default());
        let handle = device.open();
        (device, handle)
    }

    fn negotiate_and_bind(handle: &Handle) {
        handle.write(&client::hello(1, 1, 0, 0, 65536)).unwrap();
        handle.read_blocking().unwrap();
        handle.write(&client::display_open(2, 1)).unwrap();
        handle.read_blocking().unwrap();
    }

    fn create_surface(handle: &Handle, msg_id: u32, w: u32, h: u32) -> client::Reply {
        handle
            .write(&client::surface_create(msg_id, w, h, 1, 0))
            .unwrap();
        client::decode_frame(&handle.read_blocking().unwrap())
    }

    #[test]
    fn surface_create_before_display_open_is_einval() {
        let (_device, handle) = opened();
        handle.write(&client::hello(1, 1, 0, 0, 65536)).unwrap();
        handle.read_blocking().unwrap();

        match create_surface(&handle, 2, 640, 480) {
            client::Reply::SurfaceCreate { status, .. } => {
                assert_eq!(status, Errno::EINVAL.as_c_int())
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn surface_create_returns_documented_stride_and_total() {
        let (_device, handle) = opened();
        negotiate_and_bind(&handle);

        match create_surface(&handle, 3, 320, 240) {
            client::Reply::SurfaceCreate {
                status: 0,
                sid,
                stride,
                total,
            } => {
                assert_eq!(sid, 1);
                assert_eq!(stride, 1280);
                assert_eq!(total, 307_200);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn unsupported_format_is_eprotonosupport() {
        let (_device, handle) = opened();
        negotiate_and_bind(&handle);
        handle
            .write(&client::surface_create(3, 64, 64, 999, 0))
            .unwrap();
        match client::decode_frame(&handle.read_blocking().unwrap()) {
            client::Reply::SurfaceCreate { status, .. } => {
                assert_eq!(status, Errno::EPROTONOSUPPORT.as_c_int())
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn oversized_surface_is_efbig() {
        let (_device, handle) = opened();
        negotiate_and_bind(&handle);
        match create_surface(&handle, 3, 4096, 4097) {
            client::Reply::SurfaceCreate { status, .. } => {
                assert_eq!(status, Errno::EFBIG.as_c_int())
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn destroy_then_destroy_again_is_enoent() {
        let (_device, handle) = opened();
        negotiate_and_bind(&handle);
        create_surface(&handle, 3, 4, 4);

        handle.write(&client::surface_destroy(4, 1)).unwrap();
        match client::decode_frame(&handle.read_blocking().unwrap()) {
            client::Reply::SurfaceDestroy { status: 0, sid: 1 } => {}
            other => panic!("unexpected first destroy reply: {other:?}"),
        }

        handle.write(&client::surface_destroy(5, 1)).unwrap();
        match client::decode_frame(&handle.read_blocking().unwrap()) {
            client::Reply::SurfaceDestroy { status, sid: 1 } => {
                assert_eq!(status, Errno::ENOENT.as_c_int())
            }
            other => panic!("unexpected second destroy reply: {other:?}"),
        }
    }

    /// Two independent sessions, each with its own sid=1, presenting
    /// interleaved with distinct cookies: neither session ever
    /// observes the other's reply or event.
    #[test]
    fn two_sessions_never_cross_observe_cookies() {
        let device = Device::new(DeviceConfig::default());
        let a = device.open();
        let b = device.open();
        negotiate_and_bind(&a);
        negotiate_and_bind(&b);
        create_surface(&a, 3, 4, 4);
        create_surface(&b, 3, 4, 4);

        handle_present(&a, 10, 1, 0x1111_1111_1111_1111);
        handle_present(&b, 10, 1, 0x2222_2222_2222_2222);

        assert_present_pair(&a, 1, 0x1111_1111_1111_1111);
        assert_present_pair(&b, 1, 0x2222_2222_2222_2222);
    }

    fn handle_present(handle: &Handle, msg_id: u32, sid: u32, cookie: u64) {
        handle
            .write(&client::surface_present(msg_id, sid, 0, cookie))
            .unwrap();
    }

    fn assert_present_pair(handle: &Handle, expect_sid: u32, expect_cookie: u64) {
        match client::decode_frame(&handle.read_blocking().unwrap()) {
            client::Reply::SurfacePresent {
                status: 0,
                sid,
                cookie,
            } => {
                assert_eq!(sid, expect_sid);
                assert_eq!(cookie, expect_cookie);
            }
            other => panic!("unexpected present reply: {other:?}"),
        }
        match client::decode_frame(&handle.read_blocking().unwrap()) {
            client::Reply::SurfacePresented { sid, cookie, .. } => {
                assert_eq!(sid, expect_sid);
                assert_eq!(cookie, expect_cookie);
            }
            other => panic!("unexpected present event: {other:?}"),
        }
    }

    #[test]
    fn write_fails_with_enospc_then_makes_progress_after_one_drain() {
        let (_device, handle) = opened();
        negotiate_and_bind(&handle);
        create_surface(&handle, 3, 4, 4);

        let mut msg_id = 4u32;
        let mut saw_enospc = false;
        for _ in 0..5000 {
            let result = handle.write(&client::surface_present(msg_id, 1, 0, msg_id as u64));
            msg_id += 1;
            if result == Err(Errno::ENOSPC) {
                saw_enospc = true;
                break;
            }
        }
        assert!(saw_enospc, "expected backpressure before 5000 writes");

        handle.read_nonblocking().unwrap();
        assert!(
            handle
                .write(&client::surface_present(msg_id, 1, 0, msg_id as u64))
                .is_ok()
        );
    }

    /// A reader blocked on an empty outqueue wakes as soon as a frame
    /// is enqueued by another thread's write.
    #[test]
    fn blocked_reader_wakes_on_enqueue() {
        let device = Device::new(DeviceConfig::default());
        let handle = Arc::new(device.open());
        let reader = Arc::clone(&handle);

        let join = thread::spawn(move || reader.read_blocking());

        thread::sleep(std::time::Duration::from_millis(20));
        handle.write(&client::hello(1, 1, 0, 0, 65536)).unwrap();

        let frame = join.join().unwrap();
        assert!(frame.is_some());
    }

    /// A reader blocked on an empty outqueue wakes with end-of-file
    /// when the session closes instead.
    #[test]
    fn blocked_reader_wakes_on_close() {
        let device = Device::new(DeviceConfig::default());
        let handle = device.open();

        let (tx, rx) = std::sync::mpsc::channel();
        let read_handle: Arc<Handle> = Arc::new(handle);
        let reader = Arc::clone(&read_handle);
        let join = thread::spawn(move || {
            let result = reader.read_blocking();
            tx.send(()).unwrap();
            result
        });

        thread::sleep(std::time::Duration::from_millis(20));
        read_handle.close();
        rx.recv_timeout(std::time::Duration::from_secs(1)).unwrap();
        assert_eq!(join.join().unwrap(), None);
    }

    /// Closing a session that still has a live client mapping does
    /// not invalidate that mapping: the region survives until the
    /// last `Arc` to it drops.
    #[test]
    fn closing_session_keeps_live_mapping_alive() {
        let (_device, handle) = opened();
        negotiate_and_bind(&handle);
        create_surface(&handle, 3, 4, 4);

        match handle.ioctl(ControlOp::MapSurface(1)).unwrap() {
            IoctlResult::MapSurface { total, .. } => {
                let mapping = handle.mmap(total as usize).unwrap();
                mapping.copy_from_slice(&vec![0xAAu8; total as usize]);
                handle.close();
                assert_eq!(mapping.to_vec(), vec![0xAAu8; total as usize]);
            }
            _ => panic!("expected MapSurface result"),
        }
    }
}
