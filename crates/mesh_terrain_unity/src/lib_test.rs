use super::*;

/// Box spanning [0, 10] × [0, 5] × [0, 10] as flat positions and indices.
///
/// Corner bits: x = 1, y = 2, z = 4.
fn slab_mesh() -> (Vec<f32>, Vec<u32>) {
    let mut positions = Vec::with_capacity(24);
    for corner in 0..8u32 {
        positions.push(if corner & 1 != 0 { 10.0 } else { 0.0 });
        positions.push(if corner & 2 != 0 { 5.0 } else { 0.0 });
        positions.push(if corner & 4 != 0 { 10.0 } else { 0.0 });
    }
    let indices = vec![
        0, 1, 5, 0, 5, 4, // y-
        2, 6, 7, 2, 7, 3, // y+
        0, 4, 6, 0, 6, 2, // x-
        1, 3, 7, 1, 7, 5, // x+
        0, 2, 3, 0, 3, 1, // z-
        4, 5, 7, 4, 7, 6, // z+
    ];
    (positions, indices)
}

fn params(resolution: u32) -> FfiGenerationParams {
    FfiGenerationParams {
        resolution,
        orientation: 0,
        padding_x: 0.0,
        padding_y: 0.0,
        padding_z: 0.0,
        vertical_shift: 0.0,
    }
}

fn create_slab() -> i32 {
    let (positions, indices) = slab_mesh();
    let mesh_id = unsafe {
        terrain_mesh_create(
            positions.as_ptr(),
            8,
            indices.as_ptr(),
            indices.len() as u32,
        )
    };
    assert!(mesh_id > 0, "Expected positive mesh_id, got {}", mesh_id);
    mesh_id
}

fn wait_for_job(job_id: i32, out: &mut FfiHeightmap) -> i32 {
    for _ in 0..5000 {
        let status = unsafe { terrain_job_poll(job_id, out) };
        if status != 0 {
            return status;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    panic!("job {} did not finish", job_id);
}

#[test]
fn test_version() {
    assert_eq!(terrain_version(), 0x000100);
}

#[test]
fn test_mesh_lifecycle() {
    let mesh_id = create_slab();

    assert_eq!(terrain_mesh_destroy(mesh_id), 0, "Destroy should succeed");
    assert_eq!(
        terrain_mesh_destroy(mesh_id),
        -3,
        "Double destroy should return -3"
    );
}

#[test]
fn test_mesh_create_rejects_bad_input() {
    let (positions, indices) = slab_mesh();

    unsafe {
        assert_eq!(terrain_mesh_create(std::ptr::null(), 8, indices.as_ptr(), 36), -1);
        assert_eq!(terrain_mesh_create(positions.as_ptr(), 8, std::ptr::null(), 36), -1);
        // Not a multiple of three
        assert_eq!(terrain_mesh_create(positions.as_ptr(), 8, indices.as_ptr(), 35), -4);

        let out_of_range = [0u32, 1, 99];
        assert_eq!(terrain_mesh_create(positions.as_ptr(), 8, out_of_range.as_ptr(), 3), -4);
    }
}

#[test]
fn test_generate_full_coverage() {
    let mesh_id = create_slab();
    let mut out = FfiHeightmap::EMPTY;

    let status = unsafe { terrain_generate(mesh_id, &params(16), &mut out) };
    assert_eq!(status, 0);
    assert_eq!(out.resolution, 16);
    assert!(!out.heights.is_null());
    assert_eq!((out.size_x, out.size_y, out.size_z), (10.0, 5.0, 10.0));

    let heights = unsafe { std::slice::from_raw_parts(out.heights, 256) };
    assert!(heights.iter().all(|&h| (h - 1.0).abs() < 1e-6));

    terrain_mesh_destroy(mesh_id);
}

#[test]
fn test_generate_padding_halves_height() {
    let mesh_id = create_slab();
    let mut request = params(8);
    request.padding_y = 5.0;
    let mut out = FfiHeightmap::EMPTY;

    let status = unsafe { terrain_generate(mesh_id, &request, &mut out) };
    assert_eq!(status, 0);
    assert_eq!(out.size_y, 10.0);

    let heights = unsafe { std::slice::from_raw_parts(out.heights, 64) };
    assert!(heights.iter().all(|&h| (h - 0.5).abs() < 1e-6));

    terrain_mesh_destroy(mesh_id);
}

#[test]
fn test_generate_errors() {
    let mesh_id = create_slab();
    let mut out = FfiHeightmap::EMPTY;

    unsafe {
        assert_eq!(terrain_generate(mesh_id, std::ptr::null(), &mut out), -1);
        assert_eq!(terrain_generate(mesh_id, &params(4), std::ptr::null_mut()), -1);
        assert_eq!(terrain_generate(mesh_id, &params(0), &mut out), -4);

        let mut bad_orientation = params(4);
        bad_orientation.orientation = 7;
        assert_eq!(terrain_generate(mesh_id, &bad_orientation, &mut out), -4);
        assert!(out.heights.is_null());
    }

    terrain_mesh_destroy(mesh_id);
    assert_eq!(unsafe { terrain_generate(mesh_id, &params(4), &mut out) }, -3);
}

#[test]
fn test_job_lifecycle() {
    let mesh_id = create_slab();

    let job_id = unsafe { terrain_job_start(mesh_id, &params(32)) };
    assert!(job_id > 0, "Expected positive job_id, got {}", job_id);

    let progress = terrain_job_progress(job_id);
    assert!((0.0..=1.0).contains(&progress));

    let mut out = FfiHeightmap::EMPTY;
    assert_eq!(wait_for_job(job_id, &mut out), 1);
    assert_eq!(out.resolution, 32);
    assert_eq!(out.hit_count, 32 * 32);
    assert_eq!(terrain_job_progress(job_id), 1.0);

    // Finished jobs keep answering until released
    let mut again = FfiHeightmap::EMPTY;
    assert_eq!(unsafe { terrain_job_poll(job_id, &mut again) }, 1);
    assert_eq!(again.heights, out.heights);

    assert_eq!(terrain_job_release(job_id), 0);
    assert_eq!(terrain_job_release(job_id), -3);
    assert_eq!(terrain_job_progress(job_id), -3.0);

    terrain_mesh_destroy(mesh_id);
}

#[test]
fn test_job_reports_invalid_parameters() {
    let mesh_id = create_slab();

    let job_id = unsafe { terrain_job_start(mesh_id, &params(0)) };
    assert!(job_id > 0);

    let mut out = FfiHeightmap::EMPTY;
    assert_eq!(wait_for_job(job_id, &mut out), -4);
    assert!(out.heights.is_null());
    // Finished jobs cannot be cancelled
    assert_eq!(terrain_job_cancel(job_id), -3);

    terrain_job_release(job_id);
    terrain_mesh_destroy(mesh_id);
}

#[test]
fn test_job_unknown_ids() {
    let mut out = FfiHeightmap::EMPTY;
    unsafe {
        assert_eq!(terrain_job_start(-42, &params(4)), -3);
        assert_eq!(terrain_job_poll(-42, &mut out), -3);
        assert_eq!(terrain_job_poll(-42, std::ptr::null_mut()), -1);
    }
    assert_eq!(terrain_job_cancel(-42), -3);
}

#[test]
fn test_needs_generation() {
    assert_eq!(terrain_needs_generation(0), 1);
    assert_eq!(terrain_needs_generation(1), 0);
}

#[cfg(feature = "metrics")]
#[test]
fn test_metrics_snapshot() {
    let mesh_id = create_slab();
    let mut out = FfiHeightmap::EMPTY;
    unsafe {
        terrain_generate(mesh_id, &params(4), &mut out);
        terrain_generate(mesh_id, &params(0), &mut out);
    }
    terrain_mesh_destroy(mesh_id);

    let mut snapshot = FfiMetricsSnapshot::default();
    assert_eq!(unsafe { terrain_get_metrics(&mut snapshot) }, 0);

    // Other tests share the global counters
    assert!(snapshot.total_generations >= 1);
    assert!(snapshot.total_rays >= 16);
    assert!(snapshot.total_failed >= 1);
    assert!(snapshot.generation.sample_count >= 1);

    assert_eq!(unsafe { terrain_get_metrics(std::ptr::null_mut()) }, -1);
}
