mod common;

use clustermap::{
    core::geo::Point,
    input::{InputEvent, MouseButton},
    ui::BOUNDS_HEADING,
    ClusterCapability, ControllerState, GeoPoint, GridClusterer, HeadlessSurface, MapConfig,
    MapError, MapSurface, MarkerHandle, OverlayId, RecordingNavigator, Result, ShellState,
    ViewShell,
};
use common::init_logging;

type HeadlessShell = ViewShell<HeadlessSurface, GridClusterer, RecordingNavigator>;

/// Grid clustering that refuses the install calls listed in `failing_calls` (1-based)
struct FlakyClusterer {
    inner: GridClusterer,
    calls: usize,
    failing_calls: Vec<usize>,
}

impl FlakyClusterer {
    fn failing_on(failing_calls: &[usize]) -> Self {
        Self {
            inner: GridClusterer::default(),
            calls: 0,
            failing_calls: failing_calls.to_vec(),
        }
    }
}

impl ClusterCapability for FlakyClusterer {
    fn install(&mut self, surface: &mut dyn MapSurface, markers: &[MarkerHandle]) -> Result<OverlayId> {
        self.calls += 1;
        if self.failing_calls.contains(&self.calls) {
            return Err(MapError::Cluster("refused".to_string()).into());
        }
        self.inner.install(surface, markers)
    }

    fn clear(&mut self, surface: &mut dyn MapSurface, overlay: OverlayId) {
        self.inner.clear(surface, overlay);
    }
}

fn flaky_shell(failing_calls: &[usize]) -> ViewShell<HeadlessSurface, FlakyClusterer, RecordingNavigator> {
    let mut shell = ViewShell::headless(
        config(),
        FlakyClusterer::failing_on(failing_calls),
        RecordingNavigator::new(),
        sparse_points(),
    );
    shell.pump();
    shell
}

fn config() -> MapConfig {
    MapConfig::default().with_api_key("test-key")
}

fn sparse_points() -> Vec<GeoPoint> {
    // Far enough apart at zoom 14 that icons never overlap
    vec![
        GeoPoint::new(35.681236, 139.767125, "Marker-1", "https://example.com/Marker-1"),
        GeoPoint::new(35.690000, 139.750000, "Marker-2", "https://example.com/Marker-2"),
        GeoPoint::new(35.670000, 139.785000, "Marker-3", "https://example.com/Marker-3"),
    ]
}

fn live_shell(points: Vec<GeoPoint>) -> HeadlessShell {
    let mut shell = ViewShell::headless(config(), GridClusterer::default(), RecordingNavigator::new(), points);
    shell.pump();
    assert_eq!(shell.state(), &ShellState::Live);
    shell
}

/// Container pixel inside the icon of the marker at `lat`/`lng`
fn icon_pixel(shell: &HeadlessShell, lat: f64, lng: f64) -> Point {
    let anchor = shell
        .surface()
        .expect("surface")
        .viewport()
        .lat_lng_to_pixel(&clustermap::LatLng::new(lat, lng));
    Point::new(anchor.x, anchor.y - 20.0)
}

#[test]
fn test_missing_key_degrades_visibly() {
    println!("🧪 [TEST] Testing degraded shell");
    init_logging();

    let mut shell: HeadlessShell = ViewShell::headless(
        MapConfig::default(),
        GridClusterer::default(),
        RecordingNavigator::new(),
        sparse_points(),
    );

    match shell.state() {
        ShellState::Degraded(message) => assert!(message.contains("CLUSTERMAP_API_KEY")),
        other => panic!("expected degraded shell, got {:?}", other),
    }
    assert_eq!(shell.pump(), 0);
    assert!(shell.surface().is_none());
    assert!(shell.bounds_readout().is_none());

    let text = shell.render_text();
    assert!(!text.is_empty());
    assert!(text.starts_with("Map failed to load"));
    println!("✅ [TEST] Degraded shell test passed");
}

#[test]
fn test_malformed_key_degrades_visibly() {
    let shell: HeadlessShell = ViewShell::headless(
        MapConfig::default().with_api_key("bad key"),
        GridClusterer::default(),
        RecordingNavigator::new(),
        Vec::new(),
    );
    assert!(matches!(shell.state(), ShellState::Degraded(_)));
}

#[test]
fn test_ready_installs_and_reads_bounds() {
    init_logging();

    let mut shell: HeadlessShell = ViewShell::headless(
        config(),
        GridClusterer::default(),
        RecordingNavigator::new(),
        sparse_points(),
    );
    assert_eq!(shell.state(), &ShellState::Loading);
    assert!(shell.render_text().starts_with("Loading map"));

    assert_eq!(shell.pump(), 1);
    assert_eq!(shell.state(), &ShellState::Live);
    assert_eq!(shell.controller_state(), ControllerState::Ready);

    let surface = shell.surface().expect("surface");
    assert_eq!(surface.marker_count(), 3);
    assert_eq!(surface.popup_count(), 3);
    assert_eq!(surface.listener_count(), 9);

    let bbox = shell.bounds().copied().expect("bounds after install");
    assert!(bbox.contains(&clustermap::LatLng::new(35.681236, 139.767125)));

    let text = shell.render_text();
    assert!(text.contains("[map 1200x600 px, 3 markers]"));
    assert!(text.contains(BOUNDS_HEADING));
    for label in ["minLat:", "maxLat:", "minLng:", "maxLng:"] {
        assert!(text.contains(label), "missing {} in {}", label, text);
    }
}

#[test]
fn test_viewport_changes_coalesce_into_one_read() {
    println!("🧪 [TEST] Testing viewport coalescing");
    init_logging();

    let mut shell = live_shell(sparse_points());
    let before = shell.bounds().copied().expect("bounds");
    let reads = shell.controller().tracker().update_count();

    {
        let surface = shell.surface_mut().expect("surface");
        for _ in 0..5 {
            surface.handle_input(&InputEvent::Drag {
                delta: Point::new(10.0, 0.0),
            });
        }
    }
    assert_eq!(shell.pump(), 1);
    assert_eq!(shell.controller().tracker().update_count(), reads + 1);

    // Dragging right moves the view west
    let after = shell.bounds().copied().expect("bounds");
    assert!(after.min_lng < before.min_lng);
    assert!(after.max_lng < before.max_lng);
    assert!((after.min_lat - before.min_lat).abs() < 1e-9);
    println!("✅ [TEST] Viewport coalescing test passed");
}

#[test]
fn test_zoom_in_shrinks_bounds() {
    let mut shell = live_shell(sparse_points());
    let before = shell.bounds().copied().expect("bounds");

    shell.handle_input(&InputEvent::Scroll {
        delta: 1.0,
        position: Point::new(600.0, 300.0),
    });

    let after = shell.bounds().copied().expect("bounds");
    let before_span = before.max_lng - before.min_lng;
    let after_span = after.max_lng - after.min_lng;
    assert!((after_span - before_span / 2.0).abs() < 1e-6);
}

#[test]
fn test_resize_updates_bounds() {
    let mut shell = live_shell(sparse_points());
    let before = shell.bounds().copied().expect("bounds");

    shell.handle_input(&InputEvent::Resize {
        size: Point::new(600.0, 600.0),
    });

    let after = shell.bounds().copied().expect("bounds");
    assert!(after.max_lng - after.min_lng < before.max_lng - before.min_lng);
}

#[test]
fn test_hover_and_click_through_surface() {
    println!("🧪 [TEST] Testing pointer interaction");
    init_logging();

    let mut shell = live_shell(sparse_points());
    let target = icon_pixel(&shell, 35.690000, 139.750000);

    shell.handle_input(&InputEvent::MouseMove { position: target });
    {
        let surface = shell.surface().expect("surface");
        let open = surface.open_popups();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].content.title, "Marker-2");
        assert!(!open[0].focused);
    }

    shell.handle_input(&InputEvent::Click {
        position: target,
        button: MouseButton::Left,
    });
    assert_eq!(shell.navigator().visited, vec!["https://example.com/Marker-2".to_string()]);

    shell.handle_input(&InputEvent::MouseLeave);
    assert!(shell.surface().expect("surface").open_popups().is_empty());
    println!("✅ [TEST] Pointer interaction test passed");
}

#[test]
fn test_right_click_does_not_navigate() {
    let mut shell = live_shell(sparse_points());
    let target = icon_pixel(&shell, 35.681236, 139.767125);

    shell.handle_input(&InputEvent::Click {
        position: target,
        button: MouseButton::Right,
    });
    assert!(shell.navigator().visited.is_empty());
}

#[test]
fn test_replace_points_keeps_counts_exact() {
    let mut shell = live_shell(sparse_points());

    let report = shell
        .replace_points(sparse_points()[..2].to_vec())
        .expect("reinstall succeeds")
        .expect("surface is live");
    assert_eq!(report.installed, 2);
    assert_eq!(report.generation, 2);

    let surface = shell.surface().expect("surface");
    assert_eq!(surface.marker_count(), 2);
    assert_eq!(surface.popup_count(), 2);
    assert_eq!(surface.listener_count(), 6);
    assert_eq!(shell.controller_state(), ControllerState::Ready);
}

#[test]
fn test_dense_points_fold_into_clusters() {
    let points: Vec<GeoPoint> = (0..20)
        .map(|i| {
            let title = format!("Marker-{}", i + 1);
            let url = format!("https://example.com/{}", title);
            GeoPoint::new(35.6812 + i as f64 * 1e-5, 139.7671, title, url)
        })
        .collect();
    let mut shell = live_shell(points);

    let clusters = shell.sync_cluster_visibility();
    assert_eq!(clusters.iter().map(|c| c.count()).sum::<usize>(), 20);
    assert!(clusters.iter().any(|c| !c.is_single()));

    // Folded markers no longer react to the pointer
    let target = icon_pixel(&shell, 35.6812, 139.7671);
    shell.handle_input(&InputEvent::MouseMove { position: target });
    assert!(shell.surface().expect("surface").open_popups().is_empty());
}

#[test]
fn test_teardown_clears_surface() {
    let mut shell = live_shell(sparse_points());
    shell.teardown();

    let surface = shell.surface().expect("surface");
    assert_eq!(surface.marker_count(), 0);
    assert_eq!(surface.popup_count(), 0);
    assert_eq!(surface.listener_count(), 0);
    assert_eq!(shell.controller_state(), ControllerState::Uninitialized);
}

#[test]
fn test_successful_reinstall_recovers_degraded_shell() {
    println!("🧪 [TEST] Testing recovery after a failed install");
    init_logging();

    let mut shell = flaky_shell(&[1]);
    match shell.state() {
        ShellState::Degraded(message) => assert!(message.starts_with("Map failed to load markers")),
        other => panic!("expected degraded shell, got {:?}", other),
    }
    assert_eq!(shell.controller_state(), ControllerState::Uninitialized);

    let report = shell
        .replace_points(sparse_points())
        .expect("second install succeeds")
        .expect("surface is ready");
    assert_eq!(report.installed, 3);

    assert_eq!(shell.state(), &ShellState::Live);
    assert_eq!(shell.controller_state(), ControllerState::Ready);
    assert!(shell.render_text().starts_with("[map 1200x600 px, 3 markers]"));
    println!("✅ [TEST] Recovery after a failed install test passed");
}

#[test]
fn test_failed_reinstall_degrades_live_shell() {
    let mut shell = flaky_shell(&[2]);
    assert_eq!(shell.state(), &ShellState::Live);

    assert!(shell.replace_points(sparse_points()).is_err());

    match shell.state() {
        ShellState::Degraded(message) => assert!(message.contains("refused")),
        other => panic!("expected degraded shell, got {:?}", other),
    }
    assert_eq!(shell.controller_state(), ControllerState::Uninitialized);
    assert_eq!(shell.surface().expect("surface").marker_count(), 0);
}

#[test]
fn test_replacing_points_without_surface_keeps_state() {
    let mut shell: HeadlessShell = ViewShell::headless(
        MapConfig::default(),
        GridClusterer::default(),
        RecordingNavigator::new(),
        Vec::new(),
    );
    let degraded = shell.state().clone();

    let report = shell.replace_points(sparse_points()).expect("nothing to install");
    assert!(report.is_none());
    assert_eq!(shell.state(), &degraded);
    assert_eq!(shell.controller().points().len(), 3);
}

#[test]
fn test_clicking_cluster_zooms_into_its_markers() {
    println!("🧪 [TEST] Testing cluster click zoom");
    init_logging();

    let points: Vec<GeoPoint> = (0..20)
        .map(|i| {
            let title = format!("Marker-{}", i + 1);
            let url = format!("https://example.com/{}", title);
            GeoPoint::new(35.6812 + i as f64 * 1e-5, 139.7671, title, url)
        })
        .collect();
    let mut shell = live_shell(points);
    let reads = shell.controller().tracker().update_count();

    let cluster = shell
        .sync_cluster_visibility()
        .into_iter()
        .find(|c| !c.is_single())
        .expect("dense points cluster");
    let icon = shell
        .surface()
        .expect("surface")
        .viewport()
        .lat_lng_to_pixel(&cluster.center);

    shell.click(icon);

    let viewport = shell.surface().expect("surface").viewport().clone();
    assert!(viewport.zoom > 14.0);
    assert!(shell.controller().tracker().update_count() > reads);
    assert!(shell.clusters().iter().all(|c| c.is_single()));
    assert!(shell.navigator().visited.is_empty());

    let bounds = shell.bounds().copied().expect("bounds");
    assert!(bounds.contains(&clustermap::LatLng::new(35.6812, 139.7671)));
    assert!(bounds.contains(&clustermap::LatLng::new(35.6812 + 19.0 * 1e-5, 139.7671)));
    println!("✅ [TEST] Cluster click zoom test passed");
}

#[test]
fn test_click_outside_clusters_hits_marker() {
    let mut shell = live_shell(sparse_points());
    shell.sync_cluster_visibility();
    let target = icon_pixel(&shell, 35.670000, 139.785000);

    shell.click(target);

    assert_eq!(shell.navigator().visited, vec!["https://example.com/Marker-3".to_string()]);
    assert_eq!(shell.surface().expect("surface").viewport().zoom, 14.0);
}
