//! End-to-end pipeline tests against the scripted page driver

use image::RgbaImage;
use scrollshot::rendering::raster::WHITE;
use scrollshot::scripted::{DriverCall, ScriptedDriver};
use scrollshot::{capture_full_page, CaptureConfig, Error, Viewport};

fn instant(width: u32, height: u32) -> CaptureConfig {
    CaptureConfig {
        viewport: Viewport { width, height },
        scroll_settle_ms: 0,
        load_settle_ms: 0,
        suppress_settle_ms: 0,
        ..Default::default()
    }
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory(png).expect("decode").to_rgba8()
}

#[test]
fn stitches_three_tiles_for_a_2000px_page() {
    let driver = ScriptedDriver::new(2000).with_fixed_elements(2);
    let journal = driver.journal();
    let config = instant(64, 800);

    let shot = capture_full_page(driver, "https://example.com/blog/post.html", &config).unwrap();
    assert_eq!((shot.width, shot.height), (64, 2000));
    assert_eq!(journal.scrolls(), vec![0, 800, 1600]);
    assert!(journal.closed());

    let img = decode(&shot.png_data);
    assert_eq!(img.dimensions(), (64, 2000));
    // Every row shows the page row at the same height, including the
    // clipped top 400 rows of the last tile.
    for y in (0..2000).step_by(50).chain([799, 800, 1599, 1600, 1999]) {
        assert_eq!(img.get_pixel(0, y), &ScriptedDriver::shade_at(y), "row {}", y);
        assert_eq!(img.get_pixel(63, y), &ScriptedDriver::shade_at(y), "row {}", y);
    }
}

#[test]
fn exact_fit_page_takes_one_tile() {
    let driver = ScriptedDriver::new(800);
    let journal = driver.journal();

    let shot = capture_full_page(driver, "https://example.com/", &instant(32, 800)).unwrap();
    assert_eq!(shot.height, 800);
    assert_eq!(journal.scrolls(), vec![0]);

    let img = decode(&shot.png_data);
    assert_eq!(img.get_pixel(31, 799), &ScriptedDriver::shade_at(799));
}

#[test]
fn short_page_is_not_padded_to_a_full_tile() {
    let shot = capture_full_page(ScriptedDriver::new(130), "https://example.com/", &instant(16, 800)).unwrap();
    assert_eq!(shot.height, 130);
    assert_eq!(decode(&shot.png_data).dimensions(), (16, 130));
}

#[test]
fn full_call_sequence() {
    let driver = ScriptedDriver::new(1000);
    let journal = driver.journal();
    let config = instant(8, 800);

    capture_full_page(driver, "https://example.com/a", &config).unwrap();
    assert_eq!(
        journal.calls(),
        vec![
            DriverCall::SetViewport(Viewport { width: 8, height: 800 }),
            DriverCall::Navigate("https://example.com/a".into()),
            DriverCall::SuppressFixed,
            DriverCall::MeasureHeight,
            DriverCall::ScrollTo(0),
            DriverCall::Capture,
            DriverCall::ScrollTo(800),
            DriverCall::Capture,
            DriverCall::Close,
        ]
    );
}

#[test]
fn zero_height_page_is_rejected_and_driver_closed() {
    let driver = ScriptedDriver::new(0);
    let journal = driver.journal();

    let err = capture_full_page(driver, "https://example.com/", &instant(8, 800)).unwrap_err();
    assert!(matches!(err, Error::EmptyPage(0)));
    assert!(!journal.calls().contains(&DriverCall::Capture));
    assert!(journal.closed());
}

#[test]
fn navigation_timeout_still_closes_the_browser() {
    let driver = ScriptedDriver::new(2000).fail_navigation_with_timeout();
    let journal = driver.journal();
    let config = CaptureConfig {
        timeout_ms: 60000,
        ..instant(8, 800)
    };

    let err = capture_full_page(driver, "https://slow.example.com/", &config).unwrap_err();
    assert!(matches!(err, Error::Timeout(60000)));
    assert_eq!(err.to_string(), "Operation timed out after 60000ms");
    assert!(journal.closed());
    assert!(journal.scrolls().is_empty());
}

#[test]
fn unreachable_page_reports_the_cause() {
    let driver = ScriptedDriver::new(2000).fail_navigation("net::ERR_CONNECTION_REFUSED");
    let err = capture_full_page(driver, "http://127.0.0.1:9/", &instant(8, 800)).unwrap_err();
    assert!(matches!(err, Error::LoadError(_)));
    assert!(err.to_string().contains("ERR_CONNECTION_REFUSED"));
}

#[test]
fn capture_failure_aborts_and_closes() {
    let driver = ScriptedDriver::new(4000).fail_capture_at(2);
    let journal = driver.journal();

    let err = capture_full_page(driver, "https://example.com/", &instant(8, 800)).unwrap_err();
    assert!(matches!(err, Error::CaptureError(_)));
    assert_eq!(journal.scrolls(), vec![0, 800, 1600]);
    assert!(journal.closed());
}

#[test]
fn close_failure_after_success_keeps_the_image() {
    let driver = ScriptedDriver::new(300).fail_close();
    let shot = capture_full_page(driver, "https://example.com/", &instant(8, 800)).unwrap();
    assert_eq!(shot.height, 300);
}

#[test]
fn invalid_config_is_rejected_before_navigation() {
    let driver = ScriptedDriver::new(2000);
    let journal = driver.journal();

    let err = capture_full_page(driver, "https://example.com/", &instant(0, 800)).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
    assert_eq!(journal.calls(), vec![DriverCall::Close]);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let config = instant(40, 300);
    let a = capture_full_page(ScriptedDriver::new(1234), "https://example.com/", &config).unwrap();
    let b = capture_full_page(ScriptedDriver::new(1234), "https://example.com/", &config).unwrap();
    assert_eq!(a.png_data, b.png_data);
    assert_eq!(a.digest(), b.digest());
}

#[test]
fn output_is_fully_opaque() {
    let shot = capture_full_page(ScriptedDriver::new(900), "https://example.com/", &instant(8, 800)).unwrap();
    let img = decode(&shot.png_data);
    assert!(img.pixels().all(|p| p[3] == WHITE[3]));
}

#[test]
fn short_captures_are_rejected_instead_of_leaving_gaps() {
    // A window resize without viewport emulation yields frames shorter than
    // the scroll stride.
    let driver = ScriptedDriver::new(2000).with_frame_height(713);
    let journal = driver.journal();

    let err = capture_full_page(driver, "https://example.com/", &instant(8, 800)).unwrap_err();
    match err {
        Error::CompositeError(msg) => assert!(msg.contains("8x713") && msg.contains("expected 8x800"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(journal.closed());
}

#[test]
fn oversized_page_fails_before_any_capture() {
    let driver = ScriptedDriver::new(2_000_000);
    let journal = driver.journal();

    let err = capture_full_page(driver, "https://example.com/", &instant(1280, 800)).unwrap_err();
    assert!(matches!(err, Error::CompositeError(_)));
    assert!(!journal.calls().contains(&DriverCall::Capture));
    assert!(journal.scrolls().is_empty());
    assert!(journal.closed());
}
