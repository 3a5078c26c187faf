mod support;

use support::audio::{progressive_tone, silence, tone};
use support::surface::RecordingSurface;
use wavestrip::audio::SharedAudioProvider;
use wavestrip::render::{
    AudioRenderer, AudioRenderingStyle, BitmapProvider, CACHE_BITMAP_WIDTH, PixelPos,
};
use wavestrip::settings::{ColorSchemeSettings, SpectrumSettings};
use wavestrip::spectrum::SpectrumRenderer;
use wavestrip::waveform::WaveformRenderer;

const HEIGHT: usize = 10;

fn waveform_renderer(provider: SharedAudioProvider) -> AudioRenderer {
    let mut renderer = AudioRenderer::new();
    renderer.set_height(HEIGHT);
    renderer.set_renderer(Some(Box::new(WaveformRenderer::new(
        &ColorSchemeSettings::waveform_default(),
    ))));
    renderer.set_audio_provider(Some(provider));
    renderer
}

#[test]
fn block_count_follows_audio_and_zoom() {
    // 2000 samples at 1 kHz, 1 ms per pixel: 2000 columns.
    let mut renderer = waveform_renderer(silence(2_000, 1_000));
    assert_eq!(renderer.block_count(), 63);

    renderer.set_milliseconds_per_pixel(2.0);
    assert_eq!(renderer.block_count(), 32);

    renderer.set_audio_provider(Some(silence(64, 1_000)));
    assert_eq!(renderer.block_count(), 1);
}

#[test]
fn render_blits_consecutive_strips() {
    let mut renderer = waveform_renderer(tone(50.0, 1_000, 2_000));
    let mut surface = RecordingSurface::new(200, HEIGHT);
    renderer.render(
        &mut surface,
        PixelPos::new(0, 0),
        0,
        100,
        AudioRenderingStyle::Normal,
    );
    assert_eq!(surface.bitmap_xs(), vec![0, 32, 64, 96]);
    assert!(surface.fills().is_empty());
    assert_eq!(
        renderer.bitmap_cache_size(AudioRenderingStyle::Normal),
        4 * CACHE_BITMAP_WIDTH * HEIGHT * 4
    );
}

#[test]
fn render_offsets_first_strip_by_start_column() {
    let mut renderer = waveform_renderer(tone(50.0, 1_000, 2_000));
    let mut surface = RecordingSurface::new(200, HEIGHT);
    renderer.render(
        &mut surface,
        PixelPos::new(10, 0),
        40,
        50,
        AudioRenderingStyle::Normal,
    );
    assert_eq!(surface.bitmap_xs(), vec![2, 34]);
    // Nothing is drawn left of the origin even though the first strip starts there.
    assert_eq!(surface.pixel(5, 0), Some(egui::Color32::TRANSPARENT));
    assert_eq!(surface.pixel(60, 0), Some(egui::Color32::TRANSPARENT));
}

#[test]
fn undecoded_tail_is_filled_blank() {
    let provider = progressive_tone(50.0, 1_000, 2_000, 320);
    let mut renderer = waveform_renderer(provider.clone());
    let mut surface = RecordingSurface::new(700, HEIGHT);
    renderer.render(
        &mut surface,
        PixelPos::new(0, 0),
        0,
        640,
        AudioRenderingStyle::Active,
    );
    let xs = surface.bitmap_xs();
    assert_eq!(xs.len(), 10);
    assert_eq!(xs.last(), Some(&288));
    let fills = surface.fills();
    assert!(!fills.is_empty());
    assert!(fills.iter().all(|rect| rect.x == 319));
    assert_eq!(fills.iter().map(|rect| rect.height).sum::<i32>(), HEIGHT as i32);

    // More audio decoded: the same range now needs more strips.
    provider.set_decoded_samples(2_000);
    let mut surface = RecordingSurface::new(700, HEIGHT);
    renderer.render(
        &mut surface,
        PixelPos::new(0, 0),
        0,
        640,
        AudioRenderingStyle::Active,
    );
    assert_eq!(surface.bitmap_xs().len(), 21);
}

#[test]
fn partially_decoded_strip_is_redrawn_once_decoded() {
    let strip_bytes = CACHE_BITMAP_WIDTH * HEIGHT * 4;
    // 300 decoded columns: nine full strips and part of a tenth.
    let provider = progressive_tone(50.0, 1_000, 2_000, 300);
    let mut renderer = waveform_renderer(provider.clone());
    let origin = PixelPos::new(0, 0);
    let mut surface = RecordingSurface::new(400, HEIGHT);
    renderer.render(&mut surface, origin, 0, 320, AudioRenderingStyle::Normal);
    assert_eq!(surface.bitmap_xs().len(), 10);
    assert_eq!(
        renderer.bitmap_cache_size(AudioRenderingStyle::Normal),
        9 * strip_bytes
    );

    provider.set_decoded_samples(2_000);
    let mut surface = RecordingSurface::new(400, HEIGHT);
    renderer.render(&mut surface, origin, 0, 320, AudioRenderingStyle::Normal);
    assert_eq!(
        renderer.bitmap_cache_size(AudioRenderingStyle::Normal),
        11 * strip_bytes
    );

    let mut decoded = waveform_renderer(tone(50.0, 1_000, 2_000));
    let mut expected = RecordingSurface::new(400, HEIGHT);
    decoded.render(&mut expected, origin, 0, 320, AudioRenderingStyle::Normal);
    for x in 288..320 {
        for y in 0..HEIGHT {
            assert_eq!(surface.pixel(x, y), expected.pixel(x, y), "column {x} row {y}");
        }
    }
}

#[test]
fn setters_flush_strips_and_reach_the_strategy() {
    let mut renderer = waveform_renderer(tone(50.0, 1_000, 2_000));
    let origin = PixelPos::new(0, 0);
    let mut surface = RecordingSurface::new(200, HEIGHT);
    let render_all = |renderer: &mut AudioRenderer, surface: &mut RecordingSurface| {
        for style in AudioRenderingStyle::ALL {
            renderer.render(&mut *surface, origin, 0, 64, style);
            assert!(renderer.bitmap_cache_size(style) > 0);
        }
    };
    let assert_flushed = |renderer: &AudioRenderer| {
        for style in AudioRenderingStyle::ALL {
            assert_eq!(renderer.bitmap_cache_size(style), 0, "{style:?}");
        }
    };

    render_all(&mut renderer, &mut surface);
    renderer.set_amplitude_scale(2.0);
    assert_flushed(&renderer);
    let amplitude =
        renderer.with_bitmap_provider(|w: &mut WaveformRenderer| w.state().amplitude_scale());
    assert_eq!(amplitude, Some(2.0));

    render_all(&mut renderer, &mut surface);
    renderer.set_height(HEIGHT * 2);
    assert_flushed(&renderer);

    render_all(&mut renderer, &mut surface);
    renderer.set_milliseconds_per_pixel(3.0);
    assert_flushed(&renderer);
    // 2000 columns at 1 ms per pixel become 667 at 3 ms.
    assert_eq!(renderer.block_count(), 21);
    let pixel_ms = renderer
        .with_bitmap_provider(|w: &mut WaveformRenderer| w.state().milliseconds_per_pixel());
    assert_eq!(pixel_ms, Some(3.0));
}

#[test]
fn cache_hits_do_not_grow_cache_and_styles_are_separate() {
    let mut renderer = waveform_renderer(tone(50.0, 1_000, 2_000));
    let mut surface = RecordingSurface::new(200, HEIGHT);
    let origin = PixelPos::new(0, 0);
    renderer.render(&mut surface, origin, 0, 64, AudioRenderingStyle::Normal);
    let size = renderer.bitmap_cache_size(AudioRenderingStyle::Normal);
    renderer.render(&mut surface, origin, 0, 64, AudioRenderingStyle::Normal);
    assert_eq!(renderer.bitmap_cache_size(AudioRenderingStyle::Normal), size);
    assert_eq!(renderer.bitmap_cache_size(AudioRenderingStyle::Selected), 0);

    renderer.render(&mut surface, origin, 0, 64, AudioRenderingStyle::Selected);
    assert_eq!(renderer.bitmap_cache_size(AudioRenderingStyle::Selected), size);

    renderer.invalidate();
    for style in AudioRenderingStyle::ALL {
        assert_eq!(renderer.bitmap_cache_size(style), 0);
    }
}

#[test]
fn strip_cache_is_aged_to_budget() {
    let mut renderer = waveform_renderer(tone(50.0, 1_000, 20_000));
    let strip_bytes = CACHE_BITMAP_WIDTH * HEIGHT * 4;
    renderer.set_cache_max_size(8 * strip_bytes * 300);
    assert_eq!(renderer.bitmap_cache_budget(), strip_bytes * 300);

    let mut surface = RecordingSurface::new(64, HEIGHT);
    // Touch strips in three different macroblocks of 256 strips.
    for start in [0, 256 * 32, 512 * 32] {
        renderer.render(
            &mut surface,
            PixelPos::new(0, 0),
            start,
            32 * 200,
            AudioRenderingStyle::Normal,
        );
    }
    assert!(renderer.bitmap_cache_size(AudioRenderingStyle::Normal) <= strip_bytes * 300);
    assert!(renderer.bitmap_cache_size(AudioRenderingStyle::Normal) > 0);
}

#[test]
fn render_without_audio_or_strategy_draws_nothing() {
    let mut renderer = AudioRenderer::new();
    let mut surface = RecordingSurface::new(64, 4);
    renderer.render(
        &mut surface,
        PixelPos::new(0, 0),
        0,
        64,
        AudioRenderingStyle::Normal,
    );
    assert!(surface.calls.is_empty());

    renderer.set_audio_provider(Some(silence(1_000, 1_000)));
    renderer.render(
        &mut surface,
        PixelPos::new(0, 0),
        0,
        64,
        AudioRenderingStyle::Normal,
    );
    assert!(surface.calls.is_empty());
}

#[test]
fn strategy_swap_returns_previous_and_reaches_typed_setters() {
    let mut renderer = waveform_renderer(silence(8_000, 8_000));
    let previous = renderer.set_renderer(Some(Box::new(SpectrumRenderer::new(
        &SpectrumSettings::default(),
        &ColorSchemeSettings::spectrum_default(),
    ))));
    assert!(previous.is_some());

    let moved = renderer.with_bitmap_provider(|spectrum: &mut SpectrumRenderer| {
        spectrum.set_reference_frequency_position(0.5);
        spectrum.reference_frequency_position()
    });
    assert_eq!(moved, Some(0.5));
    assert!(
        renderer
            .with_bitmap_provider(|_: &mut WaveformRenderer| ())
            .is_none()
    );
}
