use super::*;
use crate::assets::image::PreparedImage;
use crate::config::chapter::Shape;
use crate::session::observer::RecordingObserver;

const FRAME_MS: f64 = 1000.0 / 30.0;

fn cfg() -> EngineConfig {
    EngineConfig {
        canvas: Canvas::new(60, 120).unwrap(),
        output_scale: 0.25,
        batch_size: 50,
        ..EngineConfig::default()
    }
}

fn chapters(n: usize) -> Vec<(SourceImage, ChapterParams)> {
    (0..n)
        .map(|i| {
            let image = SourceImage::new(PreparedImage::from_fn(30, 60, move |x, y| {
                [(x * 8) as u8, (y * 4) as u8, (i * 25) as u8]
            }))
            .unwrap();
            let params = ChapterParams {
                piece_count: 6,
                shape: Shape::Square,
                duration_secs: 1.0,
                is_last: i + 1 == n,
                seed: i as u64,
                ..ChapterParams::default()
            };
            (image, params)
        })
        .collect()
}

#[test]
fn wrong_chapter_count_is_a_visible_state() {
    let mut grid = GridSession::new(cfg(), None).unwrap();
    assert_eq!(grid.status(), GridStatus::Empty);
    assert!(!grid.load(chapters(4)).unwrap());
    assert_eq!(grid.status(), GridStatus::WrongChapterCount { got: 4 });

    let mut obs = RecordingObserver::default();
    grid.tick(0.0, &mut obs).unwrap();
    grid.tick(50_000.0, &mut obs).unwrap();
    assert!(obs.chapters.is_empty());
    assert_eq!(obs.finished, 0);
    grid.render().unwrap();
    assert_eq!(grid.panel_draw_counts(), [0; PANELS]);
    assert!(grid.surface().to_frame().pixel(7, 15).is_some());
}

#[test]
fn nine_chapters_run_to_the_slideshow_finale() {
    let mut grid = GridSession::new(cfg(), None).unwrap();
    assert!(grid.load(chapters(PANELS)).unwrap());
    let mut obs = RecordingObserver::default();
    let mut now = 0.0;
    let mut frame = 0u64;
    let mut saw_slideshow = false;
    while !grid.is_finished() && now < 120_000.0 {
        grid.tick(now, &mut obs).unwrap();
        if let Some(k) = grid.active_panel() {
            assert!(k < PANELS);
        }
        saw_slideshow |= matches!(grid.finale_phase(), FinalePhase::Slideshow { .. });
        if frame % 15 == 0 {
            grid.render().unwrap();
        }
        now += FRAME_MS;
        frame += 1;
    }

    assert!(grid.is_finished());
    assert_eq!(obs.chapters, (1..=PANELS).collect::<Vec<_>>());
    assert_eq!(obs.finished, 1);
    assert_eq!(grid.snapshots().len(), PANELS);
    assert!(saw_slideshow);
    assert!(obs.progress.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(obs.last_progress(), Some(100.0));
    assert!(grid.panel_draw_counts().iter().all(|c| *c > 0));

    grid.tick(now + 10_000.0, &mut obs).unwrap();
    assert_eq!(obs.finished, 1);
    grid.render().unwrap();
}

#[test]
fn grid_finale_skips_wave_and_collapse() {
    let plan = grid_plan(&cfg(), PANELS);
    assert_eq!(plan.slides, PANELS);
    assert_eq!(plan.wave_ms, 0.0);
    assert_eq!(plan.pause_ms, cfg().grid.overview_hold_ms);
    assert_eq!(
        finale_phase(plan.pause_ms + 1.0, &plan),
        FinalePhase::Slideshow {
            index: 0,
            t: 1.0 / plan.slide_ms
        }
    );
}
