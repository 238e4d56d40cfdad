use super::*;
use crate::assets::image::PreparedImage;
use crate::config::chapter::Shape;
use crate::foundation::core::Canvas;
use crate::session::observer::RecordingObserver;
use crate::tessellation::generator::generate;

const FRAME_MS: f64 = 1000.0 / 30.0;

fn cfg() -> EngineConfig {
    EngineConfig {
        canvas: Canvas::new(120, 240).unwrap(),
        output_scale: 0.25,
        batch_size: 100,
        ..EngineConfig::default()
    }
}

fn image() -> SourceImage {
    SourceImage::new(PreparedImage::from_fn(40, 80, |x, y| [(x * 6) as u8, (y * 3) as u8, 40]))
        .unwrap()
}

fn params(is_last: bool, transition: TransitionMode) -> ChapterParams {
    ChapterParams {
        piece_count: 12,
        shape: Shape::Square,
        duration_secs: 2.0,
        is_last,
        transition,
        ..ChapterParams::default()
    }
}

/// Tick at 30 fps from `start` until the chapter finishes or `limit_ms` passes.
fn run(
    session: &mut ChapterSession,
    obs: &mut RecordingObserver,
    start: f64,
    limit_ms: f64,
) -> f64 {
    let mut now = start;
    while now < start + limit_ms && !session.is_finished() {
        session.tick(now, obs).unwrap();
        now += FRAME_MS;
    }
    now
}

#[test]
fn idle_session_ticks_and_renders() {
    let mut session = ChapterSession::new(cfg(), None).unwrap();
    let mut obs = RecordingObserver::default();
    session.tick(0.0, &mut obs).unwrap();
    assert!(!session.is_ready());
    assert!(obs.progress.is_empty());
    session.render().unwrap();
}

#[test]
fn generation_runs_inside_tick() {
    let mut session = ChapterSession::new(cfg(), None).unwrap();
    let mut obs = RecordingObserver::default();
    session.begin_chapter(image(), params(true, TransitionMode::Off)).unwrap();
    assert!(!session.is_ready());
    session.render().unwrap();
    session.tick(0.0, &mut obs).unwrap();
    assert!(session.is_ready());
    assert!(obs.cues.is_empty());

    session.tick(FRAME_MS, &mut obs).unwrap();
    assert_eq!(obs.cues, vec![AudioCue::Move]);
    assert_eq!(session.elapsed_ms(), 0.0);
}

#[test]
fn last_chapter_runs_the_whole_finale() {
    let mut session = ChapterSession::new(cfg(), None).unwrap();
    let mut obs = RecordingObserver::default();
    session.begin_chapter(image(), params(true, TransitionMode::Random)).unwrap();
    run(&mut session, &mut obs, 0.0, 30_000.0);

    assert!(session.is_finished());
    assert_eq!(obs.finished, 1);
    assert_eq!(obs.cue_count(AudioCue::Move), 1);
    assert_eq!(obs.cue_count(AudioCue::Wave), 1);
    assert_eq!(obs.cue_count(AudioCue::Destruct), 1);
    assert!(obs.cue_count(AudioCue::Snap) >= 1);
    assert!(obs.progress.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(obs.last_progress(), Some(100.0));
    assert_eq!(session.snapshots().len(), 1);
    assert!(session.transition_effect().is_none());

    // Nothing fires after the chapter is done.
    session.tick(1e9, &mut obs).unwrap();
    assert_eq!(obs.finished, 1);
    assert!(matches!(session.finale_phase(), FinalePhase::Outro { .. }));
    session.render().unwrap();
}

#[test]
fn pinned_transition_finishes_on_its_deadline() {
    let config = cfg();
    let mut session = ChapterSession::new(config.clone(), None).unwrap();
    let mut obs = RecordingObserver::default();
    let effect = TransitionEffect::Wind;
    session
        .begin_chapter(image(), params(false, TransitionMode::Pinned(effect)))
        .unwrap();
    let end = run(&mut session, &mut obs, 0.0, 30_000.0);

    assert_eq!(obs.finished, 1);
    assert_eq!(session.transition_effect(), Some(effect));
    // One generation tick plus assembly, wait and effect, give or take a frame.
    let budget = FRAME_MS * 6.0 + 2000.0 + config.transition_wait_ms + effect.duration_ms();
    assert!(end <= budget, "{end} > {budget}");
    assert_eq!(obs.cue_count(AudioCue::Wave), 0);
    assert_eq!(session.world().body_count(), 0);
    session.render().unwrap();
}

#[test]
fn stale_tickets_are_rejected() {
    let config = cfg();
    let mut session = ChapterSession::new(config.clone(), None).unwrap();
    let old = session.begin_chapter(image(), params(true, TransitionMode::Off)).unwrap();
    let current = session.begin_chapter(image(), params(true, TransitionMode::Off)).unwrap();
    assert_ne!(old, current);

    let mut caches = RenderCaches::default();
    let p = params(true, TransitionMode::Off);
    let make = |caches: &mut RenderCaches| {
        generate(image(), &p, &config, config.canvas, caches, |_| {}).unwrap()
    };
    assert!(!session.install_pieces(old, make(&mut caches)));
    assert!(!session.is_ready());
    assert!(session.install_pieces(current, make(&mut caches)));
    assert!(session.is_ready());
    assert!(!session.install_pieces(current, make(&mut caches)));
}

#[test]
fn image_without_pixels_stays_not_ready() {
    let mut session = ChapterSession::new(cfg(), None).unwrap();
    let mut obs = RecordingObserver::default();
    session
        .begin_chapter(SourceImage::unloaded(0, 0), params(false, TransitionMode::Random))
        .unwrap();

    // Well past the 2 s chapter plus any transition.
    let mut now = 0.0;
    while now < 20_000.0 {
        session.tick(now, &mut obs).unwrap();
        assert!(!session.is_ready());
        assert!(!session.is_finished());
        now += FRAME_MS;
    }
    assert!(session.pieces().is_none());
    assert_eq!(session.elapsed_ms(), 0.0);
    assert_eq!(obs.finished, 0);
    assert!(obs.cues.is_empty());
    assert!(obs.progress.is_empty());
    assert!(session.snapshots().is_empty());
    assert!(session.transition_effect().is_none());
    session.render().unwrap();
}

#[test]
fn empty_set_for_image_without_pixels_is_not_installed() {
    let config = cfg();
    let mut session = ChapterSession::new(config.clone(), None).unwrap();
    let p = params(false, TransitionMode::Random);
    let ticket = session.begin_chapter(SourceImage::unloaded(0, 0), p.clone()).unwrap();
    let mut caches = RenderCaches::default();
    let empty = generate(
        SourceImage::unloaded(0, 0),
        &p,
        &config,
        config.canvas,
        &mut caches,
        |_| {},
    )
    .unwrap();
    assert!(empty.is_empty());
    assert!(!session.install_pieces(ticket, empty));
    assert!(!session.is_ready());
}

#[test]
fn chapter_switch_clears_the_world() {
    let mut session = ChapterSession::new(cfg(), None).unwrap();
    let mut obs = RecordingObserver::default();
    session
        .begin_chapter(image(), params(false, TransitionMode::Pinned(TransitionEffect::Explosion)))
        .unwrap();
    let mut now = 0.0;
    while session.world().body_count() == 0 && now < 10_000.0 {
        session.tick(now, &mut obs).unwrap();
        now += FRAME_MS;
    }
    assert!(session.world().body_count() > 0);
    session.begin_chapter(image(), params(true, TransitionMode::Off)).unwrap();
    assert_eq!(session.world().body_count(), 0);
    assert!(!session.is_ready());
}

#[test]
fn next_chapter_drops_cached_text_layouts() {
    let font = std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans.ttf"
    ))
    .unwrap();
    let mut session = ChapterSession::new(cfg(), Some(font)).unwrap();
    session.begin_chapter(image(), params(false, TransitionMode::Off)).unwrap();
    session.caches.text.block("First chapter.", 12.0, 100.0, true).unwrap();
    assert_eq!(session.caches().text.len(), 1);

    session.begin_chapter(image(), params(true, TransitionMode::Off)).unwrap();
    assert!(session.caches().text.is_empty());
}
