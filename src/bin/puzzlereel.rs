use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use puzzlereel::assets::decode::load_image;
use puzzlereel::{
    AudioCue, ChapterParams, ChapterSession, GridSession, ProjectDef, SessionObserver,
    SourceImage, Surface,
};

#[derive(Parser, Debug)]
#[command(name = "puzzlereel", version)]
struct Cli {
    /// Log engine events at debug level.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a PNG sequence until the project finishes.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Chapter to play (0-based). Ignored for grid projects.
    #[arg(long, default_value_t = 0)]
    chapter: usize,

    /// Chapter time of the captured frame, in milliseconds.
    #[arg(long)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Write every n-th tick only.
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Stop after this many seconds of playback even if the project is still running.
    #[arg(long, default_value_t = 900.0)]
    max_secs: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

/// Forwards session events to the log.
struct LogObserver {
    chapter: usize,
}

impl SessionObserver for LogObserver {
    fn on_finished(&mut self) {
        tracing::info!(chapter = self.chapter, "chapter finished");
    }

    fn on_chapter_change(&mut self, chapter: usize) {
        self.chapter = chapter;
        tracing::info!(chapter, "grid chapter in focus");
    }

    fn on_audio_cue(&mut self, cue: AudioCue) {
        tracing::debug!(?cue, gain = cue.gain(), "audio cue");
    }
}

struct Loaded {
    project: ProjectDef,
    chapters: Vec<(SourceImage, ChapterParams)>,
    font: Option<Vec<u8>>,
}

fn load_project(path: &Path) -> anyhow::Result<Loaded> {
    let project = ProjectDef::from_path(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));

    let font = match &project.font {
        Some(rel) => {
            let p = ProjectDef::resolve(root, rel);
            Some(std::fs::read(&p).with_context(|| format!("read font '{}'", p.display()))?)
        }
        None => None,
    };
    let logo = match &project.logo {
        Some(rel) => Some(load_image(&ProjectDef::resolve(root, rel))?),
        None => None,
    };

    let last = project.chapters.len().saturating_sub(1);
    let mut chapters = Vec::with_capacity(project.chapters.len());
    for (i, def) in project.chapters.iter().enumerate() {
        let image = load_image(&ProjectDef::resolve(root, &def.image))?;
        let chapter_logo = if i == last { logo.clone() } else { None };
        let params = project
            .chapter_params(i, chapter_logo)
            .with_context(|| format!("chapter {i} missing"))?;
        chapters.push((image, params));
    }
    Ok(Loaded {
        project,
        chapters,
        font,
    })
}

/// Single chapters played back to back, or the whole project as a grid.
enum Player {
    Chapters {
        session: ChapterSession,
        queue: std::vec::IntoIter<(SourceImage, ChapterParams)>,
    },
    Grid(GridSession),
}

impl Player {
    /// `follow` keeps playing the chapters after `first_chapter`.
    fn new(loaded: Loaded, first_chapter: usize, follow: bool) -> anyhow::Result<Self> {
        let Loaded {
            project,
            chapters,
            font,
        } = loaded;
        if project.grid {
            let mut grid = GridSession::new(project.engine, font)?;
            if !grid.load(chapters)? {
                tracing::warn!("grid project is not playable; rendering its placeholder");
            }
            return Ok(Self::Grid(grid));
        }
        if first_chapter >= chapters.len() {
            anyhow::bail!(
                "chapter {first_chapter} out of range (project has {})",
                chapters.len()
            );
        }
        let take = if follow { chapters.len() } else { 1 };
        let mut queue = chapters
            .into_iter()
            .skip(first_chapter)
            .take(take)
            .collect::<Vec<_>>()
            .into_iter();
        let mut session = ChapterSession::new(project.engine, font)?;
        if let Some((image, params)) = queue.next() {
            session.begin_chapter(image, params)?;
        }
        Ok(Self::Chapters { session, queue })
    }

    /// Advance to `now_ms`; returns false once nothing is left to play.
    fn tick(&mut self, now_ms: f64, observer: &mut LogObserver) -> anyhow::Result<bool> {
        match self {
            Self::Grid(grid) => {
                grid.tick(now_ms, observer)?;
                Ok(!grid.is_finished())
            }
            Self::Chapters { session, queue } => {
                session.tick(now_ms, observer)?;
                if !session.is_finished() {
                    return Ok(true);
                }
                match queue.next() {
                    Some((image, params)) => {
                        observer.chapter += 1;
                        session.begin_chapter(image, params)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }

    /// Chapter-local time for single chapters, grid time for grids.
    fn elapsed_ms(&self) -> f64 {
        match self {
            Self::Grid(grid) => grid.elapsed_ms(),
            Self::Chapters { session, .. } => session.elapsed_ms(),
        }
    }

    fn render(&mut self) -> anyhow::Result<&Surface> {
        Ok(match self {
            Self::Grid(grid) => grid.render()?,
            Self::Chapters { session, .. } => session.render()?,
        })
    }
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let loaded = load_project(&args.project)?;
    let frame_ms = 1000.0 / f64::from(loaded.project.fps);
    let mut player = Player::new(loaded, args.chapter, false)?;
    let mut observer = LogObserver {
        chapter: args.chapter,
    };

    // Generation and finale physics are incremental, so the frame is reached by playing up to it.
    let mut now_ms = 0.0;
    let mut ticks = 0u64;
    loop {
        let running = player.tick(now_ms, &mut observer)?;
        ticks += 1;
        if !running || player.elapsed_ms() >= args.at_ms || now_ms > args.at_ms + 600_000.0 {
            break;
        }
        now_ms += frame_ms;
    }
    tracing::debug!(ticks, elapsed_ms = player.elapsed_ms(), "frame reached");

    if let Some(parent) = args.out.parent() {
        ensure_dir(parent)?;
    }
    player
        .render()?
        .save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    if args.every == 0 {
        anyhow::bail!("--every must be > 0");
    }
    let loaded = load_project(&args.project)?;
    let frame_ms = 1000.0 / f64::from(loaded.project.fps);
    let mut player = Player::new(loaded, 0, true)?;
    let mut observer = LogObserver { chapter: 0 };
    ensure_dir(&args.out_dir)?;

    let limit_ms = args.max_secs * 1000.0;
    let mut tick = 0u64;
    let mut written = 0u64;
    loop {
        let now_ms = tick as f64 * frame_ms;
        let running = player.tick(now_ms, &mut observer)?;
        if tick % args.every == 0 || !running {
            let path = args.out_dir.join(format!("frame_{written:06}.png"));
            player
                .render()?
                .save_png(&path)
                .with_context(|| format!("write png '{}'", path.display()))?;
            written += 1;
        }
        if !running {
            break;
        }
        if now_ms >= limit_ms {
            tracing::warn!(limit_ms, "playback limit reached before the project finished");
            break;
        }
        tick += 1;
    }

    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}
