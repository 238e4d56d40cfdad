use std::f64::consts::PI;
use std::sync::Arc;

use crate::assets::image::SourceImage;
use crate::config::chapter::{ChapterParams, Material, Shape};
use crate::config::engine::EngineConfig;
use crate::foundation::core::{Affine, Canvas, CoverFit, Point, Vec2};
use crate::foundation::error::ReelResult;
use crate::foundation::math::Rng64;
use crate::render::RenderCaches;
use crate::render::paint::{affine_to_cpu, bezpath_to_cpu, rgba, stroke_outline};
use crate::tessellation::connectivity::ConnectivityGrid;
use crate::tessellation::layout::layout;
use crate::tessellation::outline::outline;
use crate::tessellation::piece::{Piece, PieceSet};

/// Result of one [`TessellationJob::step`].
#[derive(Debug)]
pub enum JobStep {
    /// Fraction of bitmaps built so far, in `[0, 1)`.
    Progress(f64),
    Done(PieceSet),
}

/// Incremental tessellation: geometry up front, bitmaps one batch per step.
pub struct TessellationJob {
    image: SourceImage,
    canvas: Canvas,
    shape: Shape,
    material: Material,
    fit: Option<CoverFit>,
    batch_size: usize,
    padding: f64,
    bitmap_scale: f64,
    pieces: Vec<Piece>,
    next: usize,
    rng: Rng64,
    ctx: Option<vello_cpu::RenderContext>,
    finished: bool,
}

impl std::fmt::Debug for TessellationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TessellationJob")
            .field("shape", &self.shape)
            .field("pieces", &self.pieces.len())
            .field("next", &self.next)
            .field("finished", &self.finished)
            .finish()
    }
}

impl TessellationJob {
    /// Lay out cells and scatter origins for `image` on `canvas`.
    ///
    /// Zero-sized images produce a job that completes immediately with an empty set.
    #[tracing::instrument(
        skip(image, params, cfg),
        fields(shape = ?params.shape, n = params.piece_count)
    )]
    pub fn new(
        image: SourceImage,
        params: &ChapterParams,
        cfg: &EngineConfig,
        canvas: Canvas,
    ) -> Self {
        let mut rng = Rng64::new(params.seed);
        let fit = if image.is_ready() {
            canvas.cover_fit(image.width(), image.height())
        } else {
            None
        };

        let mut job = Self {
            image,
            canvas,
            shape: params.shape,
            material: params.material,
            fit,
            batch_size: cfg.batch_size.max(1),
            padding: 0.0,
            bitmap_scale: cfg.output_scale,
            pieces: Vec::new(),
            next: 0,
            rng,
            ctx: None,
            finished: false,
        };
        let Some(fit) = fit else {
            tracing::debug!("image not ready; tessellation yields an empty set");
            return job;
        };

        let cells = layout(params.shape, canvas, params.piece_count);
        let padding = cells.piece_w.max(cells.piece_h) * cfg.padding_ratio;
        let grid = (params.shape == Shape::Jigsaw)
            .then(|| ConnectivityGrid::generate(cells.rows, cells.cols, &mut rng));
        let ring = canvas.w().max(canvas.h());
        let center = canvas.center();

        let mut pieces = Vec::with_capacity(cells.cells.len());
        for (id, cell) in cells.cells.iter().enumerate() {
            let tabs = grid
                .as_ref()
                .map(|g| g.get(cell.row.max(0) as usize, cell.col.max(0) as usize));
            let w = cell.target.width();
            let h = cell.target.height();
            let radius = rng.range_f64(0.6, 0.95) * ring;
            let angle = rng.range_f64(0.0, 2.0 * PI);
            let origin = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            let sample = fit.rect_to_source(cell.target.inflate(padding, padding));
            pieces.push(Piece {
                id,
                row: cell.row,
                col: cell.col,
                sub: cell.sub,
                target: cell.target,
                sample,
                width: w,
                height: h,
                origin,
                rotation: rng.range_f64(-PI, PI),
                z: rng.next_f64_01(),
                order: id,
                tabs,
                outline: outline(cell.kind, cell.sub, w, h, tabs.unwrap_or_default()),
                bitmap: None,
                padding,
            });
        }

        job.padding = padding;
        job.rng = rng;
        job.pieces = pieces;
        job
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fraction of piece bitmaps built.
    pub fn progress(&self) -> f64 {
        if self.pieces.is_empty() {
            return 1.0;
        }
        self.next as f64 / self.pieces.len() as f64
    }

    /// Build the next batch of bitmaps. The final step assigns the assembly order.
    pub fn step(&mut self, caches: &mut RenderCaches) -> ReelResult<JobStep> {
        if self.finished {
            return Ok(JobStep::Done(PieceSet::empty(self.canvas, self.shape)));
        }
        let end = (self.next + self.batch_size).min(self.pieces.len());
        for i in self.next..end {
            let bitmap = self.render_bitmap(i, caches)?;
            self.pieces[i].bitmap = bitmap.map(Arc::new);
        }
        self.next = end;
        if self.next < self.pieces.len() {
            return Ok(JobStep::Progress(self.progress()));
        }

        let order = self.rng.permutation(self.pieces.len());
        for (piece, o) in self.pieces.iter_mut().zip(order) {
            piece.order = o;
        }
        self.finished = true;
        let pieces = std::mem::take(&mut self.pieces);
        tracing::debug!(pieces = pieces.len(), "tessellation finished");
        Ok(JobStep::Done(PieceSet::new(
            self.canvas,
            self.shape,
            pieces,
            self.padding,
            self.bitmap_scale,
        )))
    }

    fn render_bitmap(
        &mut self,
        i: usize,
        caches: &mut RenderCaches,
    ) -> ReelResult<Option<vello_cpu::Pixmap>> {
        let (Some(fit), Some(paint)) = (self.fit, self.image.paint().cloned()) else {
            return Ok(None);
        };
        let piece = &self.pieces[i];
        let s = self.bitmap_scale;
        let pw = ((piece.width + 2.0 * piece.padding) * s).ceil().max(1.0) as u32;
        let ph = ((piece.height + 2.0 * piece.padding) * s).ceil().max(1.0) as u32;
        let texture = caches
            .materials
            .texture(self.material, piece.width, piece.height)?;
        let mut pixmap = caches.pool.borrow(pw, ph)?;

        let local_to_px = Affine::scale(s) * Affine::translate((piece.padding, piece.padding));
        let image_to_local =
            Affine::translate(Point::ORIGIN - piece.target.origin()) * fit.affine();
        let shape = bezpath_to_cpu(&piece.outline);
        let border = stroke_outline(&piece.outline, 1.5);

        let (w16, h16) = (pixmap.width(), pixmap.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w16 && ctx.height() == h16 => ctx,
            _ => vello_cpu::RenderContext::new(w16, h16),
        };
        ctx.reset();
        ctx.set_transform(affine_to_cpu(local_to_px));
        ctx.set_paint_transform(affine_to_cpu(image_to_local));
        ctx.set_paint(paint);
        ctx.fill_path(&shape);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if let Some(tex) = texture {
            ctx.set_paint(tex);
            ctx.fill_path(&shape);
        }
        ctx.set_paint(rgba(255, 255, 255, 90));
        ctx.fill_path(&border);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);
        Ok(Some(pixmap))
    }
}

/// Run a [`TessellationJob`] to completion, reporting progress once per batch.
pub fn generate(
    image: SourceImage,
    params: &ChapterParams,
    cfg: &EngineConfig,
    canvas: Canvas,
    caches: &mut RenderCaches,
    mut progress: impl FnMut(f64),
) -> ReelResult<PieceSet> {
    let mut job = TessellationJob::new(image, params, cfg, canvas);
    loop {
        match job.step(caches)? {
            JobStep::Progress(p) => progress(p),
            JobStep::Done(set) => {
                progress(1.0);
                return Ok(set);
            }
        }
    }
}

/// Normalized position along the top-left → bottom-right diagonal, used to stagger ripples.
pub fn diagonal(piece: &Piece, canvas: Canvas) -> f64 {
    let c = piece.target_center();
    ((c.x / canvas.w() + c.y / canvas.h()) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/tessellation/generator.rs"]
mod tests;
