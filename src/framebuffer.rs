use glam::{IVec2, Vec2};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v)
    }
}

/// Alpha blend one channel, `(x + 1 + (x >> 8)) >> 8` standing in for `x / 255`.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = alpha as u16;
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Packed RGB24 pixels, row-major, ready to upload as a streaming texture.
#[derive(Clone, PartialEq, Debug)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// bytes per row
    pub fn pitch(&self) -> usize {
        self.width * 3
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some((y as usize * self.width + x as usize) * 3)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        let i = self.offset(x, y)?;
        Some(Rgb::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
        ))
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    /// Fill a rectangle, clipped to the buffer. Empty or negative sizes draw nothing.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let x0 = x.clamp(0, self.width as i32);
        let y0 = y.clamp(0, self.height as i32);
        let x1 = x.saturating_add(w.max(0)).clamp(0, self.width as i32);
        let y1 = y.saturating_add(h.max(0)).clamp(0, self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let rgb = [color.r, color.g, color.b];
        let pitch = self.pitch();
        for row in y0 as usize..y1 as usize {
            let start = row * pitch + x0 as usize * 3;
            let end = row * pitch + x1 as usize * 3;
            for px in self.pixels[start..end].chunks_exact_mut(3) {
                px.copy_from_slice(&rgb);
            }
        }
    }

    /// Bresenham line, clipped per pixel.
    pub fn draw_line(&mut self, from: IVec2, to: IVec2, color: Rgb) {
        let d = (to - from).abs();
        let s = (to - from).signum();
        let mut err = d.x - d.y;
        let mut p = from;

        loop {
            self.set(p.x, p.y, color);
            if p == to {
                break;
            }
            let e2 = err * 2;
            if e2 > -d.y {
                err -= d.y;
                p.x += s.x;
            }
            if e2 < d.x {
                err += d.x;
                p.y += s.y;
            }
        }
    }

    pub fn fill_circle(&mut self, center: IVec2, radius: i32, color: Rgb) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set(center.x + dx, center.y + dy, color);
                }
            }
        }
    }

    /// Blend `src` over this buffer at `alpha`, with `src` shifted by `offset`.
    /// Pixels with no source underneath keep their value.
    pub fn blend_from(&mut self, src: &FrameBuffer, offset: IVec2, alpha: u8) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if let Some(over) = src.get(x - offset.x, y - offset.y) {
                    self.blend(x, y, over, alpha);
                }
            }
        }
    }

    fn blend(&mut self, x: i32, y: i32, over: Rgb, alpha: u8) {
        let Some(under) = self.get(x, y) else {
            return;
        };
        self.set(
            x,
            y,
            Rgb::new(
                blend_channel(over.r, under.r, alpha),
                blend_channel(over.g, under.g, alpha),
                blend_channel(over.b, under.b, alpha),
            ),
        );
    }

    /// Blend `color` over the interior of a closed polygon, scanline by
    /// scanline with the even-odd rule. A pixel is inside when its centre is,
    /// and each covered pixel is blended exactly once.
    pub fn blend_polygon(&mut self, points: &[Vec2], color: Rgb, alpha: u8) {
        if points.len() < 3 {
            return;
        }

        let (top, bottom) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let first_row = (top.floor() as i32).max(0);
        let last_row = (bottom.ceil() as i32).min(self.height as i32);

        let edges = || points.iter().zip(points.iter().cycle().skip(1));
        let mut crossings = Vec::with_capacity(points.len());
        for y in first_row..last_row {
            let scan = y as f32 + 0.5;
            crossings.clear();
            crossings.extend(
                edges()
                    .filter(|(a, b)| (a.y <= scan) != (b.y <= scan))
                    .map(|(a, b)| a.x + (scan - a.y) / (b.y - a.y) * (b.x - a.x)),
            );
            crossings.sort_by(f32::total_cmp);

            for span in crossings.chunks_exact(2) {
                let from = ((span[0] - 0.5).ceil() as i32).max(0);
                let to = ((span[1] - 0.5).ceil() as i32).min(self.width as i32);
                for x in from..to {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    /// Write this buffer into `out` moved by `offset`; uncovered pixels get `background`.
    pub fn translate_into(&self, out: &mut FrameBuffer, offset: IVec2, background: Rgb) {
        if offset == IVec2::ZERO && out.width == self.width && out.height == self.height {
            out.pixels.copy_from_slice(&self.pixels);
            return;
        }

        for y in 0..out.height as i32 {
            for x in 0..out.width as i32 {
                let color = self
                    .get(x - offset.x, y - offset.y)
                    .unwrap_or(background);
                out.set(x, y, color);
            }
        }
    }

    pub fn copy_from(&mut self, other: &FrameBuffer) {
        self.width = other.width;
        self.height = other.height;
        self.pixels.clone_from(&other.pixels);
    }
}
