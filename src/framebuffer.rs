use image::{ImageBuffer, Rgba};
use rayon::prelude::*;
use std::path::Path;

// 视口变换后深度落在 [0, 1]，清屏时填最远值
const FAR_DEPTH: f32 = 1.0;

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![0; width * height],
            depth: vec![FAR_DEPTH; width * height],
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.data.fill(color);
        self.depth.fill(FAR_DEPTH);
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32, depth: f32) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if depth < self.depth[idx] {
                self.data[idx] = color;
                self.depth[idx] = depth;
            }
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        self.data[y * self.width + x]
    }

    /// 超采样降分辨率：每个 factor x factor 区域取平均，逐行并行
    pub fn ssaa(&self, factor: usize) -> Self {
        if factor <= 1 {
            return self.clone();
        }
        let new_width = self.width / factor;
        let new_height = self.height / factor;
        let count = (factor * factor) as u32;
        let mut new_data = vec![0; new_width * new_height];

        new_data
            .par_chunks_mut(new_width.max(1))
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let (mut a, mut r, mut g, mut b) = (0u32, 0u32, 0u32, 0u32);
                    for dy in 0..factor {
                        for dx in 0..factor {
                            let color = self.data[(y * factor + dy) * self.width + x * factor + dx];
                            a += (color >> 24) & 0xFF;
                            r += (color >> 16) & 0xFF;
                            g += (color >> 8) & 0xFF;
                            b += color & 0xFF;
                        }
                    }
                    *out = (a / count) << 24 | (r / count) << 16 | (g / count) << 8 | b / count;
                }
            });

        Self {
            width: new_width,
            height: new_height,
            data: new_data,
            depth: vec![FAR_DEPTH; new_width * new_height],
        }
    }

    pub fn save_to_image(&self, filepath: &Path) -> Result<(), image::ImageError> {
        let img = ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let color = self.data[y as usize * self.width + x as usize];
            Rgba([
                ((color >> 16) & 0xFF) as u8,
                ((color >> 8) & 0xFF) as u8,
                (color & 0xFF) as u8,
                ((color >> 24) & 0xFF) as u8,
            ])
        });
        img.save(filepath)
    }
}
