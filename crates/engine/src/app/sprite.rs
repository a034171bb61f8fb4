use super::geometry::Vec2;

pub type Rgba = [u8; 4];

/// Source rectangle inside a texture, in texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Drawing surface handed to scenes each frame. Implementations decide how
/// primitives reach the screen; drawing never feeds back into scene state.
pub trait RenderSink {
    /// Filled rectangle centered on `center`.
    fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Rgba);

    /// One source frame of `texture`, scaled to `size` and centered on `center`.
    fn draw_frame(&mut self, texture: &str, frame: FrameRect, center: Vec2, size: Vec2);

    /// Text anchored at its top-left corner.
    fn draw_text(&mut self, position: Vec2, text: &str, char_size: u32, color: Rgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpriteKind {
    Rect {
        color: Rgba,
    },
    Frames {
        texture: String,
        frames: Vec<FrameRect>,
        current: usize,
    },
    Text {
        text: String,
        char_size: u32,
        color: Rgba,
    },
}

/// Positioned, sized drawable: a solid rectangle, an animated textured quad,
/// or a text label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    position: Vec2,
    size: Vec2,
    kind: SpriteKind,
}

impl Sprite {
    pub fn rect(position: Vec2, size: Vec2, color: Rgba) -> Self {
        Self {
            position,
            size,
            kind: SpriteKind::Rect { color },
        }
    }

    pub fn frames(
        position: Vec2,
        size: Vec2,
        texture: impl Into<String>,
        frames: Vec<FrameRect>,
    ) -> Self {
        Self {
            position,
            size,
            kind: SpriteKind::Frames {
                texture: texture.into(),
                frames,
                current: 0,
            },
        }
    }

    pub fn text(position: Vec2, text: impl Into<String>, char_size: u32, color: Rgba) -> Self {
        Self {
            position,
            size: Vec2::ZERO,
            kind: SpriteKind::Text {
                text: text.into(),
                char_size,
                color,
            },
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Cycle to the next animation frame, wrapping past the last one. No-op
    /// for non-animated sprites.
    pub fn advance_frame(&mut self) {
        if let SpriteKind::Frames {
            frames, current, ..
        } = &mut self.kind
        {
            if !frames.is_empty() {
                *current = (*current + 1) % frames.len();
            }
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            SpriteKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        if let SpriteKind::Text { text, .. } = &mut self.kind {
            *text = value.into();
        }
    }

    pub fn kind(&self) -> &SpriteKind {
        &self.kind
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        match &self.kind {
            SpriteKind::Rect { color } => sink.fill_rect(self.position, self.size, *color),
            SpriteKind::Frames {
                texture,
                frames,
                current,
            } => {
                if let Some(frame) = frames.get(*current) {
                    sink.draw_frame(texture, *frame, self.position, self.size);
                }
            }
            SpriteKind::Text {
                text,
                char_size,
                color,
            } => sink.draw_text(self.position, text, *char_size, *color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        rects: Vec<(Vec2, Vec2, Rgba)>,
        frames: Vec<(String, FrameRect, Vec2, Vec2)>,
        texts: Vec<(Vec2, String, u32, Rgba)>,
    }

    impl RenderSink for RecordingSink {
        fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Rgba) {
            self.rects.push((center, size, color));
        }

        fn draw_frame(&mut self, texture: &str, frame: FrameRect, center: Vec2, size: Vec2) {
            self.frames.push((texture.to_string(), frame, center, size));
        }

        fn draw_text(&mut self, position: Vec2, text: &str, char_size: u32, color: Rgba) {
            self.texts.push((position, text.to_string(), char_size, color));
        }
    }

    #[test]
    fn advance_frame_wraps_to_first() {
        let frames = vec![
            FrameRect::new(0, 0, 8, 8),
            FrameRect::new(8, 0, 8, 8),
        ];
        let mut sprite = Sprite::frames(Vec2::ZERO, Vec2::new(16.0, 16.0), "sheet", frames);

        sprite.advance_frame();
        let mut sink = RecordingSink::default();
        sprite.render(&mut sink);
        assert_eq!(sink.frames[0].1, FrameRect::new(8, 0, 8, 8));

        sprite.advance_frame();
        sprite.render(&mut sink);
        assert_eq!(sink.frames[1].1, FrameRect::new(0, 0, 8, 8));
    }

    #[test]
    fn rect_sprite_renders_at_its_center() {
        let sprite = Sprite::rect(Vec2::new(5.0, 6.0), Vec2::new(2.0, 4.0), [0, 255, 0, 255]);
        let mut sink = RecordingSink::default();
        sprite.render(&mut sink);

        assert_eq!(sink.rects.len(), 1);
        assert_eq!(sink.rects[0].0, Vec2::new(5.0, 6.0));
        assert_eq!(sink.rects[0].1, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn text_sprite_exposes_and_updates_its_string() {
        let mut sprite = Sprite::text(Vec2::ZERO, "0000", 60, [255, 255, 0, 255]);
        assert_eq!(sprite.text_value(), Some("0000"));

        sprite.set_text("0042");
        let mut sink = RecordingSink::default();
        sprite.render(&mut sink);
        assert_eq!(sink.texts[0].1, "0042");
    }

    #[test]
    fn set_text_on_non_text_sprite_is_a_no_op() {
        let mut sprite = Sprite::rect(Vec2::ZERO, Vec2::ZERO, [0, 0, 0, 255]);
        sprite.set_text("ignored");
        assert_eq!(sprite.text_value(), None);
    }

    #[test]
    fn render_does_not_mutate_sprite_state() {
        let sprite = Sprite::rect(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), [1, 2, 3, 255]);
        let before = sprite.clone();
        let mut sink = RecordingSink::default();
        sprite.render(&mut sink);
        assert_eq!(sprite, before);
    }
}
