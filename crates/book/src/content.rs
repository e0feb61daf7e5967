//! Page content: what is printed on each side of each paper.
//!
//! The engine never touches pixels. A content reports a texture handle that
//! the host resolves, the scale/offset of the page inside that texture, and
//! whether a texture coordinate is covered by interactive UI.

use std::collections::HashMap;
use std::fmt;

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

pub use folio_config::BookDirection;

use crate::error::BookError;
use crate::geometry::{x_flip_st, y_flip_st};

/// Opaque texture id owned by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Texture bound to a paper side. Missing textures fall back to white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Texture {
    #[default]
    White,
    Handle(TextureHandle),
}

impl From<Option<TextureHandle>> for Texture {
    fn from(handle: Option<TextureHandle>) -> Self {
        handle.map_or(Self::White, Self::Handle)
    }
}

/// Texture scale and offset: `uv * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureSt {
    pub scale: Vec2,
    pub offset: Vec2,
}

impl Default for TextureSt {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TextureSt {
    pub const IDENTITY: Self = Self {
        scale: Vec2::ONE,
        offset: Vec2::ZERO,
    };

    /// The sub-rectangle `min..max` of a texture, in normalized coordinates.
    pub fn from_rect(min: Vec2, max: Vec2) -> Self {
        Self {
            scale: max - min,
            offset: min,
        }
    }

    /// Packed as `(scale.x, scale.y, offset.x, offset.y)`.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.scale.x, self.scale.y, self.offset.x, self.offset.y)
    }

    pub fn from_vec4(st: Vec4) -> Self {
        Self {
            scale: Vec2::new(st.x, st.y),
            offset: Vec2::new(st.z, st.w),
        }
    }

    /// Mirrored horizontally inside the same rectangle.
    pub fn x_flipped(self) -> Self {
        Self::from_vec4(x_flip_st(self.to_vec4()))
    }

    /// Mirrored vertically inside the same rectangle.
    pub fn y_flipped(self) -> Self {
        Self::from_vec4(y_flip_st(self.to_vec4()))
    }

    pub fn apply(&self, uv: Vec2) -> Vec2 {
        uv * self.scale + self.offset
    }
}

/// One side of a paper.
pub trait PageContent: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// `None` renders the paper color on white.
    fn texture(&self) -> Option<TextureHandle>;

    fn texture_st(&self) -> TextureSt {
        TextureSt::IDENTITY
    }

    /// Whether `texture_coordinate` is covered by interactive UI. Turning
    /// never starts on such a point.
    fn is_point_over_ui(&self, _texture_coordinate: Vec2) -> bool {
        false
    }

    /// Called once per book build.
    fn init(&mut self) {}

    /// Called when the page enters or leaves the visible window.
    fn set_active(&mut self, _active: bool) {}

    /// Shareable contents may appear several times in one book.
    fn is_shareable(&self) -> bool {
        true
    }
}

/// Blank page used for empty and padding slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPageContent;

impl PageContent for EmptyPageContent {
    fn name(&self) -> &str {
        "Empty"
    }

    fn texture(&self) -> Option<TextureHandle> {
        None
    }
}

static EMPTY: EmptyPageContent = EmptyPageContent;

/// A static image, optionally a sub-rectangle of an atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpritePageContent {
    pub name: String,
    pub texture: Option<TextureHandle>,
    /// Normalized `min..max` rectangle of the sprite in its texture
    pub rect: (Vec2, Vec2),
}

impl SpritePageContent {
    pub fn new(name: impl Into<String>, texture: TextureHandle) -> Self {
        Self {
            name: name.into(),
            texture: Some(texture),
            rect: (Vec2::ZERO, Vec2::ONE),
        }
    }

    pub fn with_rect(mut self, min: Vec2, max: Vec2) -> Self {
        self.rect = (min, max);
        self
    }
}

impl PageContent for SpritePageContent {
    fn name(&self) -> &str {
        &self.name
    }

    fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    fn texture_st(&self) -> TextureSt {
        if self.texture.is_none() {
            return TextureSt::IDENTITY;
        }
        TextureSt::from_rect(self.rect.0, self.rect.1)
    }
}

/// Callback invoked with the new active state.
pub type ActiveChangedCallback = Box<dyn FnMut(bool) + Send + Sync>;

/// Content rendered live by the host (a camera, a canvas, a video).
///
/// Bound to a single book slot. The host is told through the callback when
/// the page becomes visible so it can pause rendering while it is hidden.
pub struct LivePageContent {
    name: String,
    texture: Option<TextureHandle>,
    /// Normalized rectangles covered by interactive UI
    ui_rects: Vec<(Vec2, Vec2)>,
    active: bool,
    on_active_changed: Option<ActiveChangedCallback>,
}

impl fmt::Debug for LivePageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivePageContent")
            .field("name", &self.name)
            .field("texture", &self.texture)
            .field("ui_rects", &self.ui_rects)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl LivePageContent {
    pub fn new(name: impl Into<String>, texture: Option<TextureHandle>) -> Self {
        Self {
            name: name.into(),
            texture,
            ui_rects: Vec::new(),
            active: false,
            on_active_changed: None,
        }
    }

    pub fn add_ui_rect(&mut self, min: Vec2, max: Vec2) {
        self.ui_rects.push((min, max));
    }

    pub fn on_active_changed(mut self, callback: impl FnMut(bool) + Send + Sync + 'static) -> Self {
        self.on_active_changed = Some(Box::new(callback));
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl PageContent for LivePageContent {
    fn name(&self) -> &str {
        &self.name
    }

    fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    fn is_point_over_ui(&self, uv: Vec2) -> bool {
        self.ui_rects
            .iter()
            .any(|(min, max)| uv.cmpge(*min).all() && uv.cmple(*max).all())
    }

    fn init(&mut self) {
        self.active = false;
    }

    fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if let Some(callback) = self.on_active_changed.as_mut() {
            callback(active);
        }
    }

    fn is_shareable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Cover,
    Page,
}

/// A slot of [`BookContent`]. Slots past the end of a list are blank padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId {
    pub kind: ContentKind,
    pub index: usize,
}

impl ContentId {
    pub fn cover(index: usize) -> Self {
        Self {
            kind: ContentKind::Cover,
            index,
        }
    }

    pub fn page(index: usize) -> Self {
        Self {
            kind: ContentKind::Page,
            index,
        }
    }
}

/// Round up to a multiple of 4.
fn ceil4(n: usize) -> usize {
    n.div_ceil(4) * 4
}

/// Ordered covers and pages of a book.
///
/// Lists are padded with blank slots to a multiple of 4; at most 4 covers are
/// used. Empty entries render blank.
#[derive(Debug, Default)]
pub struct BookContent {
    pub direction: BookDirection,
    covers: Vec<Option<Box<dyn PageContent>>>,
    pages: Vec<Option<Box<dyn PageContent>>>,
}

impl BookContent {
    pub fn new(direction: BookDirection) -> Self {
        Self {
            direction,
            covers: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn push_cover(&mut self, content: Option<Box<dyn PageContent>>) -> &mut Self {
        self.covers.push(content);
        self
    }

    pub fn push_page(&mut self, content: Option<Box<dyn PageContent>>) -> &mut Self {
        self.pages.push(content);
        self
    }

    pub fn with_covers(mut self, count: usize) -> Self {
        self.covers.resize_with(count, || None);
        self
    }

    pub fn with_pages(mut self, count: usize) -> Self {
        self.pages.resize_with(count, || None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.covers.is_empty() && self.pages.is_empty()
    }

    /// Number of cover slots after padding.
    pub fn cover_count(&self) -> usize {
        ceil4(self.covers.len()).min(4)
    }

    /// Number of page slots after padding.
    pub fn page_count(&self) -> usize {
        ceil4(self.pages.len())
    }

    pub fn cover_ids(&self) -> Vec<ContentId> {
        (0..self.cover_count()).map(ContentId::cover).collect()
    }

    pub fn page_ids(&self) -> Vec<ContentId> {
        (0..self.page_count()).map(ContentId::page).collect()
    }

    fn slot(&self, id: ContentId) -> Option<&dyn PageContent> {
        let list = match id.kind {
            ContentKind::Cover => &self.covers,
            ContentKind::Page => &self.pages,
        };
        list.get(id.index)?.as_deref()
    }

    /// The content in a slot; blank slots return an empty page.
    pub fn get(&self, id: ContentId) -> &dyn PageContent {
        self.slot(id).unwrap_or(&EMPTY)
    }

    pub fn get_mut(&mut self, id: ContentId) -> Option<&mut (dyn PageContent + 'static)> {
        let list = match id.kind {
            ContentKind::Cover => &mut self.covers,
            ContentKind::Page => &mut self.pages,
        };
        list.get_mut(id.index)?.as_deref_mut()
    }

    /// Reset every content for a new build.
    ///
    /// Fails when a content that cannot be shared is present more than once.
    pub fn init(&mut self) -> Result<(), BookError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for content in self.covers.iter().chain(&self.pages).flatten() {
            if content.is_shareable() {
                continue;
            }
            let count = seen.entry(content.name()).or_default();
            *count += 1;
            if *count > 1 {
                return Err(BookError::DuplicatedContent {
                    name: content.name().to_string(),
                });
            }
        }

        let cover_count = self.cover_count();
        for content in self.covers.iter_mut().take(cover_count).flatten() {
            content.init();
        }
        for content in self.pages.iter_mut().flatten() {
            content.init();
        }
        Ok(())
    }

    /// Logical page number of a slot, counting both sides of every paper
    /// from the front cover.
    pub fn page_index(&self, id: ContentId) -> usize {
        let covers = self.cover_count();
        let pages = self.page_count();
        match id.kind {
            ContentKind::Cover if pages == 0 || id.index < covers / 2 => id.index,
            ContentKind::Cover => pages + id.index,
            ContentKind::Page => covers / 2 + id.index,
        }
    }
}

/// Paper holding a logical page.
pub fn paper_index(page_index: usize) -> usize {
    page_index / 2
}

/// Logical page on one side of a paper.
pub fn page_index(paper_index: usize, back: bool) -> usize {
    paper_index * 2 + usize::from(back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_st_flips_stay_in_rect() {
        let st = TextureSt::from_rect(Vec2::new(0.25, 0.5), Vec2::new(0.75, 1.0));
        let flipped = st.x_flipped();
        assert!(flipped.apply(Vec2::ZERO).abs_diff_eq(st.apply(Vec2::X), 1e-6));
        assert!(flipped.apply(Vec2::X).abs_diff_eq(st.apply(Vec2::ZERO), 1e-6));

        let flipped = st.y_flipped();
        assert!(flipped.apply(Vec2::ZERO).abs_diff_eq(st.apply(Vec2::Y), 1e-6));
    }

    #[test]
    fn test_padding() {
        let content = BookContent::new(BookDirection::LeftToRight).with_covers(6).with_pages(5);
        assert_eq!(content.cover_count(), 4);
        assert_eq!(content.page_count(), 8);
        assert_eq!(content.get(ContentId::page(7)).name(), "Empty");
        assert_eq!(content.get(ContentId::page(7)).texture(), None);
    }

    #[test]
    fn test_sprite_st() {
        let sprite = SpritePageContent::new("a", TextureHandle(3)).with_rect(Vec2::ZERO, Vec2::new(0.5, 1.0));
        assert_eq!(sprite.texture_st().to_vec4(), Vec4::new(0.5, 1.0, 0.0, 0.0));
        assert_eq!(Texture::from(sprite.texture()), Texture::Handle(TextureHandle(3)));
        assert_eq!(Texture::from(None), Texture::White);
    }

    #[test]
    fn test_duplicated_live_content_fails() {
        let mut content = BookContent::new(BookDirection::LeftToRight);
        content.push_page(Some(Box::new(LivePageContent::new("live", None))));
        content.push_page(Some(Box::new(LivePageContent::new("live", None))));
        let err = content.init().unwrap_err();
        assert!(matches!(err, BookError::DuplicatedContent { ref name } if name == "live"));
        assert_eq!(
            err.to_string(),
            "The page content (live) is assigned to the book content multiple times."
        );
    }

    #[test]
    fn test_shared_sprites_may_repeat() {
        let mut content = BookContent::new(BookDirection::LeftToRight);
        for _ in 0..2 {
            content.push_page(Some(Box::new(SpritePageContent::new("s", TextureHandle(1)))));
        }
        assert!(content.init().is_ok());
    }

    #[test]
    fn test_live_content_activation_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut live = LivePageContent::new("live", Some(TextureHandle(9)))
            .on_active_changed(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        live.set_active(true);
        live.set_active(true);
        live.set_active(false);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!live.is_active());
    }

    #[test]
    fn test_point_over_ui() {
        let mut live = LivePageContent::new("live", None);
        live.add_ui_rect(Vec2::new(0.1, 0.1), Vec2::new(0.3, 0.3));
        assert!(live.is_point_over_ui(Vec2::new(0.2, 0.2)));
        assert!(!live.is_point_over_ui(Vec2::new(0.5, 0.2)));
    }

    #[test]
    fn test_page_index_mapping() {
        let content = BookContent::new(BookDirection::LeftToRight).with_covers(4).with_pages(8);
        assert_eq!(content.page_index(ContentId::cover(0)), 0);
        assert_eq!(content.page_index(ContentId::cover(1)), 1);
        assert_eq!(content.page_index(ContentId::page(0)), 2);
        assert_eq!(content.page_index(ContentId::cover(2)), 10);
        assert_eq!(paper_index(5), 2);
        assert_eq!(page_index(2, true), 5);
    }

    #[test]
    fn test_content_id_json() {
        let id = ContentId::cover(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"kind":"cover","index":3}"#);
        let parsed: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
