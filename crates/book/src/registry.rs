//! Explicit registry of the books a host drives.
//!
//! Cross-book queries, such as routing a pointer ray to whichever book it
//! hits first, go through a registry owned by the host.

use tracing::debug;

use crate::book::Book;
use crate::raycast::{BookRaycastHit, Ray};

/// Handle to a registered book. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub u32);

#[derive(Debug, Default)]
pub struct BookRegistry {
    books: Vec<(BookId, Book)>,
    next_id: u32,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, book: Book) -> BookId {
        let id = BookId(self.next_id);
        self.next_id += 1;
        self.books.push((id, book));
        debug!(id = id.0, "Book registered");
        id
    }

    pub fn unregister(&mut self, id: BookId) -> Option<Book> {
        let i = self.books.iter().position(|(b, _)| *b == id)?;
        debug!(id = id.0, "Book unregistered");
        Some(self.books.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|(b, _)| *b == id).map(|(_, book)| book)
    }

    pub fn get_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.iter_mut().find(|(b, _)| *b == id).map(|(_, book)| book)
    }

    /// Books in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BookId, &Book)> {
        self.books.iter().map(|(id, book)| (*id, book))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BookId, &mut Book)> {
        self.books.iter_mut().map(|(id, book)| (*id, book))
    }

    /// Advance every book.
    pub fn update(&mut self, dt: f32) {
        for (_, book) in &mut self.books {
            book.update(dt);
        }
    }

    /// Every book hit by the ray, nearest first.
    pub fn raycast_all(&self, ray: &Ray) -> Vec<(BookId, BookRaycastHit)> {
        let mut hits: Vec<(BookId, BookRaycastHit)> = self
            .books
            .iter()
            .filter_map(|(id, book)| book.raycast(ray).map(|hit| (*id, hit)))
            .collect();
        hits.sort_by(|(_, a), (_, b)| {
            let da = a.point.distance_squared(ray.origin);
            let db = b.point.distance_squared(ray.origin);
            da.total_cmp(&db)
        });
        hits
    }

    /// The nearest book hit by the ray.
    pub fn raycast(&self, ray: &Ray) -> Option<(BookId, BookRaycastHit)> {
        self.raycast_all(ray).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BookContent;
    use folio_config::{BookConfig, BookDirection};
    use glam::{Affine3A, Vec3};

    fn built_book(height: f32) -> Book {
        let content = BookContent::new(BookDirection::LeftToRight).with_pages(4);
        let mut book = Book::new(BookConfig::default(), content);
        book.set_transform(Affine3A::from_translation(Vec3::new(0.0, height, 0.0)));
        book.build().unwrap();
        book
    }

    #[test]
    fn test_register_and_unregister() {
        let mut registry = BookRegistry::new();
        let a = registry.register(built_book(0.0));
        let b = registry.register(built_book(1.0));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(a).is_some());
        assert!(registry.unregister(a).is_none());
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());

        let c = registry.register(built_book(0.0));
        assert!(c > b);
        let ids: Vec<BookId> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b, c]);
    }

    #[test]
    fn test_raycast_all_sorted_by_distance() {
        let mut registry = BookRegistry::new();
        let low = registry.register(built_book(0.0));
        let high = registry.register(built_book(1.0));

        let ray = Ray::new(Vec3::new(1.0, 5.0, 1.5), Vec3::NEG_Y);
        let hits = registry.raycast_all(&ray);
        let ids: Vec<BookId> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![high, low]);
        assert_eq!(registry.raycast(&ray).map(|(id, _)| id), Some(high));

        let miss = Ray::new(Vec3::new(20.0, 5.0, 1.5), Vec3::NEG_Y);
        assert!(registry.raycast_all(&miss).is_empty());
    }
}
