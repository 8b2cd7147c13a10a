//! Layout migration.
//!
//! Switching a slide's layout keeps every field the new layout supports,
//! untouched, and drops the rest. Fields are never re-derived from one
//! another, so user edits survive a round trip through compatible layouts.

use crate::layout::{Field, Layout};
use crate::slide::SlideContent;

/// Reshape `content` from `from` to `to`. The input is left unchanged.
pub fn migrate(content: &SlideContent, from: Layout, to: Layout) -> SlideContent {
    let dropped = content.violations(to);
    if !dropped.is_empty() {
        log::debug!(
            "Layout change {} -> {} drops {}",
            from,
            to,
            dropped
                .iter()
                .map(Field::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    restrict(content, to)
}

/// Copy of `content` with every field `layout` does not support removed.
pub fn restrict(content: &SlideContent, layout: Layout) -> SlideContent {
    let caps = layout.capabilities();
    let keep = |field: Field| caps.supports(field);

    SlideContent {
        title: content.title.clone().filter(|_| keep(Field::Title)),
        subtitle: content.subtitle.clone().filter(|_| keep(Field::Subtitle)),
        body: content.body.clone().filter(|_| keep(Field::Body)),
        bullets: content.bullets.clone().filter(|_| keep(Field::Bullets)),
        left_column: content.left_column.clone().filter(|_| keep(Field::TwoColumn)),
        right_column: content.right_column.clone().filter(|_| keep(Field::TwoColumn)),
        image: content.image.clone().filter(|_| keep(Field::Image)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bullets::Bullet;
    use crate::slide::{ImageService, SlideImage};

    fn full_content() -> SlideContent {
        SlideContent {
            title: Some("Title".to_string()),
            subtitle: Some("Subtitle".to_string()),
            body: Some("Body text".to_string()),
            bullets: Some(vec![Bullet::new("One"), Bullet::new("Two")]),
            left_column: Some("Left".to_string()),
            right_column: Some("Right".to_string()),
            image: Some(SlideImage {
                url: "https://images.example/cat.png".to_string(),
                alt: "A cat".to_string(),
                prompt: Some("a cat on a desk".to_string()),
                service: Some(ImageService::Openai),
            }),
        }
    }

    #[test]
    fn test_migrate_conforms_for_every_pair() {
        for &from in Layout::all() {
            let content = restrict(&full_content(), from);
            assert!(content.conforms_to(from));
            for &to in Layout::all() {
                let migrated = migrate(&content, from, to);
                assert!(
                    migrated.conforms_to(to),
                    "{} -> {} left {:?}",
                    from,
                    to,
                    migrated.violations(to)
                );
            }
        }
    }

    #[test]
    fn test_migrate_is_idempotent() {
        for &from in Layout::all() {
            let content = restrict(&full_content(), from);
            for &to in Layout::all() {
                let once = migrate(&content, from, to);
                assert_eq!(migrate(&once, to, to), once);
            }
        }
    }

    #[test]
    fn test_shared_fields_pass_through() {
        let content = restrict(&full_content(), Layout::TitleBullets);
        let migrated = migrate(&content, Layout::TitleBullets, Layout::TitleBulletsImage);
        assert_eq!(migrated.title, content.title);
        assert_eq!(migrated.bullets, content.bullets);
        // No image is invented for the new slot.
        assert!(migrated.image.is_none());
    }

    #[test]
    fn test_image_preserved_between_image_layouts() {
        let content = restrict(&full_content(), Layout::TitleBulletsImage);
        let migrated = migrate(&content, Layout::TitleBulletsImage, Layout::TitleImage);
        assert_eq!(migrated.image, full_content().image);
        assert!(migrated.bullets.is_none());
        assert_eq!(migrated.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_migrate_does_not_mutate_input() {
        let content = full_content();
        let before = content.clone();
        let _ = migrate(&content, Layout::TitleBody, Layout::TitleOnly);
        assert_eq!(content, before);
    }

    #[test]
    fn test_two_column_round_trip_loses_columns() {
        let content = restrict(&full_content(), Layout::TwoColumn);
        assert_eq!(content.left_column.as_deref(), Some("Left"));
        let migrated = migrate(&content, Layout::TwoColumn, Layout::TitleBody);
        assert!(migrated.left_column.is_none());
        assert!(migrated.right_column.is_none());
        assert!(migrated.body.is_none());
    }

    #[test]
    fn test_image_only_drops_title() {
        let content = restrict(&full_content(), Layout::TitleImage);
        let migrated = migrate(&content, Layout::TitleImage, Layout::ImageOnly);
        assert!(migrated.title.is_none());
        assert!(migrated.image.is_some());
    }
}
