//! Outline topics and their projection into slides.

use serde::{Deserialize, Serialize};

use crate::bullets::{self, BulletPoint};
use crate::config::SubtopicPolicy;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::remote::InstructionalLevel;
use crate::slide::Slide;

/// A candidate slide, as returned by outline generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineTopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_points: Vec<BulletPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtopics: Vec<OutlineTopic>,
}

impl OutlineTopic {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            key_points: Vec::new(),
            image_prompt: None,
            subtopics: Vec::new(),
        }
    }

    /// Append a key point.
    pub fn add_point(&mut self, text: &str) {
        let mut points = bullets::from_points(&self.key_points);
        points.extend(bullets::from_points(&[BulletPoint::from(text)]));
        self.key_points = bullets::denormalize(points);
    }

    /// Replace the key point at `index`. Blank text removes the point.
    pub fn edit_point(&mut self, index: usize, text: &str) -> Result<()> {
        let mut points = bullets::from_points(&self.key_points);
        if index >= points.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: points.len(),
            });
        }
        match bullets::from_points(&[BulletPoint::from(text)]).pop() {
            Some(bullet) => points[index] = bullet,
            None => {
                points.remove(index);
            }
        }
        self.key_points = bullets::denormalize(points);
        Ok(())
    }

    /// Remove the key point at `index`.
    pub fn delete_point(&mut self, index: usize) -> Result<()> {
        let mut points = bullets::from_points(&self.key_points);
        if index >= points.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: points.len(),
            });
        }
        points.remove(index);
        self.key_points = bullets::denormalize(points);
        Ok(())
    }

    /// Titles of all descendants, depth-first.
    fn descendant_titles(&self) -> Vec<BulletPoint> {
        let mut titles = Vec::new();
        for sub in &self.subtopics {
            titles.push(BulletPoint::Text(sub.title.clone()));
            titles.extend(sub.descendant_titles());
        }
        titles
    }
}

/// Find a topic anywhere in the outline tree.
pub fn find_topic_mut<'a>(topics: &'a mut [OutlineTopic], id: &str) -> Option<&'a mut OutlineTopic> {
    for topic in topics.iter_mut() {
        if topic.id == id {
            return Some(topic);
        }
        if let Some(found) = find_topic_mut(&mut topic.subtopics, id) {
            return Some(found);
        }
    }
    None
}

/// Apply `edit` to the topic with the given id.
pub fn edit_topic<F>(topics: &mut [OutlineTopic], id: &str, edit: F) -> Result<()>
where
    F: FnOnce(&mut OutlineTopic) -> Result<()>,
{
    let topic = find_topic_mut(topics, id).ok_or_else(|| Error::UnknownTopic(id.to_string()))?;
    edit(topic)
}

/// Remove the topic with the given id, wherever it is nested.
pub fn remove_topic(topics: &mut Vec<OutlineTopic>, id: &str) -> Result<OutlineTopic> {
    if let Some(pos) = topics.iter().position(|t| t.id == id) {
        return Ok(topics.remove(pos));
    }
    for topic in topics.iter_mut() {
        if let Ok(removed) = remove_topic(&mut topic.subtopics, id) {
            return Ok(removed);
        }
    }
    Err(Error::UnknownTopic(id.to_string()))
}

/// Options controlling outline projection.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionOptions {
    pub layout: Layout,
    pub subtopic_policy: SubtopicPolicy,
    /// Layout for topics carrying an image prompt, when set.
    pub image_layout: Option<Layout>,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            layout: Layout::TitleBullets,
            subtopic_policy: SubtopicPolicy::default(),
            image_layout: None,
        }
    }
}

/// Turn an outline into the initial slide list, preserving topic order.
pub fn project_outline(
    topics: &[OutlineTopic],
    level: InstructionalLevel,
    options: &ProjectionOptions,
) -> Vec<Slide> {
    let mut slides = Vec::with_capacity(topics.len());
    for topic in topics {
        project_topic(topic, options, &mut slides);
    }
    log::debug!(
        "Projected {} topics into {} slides ({} level, subtopics {:?})",
        topics.len(),
        slides.len(),
        level,
        options.subtopic_policy
    );
    slides
}

fn project_topic(topic: &OutlineTopic, options: &ProjectionOptions, slides: &mut Vec<Slide>) {
    let layout = match (options.image_layout, &topic.image_prompt) {
        (Some(image_layout), Some(prompt)) if !prompt.trim().is_empty() => image_layout,
        _ => options.layout,
    };

    match options.subtopic_policy {
        SubtopicPolicy::Merge => {
            if topic.subtopics.is_empty() {
                slides.push(Slide::from_outline_topic(topic, layout));
            } else {
                let mut merged = topic.clone();
                merged.key_points.extend(topic.descendant_titles());
                merged.subtopics.clear();
                slides.push(Slide::from_outline_topic(&merged, layout));
            }
        }
        SubtopicPolicy::Separate => {
            slides.push(Slide::from_outline_topic(topic, layout));
            for sub in &topic.subtopics {
                project_topic(sub, options, slides);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bullets::Bullet;

    fn outline() -> Vec<OutlineTopic> {
        let mut intro = OutlineTopic::new("1", "Introduction");
        intro.key_points = vec!["Why it matters".into()];

        let mut body = OutlineTopic::new("2", "Mechanics");
        body.key_points = vec![
            "Inputs".into(),
            BulletPoint::Structured {
                text: "Outputs".to_string(),
            },
        ];
        let mut sub = OutlineTopic::new("2.1", "Light reactions");
        sub.subtopics = vec![OutlineTopic::new("2.1.1", "Photosystem II")];
        body.subtopics = vec![sub, OutlineTopic::new("2.2", "Calvin cycle")];

        vec![intro, body]
    }

    fn titles(slides: &[Slide]) -> Vec<&str> {
        slides
            .iter()
            .map(|s| s.content().title.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_project_merge_policy() {
        let slides = project_outline(
            &outline(),
            InstructionalLevel::Introduction,
            &ProjectionOptions::default(),
        );
        assert_eq!(titles(&slides), vec!["Introduction", "Mechanics"]);
        let bullets = slides[1].content().bullets.clone().unwrap();
        let texts: Vec<_> = bullets.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Inputs", "Outputs", "Light reactions", "Photosystem II", "Calvin cycle"]
        );
    }

    #[test]
    fn test_project_separate_policy() {
        let options = ProjectionOptions {
            subtopic_policy: SubtopicPolicy::Separate,
            ..ProjectionOptions::default()
        };
        let slides = project_outline(&outline(), InstructionalLevel::Advanced, &options);
        assert_eq!(
            titles(&slides),
            vec![
                "Introduction",
                "Mechanics",
                "Light reactions",
                "Photosystem II",
                "Calvin cycle"
            ]
        );
        assert_eq!(
            slides[1].content().bullets,
            Some(vec![Bullet::new("Inputs"), Bullet::new("Outputs")])
        );
    }

    #[test]
    fn test_project_image_layout() {
        let mut topics = outline();
        topics[0].image_prompt = Some("a lightbulb".to_string());
        let options = ProjectionOptions {
            image_layout: Some(Layout::TitleBulletsImage),
            ..ProjectionOptions::default()
        };
        let slides = project_outline(&topics, InstructionalLevel::Intermediate, &options);
        assert_eq!(slides[0].layout(), Layout::TitleBulletsImage);
        assert!(slides[0].content().image.is_some());
        assert_eq!(slides[1].layout(), Layout::TitleBullets);
    }

    #[test]
    fn test_projection_gives_unique_ids() {
        let slides = project_outline(
            &outline(),
            InstructionalLevel::Introduction,
            &ProjectionOptions::default(),
        );
        assert_ne!(slides[0].id(), slides[1].id());
    }

    #[test]
    fn test_add_point_normalizes_to_strings() {
        let mut topic = OutlineTopic::new("1", "Topic");
        topic.key_points = vec![
            BulletPoint::Structured {
                text: "First".to_string(),
            },
            "Second".into(),
        ];
        topic.add_point("Third");
        assert_eq!(
            topic.key_points,
            vec![
                BulletPoint::from("First"),
                BulletPoint::from("Second"),
                BulletPoint::from("Third")
            ]
        );
    }

    #[test]
    fn test_add_blank_point_is_ignored() {
        let mut topic = OutlineTopic::new("1", "Topic");
        topic.add_point("   ");
        assert!(topic.key_points.is_empty());
    }

    #[test]
    fn test_edit_point() {
        let mut topic = OutlineTopic::new("1", "Topic");
        topic.key_points = vec!["A".into(), BulletPoint::Structured { text: "B".to_string() }];
        topic.edit_point(1, "Bee").unwrap();
        assert_eq!(topic.key_points, vec![BulletPoint::from("A"), BulletPoint::from("Bee")]);

        assert!(matches!(
            topic.edit_point(5, "x"),
            Err(Error::IndexOutOfRange { index: 5, len: 2 })
        ));

        topic.edit_point(0, "  ").unwrap();
        assert_eq!(topic.key_points, vec![BulletPoint::from("Bee")]);
    }

    #[test]
    fn test_delete_point() {
        let mut topic = OutlineTopic::new("1", "Topic");
        topic.key_points = vec!["A".into(), "B".into(), "C".into()];
        topic.delete_point(1).unwrap();
        assert_eq!(topic.key_points, vec![BulletPoint::from("A"), BulletPoint::from("C")]);
        assert!(topic.delete_point(2).is_err());
    }

    #[test]
    fn test_edit_nested_topic() {
        let mut topics = outline();
        edit_topic(&mut topics, "2.1.1", |t| {
            t.add_point("Water splitting");
            Ok(())
        })
        .unwrap();
        assert_eq!(
            topics[1].subtopics[0].subtopics[0].key_points,
            vec![BulletPoint::from("Water splitting")]
        );
        assert!(matches!(
            edit_topic(&mut topics, "9", |_| Ok(())),
            Err(Error::UnknownTopic(_))
        ));
    }

    #[test]
    fn test_remove_nested_topic() {
        let mut topics = outline();
        let removed = remove_topic(&mut topics, "2.2").unwrap();
        assert_eq!(removed.title, "Calvin cycle");
        assert_eq!(topics[1].subtopics.len(), 1);
        assert!(remove_topic(&mut topics, "2.2").is_err());
    }

    #[test]
    fn test_deserialize_outline_topic() {
        let json = r#"{
            "id": "a",
            "title": "Cells",
            "description": "Basics",
            "key_points": ["Membrane", {"text": "Nucleus"}],
            "subtopics": [{"id": "b", "title": "Organelles"}]
        }"#;
        let topic: OutlineTopic = serde_json::from_str(json).unwrap();
        assert_eq!(topic.key_points.len(), 2);
        assert_eq!(topic.subtopics[0].title, "Organelles");
        assert!(topic.image_prompt.is_none());
    }
}
