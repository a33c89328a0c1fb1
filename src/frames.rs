// Frame list construction: one reference per rotation angle, 1-based and zero-padded on disk.

use crate::types::ViewerConfig;

/// Ordered, immutable list of frame references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    frames: Vec<String>,
}

impl FrameSet {
    /// Build `{image_path}/{prefix}{NN}{extension}` for sequence numbers 1..=N.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let frames = (1..=config.number_of_images)
            .map(|seq| {
                let filename = format!(
                    "{}{:02}{}",
                    config.file_prefix, seq, config.file_extension
                );
                join_path(&config.image_path, &filename)
            })
            .collect();

        FrameSet { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.frames.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.frames
    }
}

fn join_path(base: &str, filename: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        // Base was "/" (root).
        format!("/{}", filename)
    } else {
        format!("{}/{}", base, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(path: &str, count: usize) -> ViewerConfig {
        ViewerConfig {
            number_of_images: count,
            ..ViewerConfig::new(path)
        }
    }

    #[test]
    fn fifth_frame_is_zero_padded() {
        let frames = FrameSet::from_config(&config("images/shoe", 36));
        assert_eq!(frames.len(), 36);
        assert_eq!(frames.get(4), Some("images/shoe/img05.jpg"));
        assert_eq!(frames.get(35), Some("images/shoe/img36.jpg"));
        assert_eq!(frames.get(36), None);
    }

    #[test]
    fn trailing_slash_is_collapsed() {
        let frames = FrameSet::from_config(&config("https://cdn.example.com/spin/", 2));
        assert_eq!(frames.get(0), Some("https://cdn.example.com/spin/img01.jpg"));
    }

    #[test]
    fn root_path_keeps_leading_slash() {
        let frames = FrameSet::from_config(&config("/", 1));
        assert_eq!(frames.get(0), Some("/img01.jpg"));
    }

    #[test]
    fn sequence_past_99_grows_wider() {
        let frames = FrameSet::from_config(&config("p", 120));
        assert_eq!(frames.get(99), Some("p/img100.jpg"));
    }

    #[test]
    fn custom_prefix_and_extension() {
        let cfg = ViewerConfig {
            file_prefix: "angle_".to_string(),
            file_extension: ".webp".to_string(),
            ..config("p", 3)
        };
        let frames = FrameSet::from_config(&cfg);
        let names: Vec<&str> = frames.iter().collect();
        assert_eq!(names, ["p/angle_01.webp", "p/angle_02.webp", "p/angle_03.webp"]);
    }

    proptest! {
        #[test]
        fn frame_count_and_numbering_match(count in 1usize..=99) {
            let frames = FrameSet::from_config(&config("assets", count));
            prop_assert_eq!(frames.len(), count);
            for (i, frame) in frames.iter().enumerate() {
                let expected = format!("assets/img{:02}.jpg", i + 1);
                prop_assert_eq!(frame, expected.as_str());
            }
        }
    }
}
