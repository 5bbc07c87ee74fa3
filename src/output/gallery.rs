/// A captioned example shown when no generation has run yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryImage {
    pub path: &'static str,
    pub caption: &'static str,
}

/// The fixed example gallery. Always available, regardless of pipeline
/// state.
pub const EXAMPLES: [GalleryImage; 7] = [
    GalleryImage {
        path: "gallery/futurecity.webp",
        caption: "A futuristic city skyline at sunset, with flying cars and glowing holograms, ultra-realistic",
    },
    GalleryImage {
        path: "gallery/robot.webp",
        caption: "A robot bartender serving drinks to human and alien patrons in a sleek space station lounge, realistic.",
    },
    GalleryImage {
        path: "gallery/fest.webp",
        caption: "A group of friends laughing and dancing at a music festival, joyful atmosphere, 35mm film photography",
    },
    GalleryImage {
        path: "gallery/wizard.png",
        caption: "A wizard casting a spell, intense magical energy glowing from his hands",
    },
    GalleryImage {
        path: "gallery/skateboard.webp",
        caption: "A women street skateboarding in Paris Olympics 2024",
    },
    GalleryImage {
        path: "gallery/anime.jpg",
        caption: "Anime style portrait of a female samurai at a beautiful lake with cherry trees, mountain fuji background, spring, sunset",
    },
    GalleryImage {
        path: "gallery/viking.png",
        caption: "A photorealistic close-up portrait of a bearded viking warrior in a horned helmet. He stares intensely into the distance while holding a battle axe. Dramatic mood lighting.",
    },
];

pub fn examples() -> &'static [GalleryImage] {
    &EXAMPLES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_examples() {
        assert_eq!(examples().len(), 7);
    }

    #[test]
    fn test_every_example_has_a_caption() {
        for example in examples() {
            assert!(!example.caption.is_empty());
            assert!(!example.path.is_empty());
        }
    }
}
