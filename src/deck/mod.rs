//! Static slide deck generator
//!
//! Renders a fixed conference deck to Markdown with Marp front matter.
//! Each slide becomes one `---`-separated section.

mod content;

pub use content::vliw_dsp_deck;

use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Slide theme, emitted as the deck's CSS
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Title-slide heading size in points
    pub title_size: u32,
    /// Title-slide heading color (hex)
    pub title_color: &'static str,
    /// Content-slide heading size in points
    pub heading_size: u32,
    /// Bullet text size in points
    pub body_size: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title_size: 36,
            title_color: "#002366",
            heading_size: 28,
            body_size: 18,
        }
    }
}

impl Theme {
    fn css(&self) -> String {
        format!(
            "  section.lead h1 {{ font-size: {}pt; color: {}; }}\n  h2 {{ font-size: {}pt; color: #000000; }}\n  li {{ font-size: {}pt; }}\n",
            self.title_size, self.title_color, self.heading_size, self.body_size
        )
    }
}

/// One slide of the deck
#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    /// Opening slide: multi-line title plus subtitle lines
    Title {
        title: Vec<String>,
        subtitle: Vec<String>,
    },
    /// Heading with a bullet list
    Content { heading: String, bullets: Vec<String> },
}

impl Slide {
    pub fn title<T, S>(title: T, subtitle: S) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Slide::Title {
            title: title.into_iter().map(Into::into).collect(),
            subtitle: subtitle.into_iter().map(Into::into).collect(),
        }
    }

    pub fn content<B>(heading: impl Into<String>, bullets: B) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Slide::Content {
            heading: heading.into(),
            bullets: bullets.into_iter().map(Into::into).collect(),
        }
    }

    /// Heading text, title lines joined by a space
    pub fn heading(&self) -> String {
        match self {
            Slide::Title { title, .. } => title.join(" "),
            Slide::Content { heading, .. } => heading.clone(),
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Slide::Title { title, subtitle } => {
                out.push_str("<!-- _class: lead -->\n\n");
                out.push_str(&format!("# {}\n", title.join("<br>")));
                out.push('\n');
                for line in subtitle {
                    out.push_str(line);
                    out.push_str("  \n");
                }
            }
            Slide::Content { heading, bullets } => {
                out.push_str(&format!("## {heading}\n\n"));
                for bullet in bullets {
                    out.push_str(&format!("- {bullet}\n"));
                }
            }
        }
    }
}

/// An ordered deck, always opening with a title slide
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    slides: Vec<Slide>,
    theme: Theme,
}

impl Deck {
    pub fn new(title: Slide) -> Self {
        Self {
            slides: vec![title],
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn push(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Render the whole deck as Marp Markdown
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("---\nmarp: true\npaginate: true\nstyle: |\n");
        out.push_str(&self.theme.css());
        out.push_str("---\n\n");

        for (i, slide) in self.slides.iter().enumerate() {
            if i > 0 {
                out.push_str("\n---\n\n");
            }
            slide.render(&mut out);
        }
        out
    }

    /// Write the rendered deck, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_markdown())?;
        info!(slides = self.len(), "Presentation saved as {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deck_has_ten_slides() {
        let deck = vliw_dsp_deck();
        assert_eq!(deck.len(), 10);
        assert!(matches!(deck.slides()[0], Slide::Title { .. }));
        assert!(deck.slides()[1..]
            .iter()
            .all(|s| matches!(s, Slide::Content { .. })));
    }

    #[test]
    fn test_slide_order() {
        let headings: Vec<String> = vliw_dsp_deck().slides()[1..]
            .iter()
            .map(Slide::heading)
            .collect();
        assert_eq!(
            headings,
            [
                "Introduction",
                "What Are VLIW DSPs?",
                "Architectural Advancements",
                "Performance Optimization",
                "Power Efficiency",
                "Security Enhancements",
                "Applications",
                "Future Directions",
                "Conclusion & Q&A",
            ]
        );
    }

    #[test]
    fn test_markdown_layout() {
        let md = vliw_dsp_deck().to_markdown();
        assert!(md.starts_with("---\nmarp: true\n"));
        assert!(md.contains(
            "# Advancements in VLIW DSP Architectures:<br>Optimizing Design and Enhancing Security"
        ));
        assert!(md.contains("Transilvania University of Brasov"));
        assert!(md.contains("## Power Efficiency\n\n- DVFS & Power Gating"));
        assert!(md.contains("font-size: 36pt; color: #002366"));
        // front matter fences plus nine slide separators
        assert_eq!(md.matches("\n---\n").count(), 10);
    }

    #[test]
    fn test_custom_theme() {
        let md = Deck::new(Slide::title(["T"], ["S"]))
            .with_theme(Theme {
                body_size: 20,
                ..Theme::default()
            })
            .to_markdown();
        assert!(md.contains("li { font-size: 20pt; }"));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.md");
        std::fs::write(&path, "stale").unwrap();

        vliw_dsp_deck().save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Conclusion & Q&A"));
        assert!(!written.contains("stale"));
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        assert!(vliw_dsp_deck().save(dir.path().join("no/such/deck.md")).is_err());
    }
}
