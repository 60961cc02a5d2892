//! Quality tiers and their format-selector chains.
//!
//! yt-dlp picks a concrete stream by evaluating a selector expression as a
//! fallback chain: alternatives separated by `/`, earlier ones preferred,
//! each alternative optionally filtered by `[key<value]` constraints. The
//! chains here are kept as structured records and rendered to the
//! expression syntax at the call site, so each leg's constraints stay
//! individually testable.
//!
//! The engine's size filters work off pre-download estimates that are often
//! approximate or missing, so the rendered `filesize<…` constraints are a
//! best-effort hint. The real ceiling is enforced after download in
//! [`crate::download::adapter`].

use crate::core::config::download::{AUDIO_STREAM_CAP_BYTES, MAX_FILE_SIZE_BYTES};
use crate::download::artifact::MediaKind;

/// The four fixed quality/format choices offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityTier {
    /// Best available quality that fits the size ceiling.
    Best,
    /// 480p–720p video.
    Medium720,
    /// 360p-or-below video.
    Low360,
    /// Best audio stream, transcoded to 192kbps MP3.
    AudioOnly,
}

impl QualityTier {
    /// Media kind of the artifact this tier produces.
    pub fn media_kind(self) -> MediaKind {
        match self {
            QualityTier::AudioOnly => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }

    /// The selector chain the engine evaluates for this tier.
    pub fn selector(self) -> SelectorChain {
        let cap = MAX_FILE_SIZE_BYTES;
        match self {
            // Prefer merged video+audio under the ceiling, then a single
            // muxed stream under the ceiling, then merged without the audio
            // cap, then any mux (the whole group still capped) and as a
            // last resort whatever is best overall.
            QualityTier::Best => SelectorChain {
                grouped: vec![
                    Leg::merged().video_cap(cap).audio_cap(AUDIO_STREAM_CAP_BYTES),
                    Leg::mux().size_cap(cap),
                    Leg::merged().video_cap(cap),
                    Leg::mux(),
                ],
                group_cap: Some(cap),
                trailing: vec![Leg::best()],
            },
            QualityTier::Medium720 => SelectorChain {
                grouped: vec![
                    Leg::merged().max_height(720).min_height(480),
                    Leg::mux().max_height(720).min_height(480),
                ],
                group_cap: Some(cap),
                trailing: vec![Leg::best().size_cap(cap)],
            },
            QualityTier::Low360 => SelectorChain {
                grouped: vec![Leg::merged().max_height(360), Leg::mux().max_height(360)],
                group_cap: Some(cap),
                trailing: vec![Leg::worst().size_cap(cap)],
            },
            QualityTier::AudioOnly => SelectorChain {
                grouped: vec![],
                group_cap: None,
                trailing: vec![Leg::best_audio(), Leg::best()],
            },
        }
    }
}

/// Which stream(s) a chain leg asks the engine for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    /// `bv*+ba`: best video stream merged with best audio stream.
    Merged,
    /// `b`: best pre-muxed single file.
    Mux,
    /// `best`: best overall, whatever the container.
    Overall,
    /// `worst`: smallest option the site offers.
    WorstOverall,
    /// `bestaudio`: best audio-only stream.
    BestAudio,
}

/// One alternative in a fallback chain, with its own constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Leg {
    pick: Pick,
    max_height: Option<u32>,
    min_height: Option<u32>,
    /// Size cap on the (video) stream of this leg.
    size_cap: Option<u64>,
    /// Size cap on the merged-in audio stream (`Merged` legs only).
    audio_cap: Option<u64>,
}

impl Leg {
    fn new(pick: Pick) -> Self {
        Leg {
            pick,
            max_height: None,
            min_height: None,
            size_cap: None,
            audio_cap: None,
        }
    }

    fn merged() -> Self {
        Leg::new(Pick::Merged)
    }

    fn mux() -> Self {
        Leg::new(Pick::Mux)
    }

    fn best() -> Self {
        Leg::new(Pick::Overall)
    }

    fn worst() -> Self {
        Leg::new(Pick::WorstOverall)
    }

    fn best_audio() -> Self {
        Leg::new(Pick::BestAudio)
    }

    fn max_height(mut self, h: u32) -> Self {
        self.max_height = Some(h);
        self
    }

    fn min_height(mut self, h: u32) -> Self {
        self.min_height = Some(h);
        self
    }

    fn size_cap(mut self, bytes: u64) -> Self {
        self.size_cap = Some(bytes);
        self
    }

    fn video_cap(self, bytes: u64) -> Self {
        self.size_cap(bytes)
    }

    fn audio_cap(mut self, bytes: u64) -> Self {
        self.audio_cap = Some(bytes);
        self
    }

    fn render(&self) -> String {
        let base = match self.pick {
            Pick::Merged => "bv*",
            Pick::Mux => "b",
            Pick::Overall => "best",
            Pick::WorstOverall => "worst",
            Pick::BestAudio => "bestaudio",
        };

        let mut out = String::from(base);
        if let Some(h) = self.max_height {
            out.push_str(&format!("[height<={}]", h));
        }
        if let Some(h) = self.min_height {
            out.push_str(&format!("[height>={}]", h));
        }
        if let Some(cap) = self.size_cap {
            out.push_str(&size_filter(cap));
        }
        if self.pick == Pick::Merged {
            out.push_str("+ba");
            if let Some(cap) = self.audio_cap {
                out.push_str(&size_filter(cap));
            }
        }
        out
    }
}

/// An ordered fallback chain: a parenthesized group of alternatives sharing
/// one size constraint, followed by unconstrained trailing alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    grouped: Vec<Leg>,
    group_cap: Option<u64>,
    trailing: Vec<Leg>,
}

impl SelectorChain {
    /// Renders the chain into the engine's selector expression.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.grouped.is_empty() {
            let inner = self.grouped.iter().map(Leg::render).collect::<Vec<_>>().join("/");
            let mut group = format!("({})", inner);
            if let Some(cap) = self.group_cap {
                group.push_str(&size_filter(cap));
            }
            parts.push(group);
        }

        parts.extend(self.trailing.iter().map(Leg::render));
        parts.join("/")
    }
}

/// Renders a byte cap as the engine's `[filesize<NM]` filter.
fn size_filter(bytes: u64) -> String {
    format!("[filesize<{}M]", bytes / (1024 * 1024))
}
