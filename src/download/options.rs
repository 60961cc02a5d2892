//! Typed engine invocation options.
//!
//! Replaces the classic "dict of yt-dlp flags" with a struct of named,
//! validated fields built once per call and rendered to argv. Tier
//! specialization happens through the builder instead of mutating a shared
//! option bag.

use std::path::{Path, PathBuf};

use crate::core::config::download::USER_AGENT;
use crate::download::selector::{QualityTier, SelectorChain};

/// Post-download audio transcode performed by the engine's ffmpeg hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTranscode {
    /// Target codec, e.g. `mp3`.
    pub codec: &'static str,
    /// Target quality as the engine expects it, e.g. `192K`.
    pub quality: &'static str,
}

/// One fully specified engine invocation.
///
/// `check_certificates` defaults to `false`: several source sites present
/// non-standard certificate chains, and the original deployment shipped
/// with validation off as a compatibility trade-off. Documented here so
/// nobody "fixes" it silently.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    format: Option<SelectorChain>,
    output_template: String,
    user_agent: String,
    check_certificates: bool,
    no_playlist: bool,
    audio_transcode: Option<AudioTranscode>,
}

impl EngineOptions {
    /// Starts a builder with the defaults every invocation shares.
    pub fn builder() -> EngineOptionsBuilder {
        EngineOptionsBuilder {
            format: None,
            output_template: None,
            user_agent: USER_AGENT.to_string(),
            check_certificates: false,
            no_playlist: true,
            audio_transcode: None,
        }
    }

    /// The options for downloading `tier` into `download_dir`.
    ///
    /// Files land as `<id>.<ext>` so sibling files (thumbnails, info JSON,
    /// partials) share a predictable base name for cleanup.
    pub fn for_tier(tier: QualityTier, download_dir: &Path) -> Self {
        let template = output_template(download_dir);
        let builder = Self::builder().format(tier.selector()).output_template(template);

        match tier {
            QualityTier::AudioOnly => builder
                .audio_transcode(AudioTranscode {
                    codec: "mp3",
                    quality: "192K",
                })
                .build(),
            _ => builder.build(),
        }
    }

    /// Renders the options to engine arguments (without the URL).
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        if let Some(chain) = &self.format {
            args.push("--format".to_string());
            args.push(chain.render());
        }
        args.push("--output".to_string());
        args.push(self.output_template.clone());

        if self.no_playlist {
            args.push("--no-playlist".to_string());
        }
        args.push("--no-warnings".to_string());

        if !self.check_certificates {
            args.push("--no-check-certificate".to_string());
        }
        args.push("--user-agent".to_string());
        args.push(self.user_agent.clone());

        if let Some(transcode) = &self.audio_transcode {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push(transcode.codec.to_string());
            args.push("--audio-quality".to_string());
            args.push(transcode.quality.to_string());
        }

        args
    }
}

/// Builder for [`EngineOptions`].
pub struct EngineOptionsBuilder {
    format: Option<SelectorChain>,
    output_template: Option<String>,
    user_agent: String,
    check_certificates: bool,
    no_playlist: bool,
    audio_transcode: Option<AudioTranscode>,
}

impl EngineOptionsBuilder {
    /// Set the format-selector chain.
    pub fn format(mut self, chain: SelectorChain) -> Self {
        self.format = Some(chain);
        self
    }

    /// Set the output path template.
    pub fn output_template(mut self, template: String) -> Self {
        self.output_template = Some(template);
        self
    }

    /// Override the browser identification string.
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = ua.to_string();
        self
    }

    /// Re-enable certificate validation (off by default, see [`EngineOptions`]).
    pub fn check_certificates(mut self, check: bool) -> Self {
        self.check_certificates = check;
        self
    }

    /// Attach a post-download audio transcode.
    pub fn audio_transcode(mut self, transcode: AudioTranscode) -> Self {
        self.audio_transcode = Some(transcode);
        self
    }

    /// Finalize the options.
    pub fn build(self) -> EngineOptions {
        EngineOptions {
            format: self.format,
            output_template: self
                .output_template
                .unwrap_or_else(|| "%(id)s.%(ext)s".to_string()),
            user_agent: self.user_agent,
            check_certificates: self.check_certificates,
            no_playlist: self.no_playlist,
            audio_transcode: self.audio_transcode,
        }
    }
}

/// `<download_dir>/<id>.<ext>` output template.
fn output_template(download_dir: &Path) -> String {
    let mut path = PathBuf::from(download_dir);
    path.push("%(id)s.%(ext)s");
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args_for(tier: QualityTier) -> Vec<String> {
        EngineOptions::for_tier(tier, Path::new("/tmp/dl")).to_args()
    }

    #[test]
    fn video_tier_args_carry_selector_and_template() {
        let args = args_for(QualityTier::Low360);

        let format_pos = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(
            args[format_pos + 1],
            "(bv*[height<=360]+ba/b[height<=360])[filesize<50M]/worst[filesize<50M]"
        );

        let output_pos = args.iter().position(|a| a == "--output").unwrap();
        assert_eq!(args[output_pos + 1], "/tmp/dl/%(id)s.%(ext)s");

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--extract-audio".to_string()));
    }

    #[test]
    fn audio_tier_adds_mp3_transcode() {
        let args = args_for(QualityTier::AudioOnly);

        let extract_pos = args.iter().position(|a| a == "--extract-audio").unwrap();
        assert_eq!(args[extract_pos + 1], "--audio-format");
        assert_eq!(args[extract_pos + 2], "mp3");
        assert_eq!(args[extract_pos + 3], "--audio-quality");
        assert_eq!(args[extract_pos + 4], "192K");
    }

    #[test]
    fn certificate_checks_stay_off_by_default() {
        let args = args_for(QualityTier::Best);
        assert!(args.contains(&"--no-check-certificate".to_string()));

        let ua_pos = args.iter().position(|a| a == "--user-agent").unwrap();
        assert!(args[ua_pos + 1].starts_with("Mozilla/5.0"));
    }

    #[test]
    fn builder_can_reenable_certificate_checks() {
        let opts = EngineOptions::builder()
            .output_template("/tmp/x/%(id)s.%(ext)s".to_string())
            .check_certificates(true)
            .build();
        assert!(!opts.to_args().contains(&"--no-check-certificate".to_string()));
    }
}
